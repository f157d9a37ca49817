//! Base trait for token navigation shared by the parser traits.

use crate::error::{Error, Result};
use crate::parsing::lexer::{Keyword, Token, TokenKind};

impl From<Keyword> for TokenKind {
    fn from(keyword: Keyword) -> Self {
        TokenKind::Keyword(keyword)
    }
}

/// Token navigation over a fully-lexed token buffer. Keeping the tokens in a
/// buffer lets speculative parses (lambda arguments) save and restore their
/// position.
pub trait TokenHelper {
    /// Returns the current buffer position, for save/restore.
    fn position(&self) -> usize;

    /// Restores a previously saved buffer position.
    fn restore(&mut self, position: usize);

    /// Fetches the next token, or errors at end of input.
    fn next(&mut self) -> Result<Token>;

    /// Peeks the next token kind without consuming it.
    fn peek(&self) -> Option<&TokenKind>;

    /// Peeks the token kind `n` positions ahead (0 = next).
    fn peek_at(&self, n: usize) -> Option<&TokenKind>;

    /// The source position of the next token, or of the end of input.
    fn next_pos(&self) -> (u32, u32);

    /// Builds a parse error pointing at the next token.
    fn error_here(&self, message: impl Into<String>) -> Error {
        let (line, column) = self.next_pos();
        Error::parse(message, line, column)
    }

    /// Returns the next identifier (bare or quoted), or errors.
    fn next_ident(&mut self) -> Result<String> {
        let token = self.next()?;
        match token.kind {
            TokenKind::Ident(ident) | TokenKind::QuotedIdent(ident) => Ok(ident),
            kind => Err(Error::parse(
                format!("expected identifier, found {}", kind),
                token.line,
                token.column,
            )),
        }
    }

    /// Returns the next identifier or keyword-as-identifier, for contexts
    /// like aliases where keywords are allowed.
    fn next_ident_or_keyword(&mut self) -> Result<String> {
        let token = self.next()?;
        match token.kind {
            TokenKind::Ident(ident) | TokenKind::QuotedIdent(ident) => Ok(ident),
            TokenKind::Keyword(keyword) => Ok(keyword.as_str().to_lowercase()),
            kind => Err(Error::parse(
                format!("expected identifier, found {}", kind),
                token.line,
                token.column,
            )),
        }
    }

    /// Passes the next token kind through the closure, consuming the token if
    /// the closure returns Some. Returns the closure's result.
    fn next_if_map<T>(&mut self, f: impl Fn(&TokenKind) -> Option<T>) -> Option<T> {
        let value = f(self.peek()?)?;
        let _ = self.next();
        Some(value)
    }

    /// Returns the next keyword if there is one.
    fn next_if_keyword(&mut self) -> Option<Keyword> {
        self.next_if_map(|kind| match kind {
            TokenKind::Keyword(keyword) => Some(*keyword),
            _ => None,
        })
    }

    /// Consumes the next token if it is an identifier matching the given
    /// string case-insensitively. Used for non-reserved words like UNSIGNED
    /// or ENGINE that are not in the keyword table.
    fn next_if_ident_eq(&mut self, expected: &str) -> bool {
        self.next_if_map(|kind| match kind {
            TokenKind::Ident(s) if s.eq_ignore_ascii_case(expected) => Some(()),
            _ => None,
        })
        .is_some()
    }

    /// Consumes the next token if it has the given kind, returning true.
    fn next_is(&mut self, kind: TokenKind) -> bool {
        self.next_if_map(|k| (*k == kind).then_some(())).is_some()
    }

    /// Consumes the next token if it has the given kind, ignoring it.
    fn skip(&mut self, kind: TokenKind) {
        self.next_is(kind);
    }

    /// Consumes the next token, erroring unless it has the expected kind.
    fn expect(&mut self, expect: TokenKind) -> Result<()> {
        let token = self.next()?;
        if token.kind != expect {
            return Err(Error::parse(
                format!("expected {}, found {}", expect, token.kind),
                token.line,
                token.column,
            ));
        }
        Ok(())
    }
}
