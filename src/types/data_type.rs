//! SQL data types for the ClickHouse-flavored dialect.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};
use crate::parsing::ast::{TypeArg, TypeExpr};

/// SQL data types. A closed family: every runtime value answers one of
/// these, and the `Nullable` / `LowCardinality` wrappers only exist at the
/// type level.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    Bool,
    // Signed integers
    Int8,
    Int16,
    Int32,
    Int64,
    // Unsigned integers
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    // Floats
    Float32,
    Float64,
    /// Decimal with precision and scale.
    Decimal(u32, u32),
    String,
    /// Fixed-length string of N bytes.
    FixedString(usize),
    Date,
    /// DateTime with an optional timezone label.
    DateTime(Option<std::string::String>),
    /// DateTime64 with sub-second precision and an optional timezone label.
    DateTime64(u8, Option<std::string::String>),
    Uuid,
    /// Array with a homogeneous element type.
    Array(Box<DataType>),
    /// Tuple with positional, optionally named elements.
    Tuple(Vec<(Option<std::string::String>, DataType)>),
    Map(Box<DataType>, Box<DataType>),
    /// A slot that additionally accepts NULL.
    Nullable(Box<DataType>),
    /// Identity wrapper at the value level.
    LowCardinality(Box<DataType>),
    /// The type of the NULL literal and of empty-array elements.
    Null,
}

impl DataType {
    /// Strips Nullable and LowCardinality wrappers.
    pub fn base_type(&self) -> &DataType {
        match self {
            DataType::Nullable(inner) | DataType::LowCardinality(inner) => inner.base_type(),
            _ => self,
        }
    }

    /// Whether a slot of this type accepts NULL.
    pub fn is_nullable(&self) -> bool {
        match self {
            DataType::Nullable(_) | DataType::Null => true,
            DataType::LowCardinality(inner) => inner.is_nullable(),
            _ => false,
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(
            self.base_type(),
            DataType::Int8
                | DataType::Int16
                | DataType::Int32
                | DataType::Int64
                | DataType::UInt8
                | DataType::UInt16
                | DataType::UInt32
                | DataType::UInt64
        )
    }

    pub fn is_numeric(&self) -> bool {
        self.is_integer()
            || matches!(
                self.base_type(),
                DataType::Float32 | DataType::Float64 | DataType::Decimal(_, _)
            )
    }

    /// Normalizes a parsed type expression to a concrete type.
    pub fn from_type_expr(expr: &TypeExpr) -> Result<DataType> {
        let name = expr.name.to_uppercase();
        fn bad<T>(message: String) -> Result<T> {
            Err(Error::InvalidType(message))
        }

        // Helper accessors over the argument list.
        let nested = |n: usize| -> Result<DataType> {
            match expr.args.get(n) {
                Some(TypeArg::Type(t)) => DataType::from_type_expr(t),
                _ => bad(format!("{} requires a type parameter", expr.name)),
            }
        };
        let int = |n: usize| -> Result<i64> {
            match expr.args.get(n) {
                Some(TypeArg::Int(i)) => Ok(*i),
                _ => bad(format!("{} requires an integer parameter", expr.name)),
            }
        };

        let data_type = match name.as_str() {
            "BOOL" | "BOOLEAN" => DataType::Bool,
            "INT8" => DataType::Int8,
            "INT16" => DataType::Int16,
            "INT32" => DataType::Int32,
            "INT64" => DataType::Int64,
            "UINT8" => DataType::UInt8,
            "UINT16" => DataType::UInt16,
            "UINT32" => DataType::UInt32,
            "UINT64" => DataType::UInt64,
            "FLOAT32" => DataType::Float32,
            "FLOAT64" => DataType::Float64,
            "STRING" => DataType::String,
            "DATE" => DataType::Date,
            "UUID" => DataType::Uuid,
            "ENUM8" | "ENUM16" => DataType::String,
            "DATETIME" => {
                let timezone = match expr.args.first() {
                    Some(TypeArg::Str(tz)) => Some(tz.clone()),
                    None => None,
                    _ => return bad("DateTime takes an optional timezone string".into()),
                };
                DataType::DateTime(timezone)
            }
            "DATETIME64" => {
                let precision = int(0)?;
                if !(0..=9).contains(&precision) {
                    return bad(format!("invalid DateTime64 precision {}", precision));
                }
                let timezone = match expr.args.get(1) {
                    Some(TypeArg::Str(tz)) => Some(tz.clone()),
                    None => None,
                    _ => return bad("DateTime64 takes an optional timezone string".into()),
                };
                DataType::DateTime64(precision as u8, timezone)
            }
            "FIXEDSTRING" => {
                let length = int(0)?;
                if length <= 0 {
                    return bad(format!("invalid FixedString length {}", length));
                }
                DataType::FixedString(length as usize)
            }
            "DECIMAL" | "DECIMAL32" | "DECIMAL64" | "DECIMAL128" | "DECIMAL256" => {
                // Decimal(P[, S]); the sized variants take (S) with an
                // implied precision.
                let (precision, scale) = match name.as_str() {
                    "DECIMAL32" => (9, int(0)?),
                    "DECIMAL64" => (18, int(0)?),
                    "DECIMAL128" => (38, int(0)?),
                    "DECIMAL256" => (76, int(0)?),
                    _ => {
                        let precision = if expr.args.is_empty() { 10 } else { int(0)? };
                        let scale = if expr.args.len() > 1 { int(1)? } else { 0 };
                        (precision, scale)
                    }
                };
                if precision <= 0 || scale < 0 || scale > precision {
                    return bad(format!("invalid Decimal({}, {})", precision, scale));
                }
                DataType::Decimal(precision as u32, scale as u32)
            }
            "ARRAY" => DataType::Array(Box::new(nested(0)?)),
            "NULLABLE" => DataType::Nullable(Box::new(nested(0)?)),
            "LOWCARDINALITY" => DataType::LowCardinality(Box::new(nested(0)?)),
            "MAP" => DataType::Map(Box::new(nested(0)?), Box::new(nested(1)?)),
            "TUPLE" => {
                let mut elements = Vec::new();
                for arg in &expr.args {
                    match arg {
                        TypeArg::Type(t) => elements.push((None, DataType::from_type_expr(t)?)),
                        TypeArg::Named(name, t) => {
                            elements.push((Some(name.clone()), DataType::from_type_expr(t)?))
                        }
                        _ => return bad("Tuple requires type parameters".into()),
                    }
                }
                DataType::Tuple(elements)
            }
            _ => return bad(format!("unknown type {}", expr.name)),
        };
        Ok(data_type)
    }

    /// Normalizes a free-form type string, e.g. "Nullable(Int64)".
    pub fn parse_str(input: &str) -> Result<DataType> {
        use crate::parsing::parser::type_parser::TypeParser;
        let mut parser = crate::parsing::Parser::new(input)
            .map_err(|_| Error::InvalidType(format!("unparseable type {}", input)))?;
        let expr = TypeParser::parse_type(&mut parser)
            .map_err(|_| Error::InvalidType(format!("unparseable type {}", input)))?;
        DataType::from_type_expr(&expr)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Bool => write!(f, "Bool"),
            DataType::Int8 => write!(f, "Int8"),
            DataType::Int16 => write!(f, "Int16"),
            DataType::Int32 => write!(f, "Int32"),
            DataType::Int64 => write!(f, "Int64"),
            DataType::UInt8 => write!(f, "UInt8"),
            DataType::UInt16 => write!(f, "UInt16"),
            DataType::UInt32 => write!(f, "UInt32"),
            DataType::UInt64 => write!(f, "UInt64"),
            DataType::Float32 => write!(f, "Float32"),
            DataType::Float64 => write!(f, "Float64"),
            DataType::Decimal(p, s) => write!(f, "Decimal({}, {})", p, s),
            DataType::String => write!(f, "String"),
            DataType::FixedString(n) => write!(f, "FixedString({})", n),
            DataType::Date => write!(f, "Date"),
            DataType::DateTime(None) => write!(f, "DateTime"),
            DataType::DateTime(Some(tz)) => write!(f, "DateTime('{}')", tz),
            DataType::DateTime64(p, None) => write!(f, "DateTime64({})", p),
            DataType::DateTime64(p, Some(tz)) => write!(f, "DateTime64({}, '{}')", p, tz),
            DataType::Uuid => write!(f, "UUID"),
            DataType::Array(inner) => write!(f, "Array({})", inner),
            DataType::Tuple(elements) => {
                write!(f, "Tuple(")?;
                for (i, (name, element)) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    if let Some(name) = name {
                        write!(f, "{} ", name)?;
                    }
                    write!(f, "{}", element)?;
                }
                write!(f, ")")
            }
            DataType::Map(key, value) => write!(f, "Map({}, {})", key, value),
            DataType::Nullable(inner) => write!(f, "Nullable({})", inner),
            DataType::LowCardinality(inner) => write!(f, "LowCardinality({})", inner),
            DataType::Null => write!(f, "Nothing"),
        }
    }
}
