//! Parameter value conversion
//!
//! Request values arrive as text. A process-wide table keyed by parameter
//! name decides how a value is converted before a structured call. Names
//! missing from the table pass through in their received form.

use std::fmt;

use serde_json::Value;
use thiserror::Error;

/// A resolved parameter value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    /// No value supplied and no default declared
    Null,
    /// Raw text as received from the query string
    Text(String),
    Bool(bool),
    Int(i64),
    /// Bytes in internal (little-endian) order
    Bytes(Vec<u8>),
}

impl ParamValue {
    /// Whether the value is `Null`
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// JSON form used on the positional fallback path and on the wire
    ///
    /// Bytes are rendered as display-order hex, the inverse of
    /// [`Conversion::LittleEndianHex`].
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Text(s) => Value::String(s.clone()),
            Self::Bool(b) => Value::Bool(*b),
            Self::Int(n) => Value::from(*n),
            Self::Bytes(bytes) => Value::String(reversed_hex(bytes)),
        }
    }

    const fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Text(_) => "text",
            Self::Bool(_) => "bool",
            Self::Int(_) => "integer",
            Self::Bytes(_) => "bytes",
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Text(s) => f.write_str(s),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Bytes(bytes) => f.write_str(&reversed_hex(bytes)),
        }
    }
}

/// Conversion applied to a named parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    /// Display-order hex to internal byte order (hashes, txids)
    LittleEndianHex,
    /// Text to boolean
    Boolean,
    /// Text to signed integer
    Integer,
}

/// Process-wide conversion rules, keyed by parameter name
pub const CONVERSION_TABLE: &[(&str, Conversion)] = &[
    ("block_hash", Conversion::LittleEndianHex),
    ("txid", Conversion::LittleEndianHex),
    ("verbose", Conversion::Boolean),
    ("height", Conversion::Integer),
];

/// A value that its parameter's conversion rule rejected
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("cannot convert parameter `{name}` ({value}): {reason}")]
pub struct ConversionError {
    pub name: String,
    pub value: String,
    pub reason: String,
}

/// Look up the conversion rule for a parameter name
#[must_use]
pub fn conversion_for(name: &str) -> Option<Conversion> {
    CONVERSION_TABLE
        .iter()
        .find(|(rule, _)| *rule == name)
        .map(|(_, conversion)| *conversion)
}

/// Convert `value` according to the rule registered for `name`
///
/// Names without a rule are returned unchanged. `Null` always passes
/// through, so an omitted parameter without a default stays absent.
///
/// # Errors
///
/// Returns [`ConversionError`] when the value is malformed for the rule
pub fn convert(name: &str, value: ParamValue) -> Result<ParamValue, ConversionError> {
    match conversion_for(name) {
        Some(conversion) => conversion.apply(name, value),
        None => Ok(value),
    }
}

impl Conversion {
    /// Apply this conversion to a value of parameter `name`
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError`] when the value is malformed
    pub fn apply(self, name: &str, value: ParamValue) -> Result<ParamValue, ConversionError> {
        let fail = |value: &ParamValue, reason: String| ConversionError {
            name: name.to_string(),
            value: value.to_string(),
            reason,
        };

        match (self, value) {
            (_, ParamValue::Null) => Ok(ParamValue::Null),

            (Self::LittleEndianHex, ParamValue::Text(text)) => {
                let mut bytes = hex::decode(text.trim())
                    .map_err(|e| fail(&ParamValue::Text(text.clone()), e.to_string()))?;
                bytes.reverse();
                Ok(ParamValue::Bytes(bytes))
            }
            (Self::LittleEndianHex, v @ ParamValue::Bytes(_))
            | (Self::Boolean, v @ ParamValue::Bool(_))
            | (Self::Integer, v @ ParamValue::Int(_)) => Ok(v),

            (Self::Boolean, ParamValue::Text(text)) => parse_bool(&text)
                .map(ParamValue::Bool)
                .ok_or_else(|| fail(&ParamValue::Text(text.clone()), "expected a boolean".into())),
            (Self::Boolean, ParamValue::Int(n)) => Ok(ParamValue::Bool(n != 0)),

            (Self::Integer, ParamValue::Text(text)) => text
                .trim()
                .parse::<i64>()
                .map(ParamValue::Int)
                .map_err(|e| fail(&ParamValue::Text(text.clone()), e.to_string())),

            (conversion, other) => {
                let reason = format!("{conversion:?} does not accept a {} value", other.kind());
                Err(fail(&other, reason))
            }
        }
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

fn reversed_hex(bytes: &[u8]) -> String {
    let mut display = bytes.to_vec();
    display.reverse();
    hex::encode(display)
}
