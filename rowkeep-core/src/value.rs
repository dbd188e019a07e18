//! Scalar field values and JSON coercion

use std::fmt;

use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::error::{CoreError, Result};
use crate::schema::{FieldDef, FieldKind};

/// A single column value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Integer(i64),
    Text(String),
    Null,
}

impl FieldValue {
    /// Coerce a JSON body value into the kind `field` declares.
    ///
    /// Integers accept integral numbers, integral floats, numeric strings and
    /// booleans. Text accepts strings and renders numbers/booleans. `null`
    /// passes through for the store to accept or reject.
    pub fn coerce(field: &FieldDef, raw: &JsonValue) -> Result<Self> {
        let coerced = match (field.kind, raw) {
            (_, JsonValue::Null) => Some(Self::Null),
            (FieldKind::Integer, JsonValue::Number(n)) => n
                .as_i64()
                .or_else(|| n.as_f64().and_then(integral_f64))
                .map(Self::Integer),
            (FieldKind::Integer, JsonValue::String(s)) => {
                s.trim().parse::<i64>().ok().map(Self::Integer)
            }
            (FieldKind::Integer, JsonValue::Bool(b)) => Some(Self::Integer(i64::from(*b))),
            (FieldKind::Text, JsonValue::String(s)) => Some(Self::Text(s.clone())),
            (FieldKind::Text, JsonValue::Number(n)) => Some(Self::Text(n.to_string())),
            (FieldKind::Text, JsonValue::Bool(b)) => Some(Self::Text(b.to_string())),
            (_, JsonValue::Array(_) | JsonValue::Object(_)) => None,
        };

        coerced.ok_or_else(|| CoreError::coercion(field.name.as_str(), field.kind, raw))
    }

    /// Coerce a raw path segment into an identity value of `kind`.
    pub fn parse_key(kind: FieldKind, raw: &str) -> Result<Self> {
        match kind {
            FieldKind::Integer => raw
                .parse::<i64>()
                .map(Self::Integer)
                .map_err(|_| CoreError::InvalidKey {
                    raw: raw.to_owned(),
                    expected: kind,
                }),
            FieldKind::Text => Ok(Self::Text(raw.to_owned())),
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(i) => write!(f, "{}", i),
            Self::Text(s) => f.write_str(s),
            Self::Null => f.write_str("null"),
        }
    }
}

fn integral_f64(f: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}
