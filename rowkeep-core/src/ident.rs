//! SQL identifier validation
//!
//! Collection, table and field names end up inside generated SQL, so they
//! are restricted to plain identifiers and always emitted double-quoted.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CoreError;

/// Postgres truncates identifiers past 63 bytes
const MAX_IDENT_LEN: usize = 63;

static IDENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("invalid identifier regex"));

/// Validated SQL identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ident(pub(crate) String);

impl Ident {
    /// Create a new identifier.
    ///
    /// # Example
    /// ```
    /// use rowkeep_core::Ident;
    ///
    /// assert!(Ident::new("max_rating").is_ok());
    /// assert!(Ident::new("max-rating").is_err());
    /// assert!(Ident::new("1st").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, CoreError> {
        if s.is_empty() || s.len() > MAX_IDENT_LEN || !IDENT_RE.is_match(s) {
            return Err(CoreError::InvalidIdentifier {
                value: s.to_owned(),
            });
        }
        Ok(Self(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Double-quoted form for use in SQL text.
    ///
    /// The regex rules out embedded quotes, so no escaping is needed.
    pub fn quoted(&self) -> String {
        format!("\"{}\"", self.0)
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for Ident {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Ident {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ident::new(&raw).map_err(serde::de::Error::custom)
    }
}
