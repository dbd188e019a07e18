//! Field-schema descriptors
//!
//! A `RecordSchema` describes one table: its URL collection name, its SQL
//! table name and the ordered list of scalar fields. Exactly one field is the
//! identity; it addresses a record and is never part of an update.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::ident::Ident;
use crate::value::FieldValue;

/// Scalar kind of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Integer,
    Text,
}

impl FieldKind {
    /// Zero value used for fields absent from an insert body
    pub fn zero(self) -> FieldValue {
        match self {
            Self::Integer => FieldValue::Integer(0),
            Self::Text => FieldValue::Text(String::new()),
        }
    }

    /// Postgres column type
    pub fn sql_type(self) -> &'static str {
        match self {
            Self::Integer => "BIGINT",
            Self::Text => "TEXT",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer => f.write_str("integer"),
            Self::Text => f.write_str("text"),
        }
    }
}

/// One column of a record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: Ident,
    pub kind: FieldKind,
    #[serde(default)]
    pub identity: bool,
}

impl FieldDef {
    pub fn new(name: &str, kind: FieldKind) -> Result<Self> {
        Ok(Self {
            name: Ident::new(name)?,
            kind,
            identity: false,
        })
    }

    pub fn identity(name: &str, kind: FieldKind) -> Result<Self> {
        Ok(Self {
            identity: true,
            ..Self::new(name, kind)?
        })
    }
}

/// Validated schema for one collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSchema {
    collection: Ident,
    table: Ident,
    fields: Vec<FieldDef>,
    key_index: usize,
}

impl RecordSchema {
    /// Build a schema, checking identity and name uniqueness.
    pub fn new(collection: Ident, table: Ident, fields: Vec<FieldDef>) -> Result<Self> {
        if fields.is_empty() {
            return Err(CoreError::invalid_schema(collection.as_str(), "no fields"));
        }

        let mut seen = HashSet::new();
        for field in &fields {
            if !seen.insert(field.name.as_str()) {
                return Err(CoreError::invalid_schema(
                    collection.as_str(),
                    format!("duplicate field '{}'", field.name),
                ));
            }
        }

        let identities: Vec<usize> = fields
            .iter()
            .enumerate()
            .filter(|(_, f)| f.identity)
            .map(|(i, _)| i)
            .collect();

        let key_index = match identities.as_slice() {
            [single] => *single,
            [] => {
                return Err(CoreError::invalid_schema(
                    collection.as_str(),
                    "no identity field",
                ))
            }
            _ => {
                return Err(CoreError::invalid_schema(
                    collection.as_str(),
                    "more than one identity field",
                ))
            }
        };

        Ok(Self {
            collection,
            table,
            fields,
            key_index,
        })
    }

    pub fn collection(&self) -> &Ident {
        &self.collection
    }

    pub fn table(&self) -> &Ident {
        &self.table
    }

    /// All fields, identity included, in declaration order
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn key(&self) -> &FieldDef {
        &self.fields[self.key_index]
    }

    /// Fields that may be written by an update
    pub fn mutable_fields(&self) -> impl Iterator<Item = &FieldDef> {
        self.fields.iter().filter(|f| !f.identity)
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name.as_str() == name)
    }

    /// Same fields under a different collection and table name
    pub fn renamed(self, collection: Ident, table: Ident) -> Self {
        Self {
            collection,
            table,
            ..self
        }
    }
}

/// Built-in schemas for the known deployment variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    /// Integer surrogate id, `users` table
    Numbered,
    /// Unique string handle, `profiles` table
    Handle,
}

impl Preset {
    pub fn schema(self) -> RecordSchema {
        use FieldKind::{Integer, Text};

        let (collection, table, columns): (&str, &str, &[(&str, FieldKind, bool)]) = match self {
            Self::Numbered => (
                "users",
                "users",
                &[
                    ("birth", Integer, false),
                    ("highest", Integer, false),
                    ("id", Integer, true),
                    ("match", Integer, false),
                    ("rank", Integer, false),
                    ("rating", Integer, false),
                    ("user", Text, false),
                    ("win", Integer, false),
                ],
            ),
            Self::Handle => (
                "profiles",
                "profiles",
                &[
                    ("handle", Text, true),
                    ("rank", Text, false),
                    ("rating", Integer, false),
                    ("max_rank", Text, false),
                    ("max_rating", Integer, false),
                    ("contribution", Integer, false),
                    ("friend_of_count", Integer, false),
                    ("win", Integer, false),
                    ("match", Integer, false),
                ],
            ),
        };

        // Preset names are static and known-valid
        let fields = columns
            .iter()
            .map(|(name, kind, identity)| FieldDef {
                name: Ident(name.to_string()),
                kind: *kind,
                identity: *identity,
            })
            .collect::<Vec<_>>();
        let key_index = columns.iter().position(|(_, _, id)| *id).unwrap_or(0);

        RecordSchema {
            collection: Ident(collection.to_string()),
            table: Ident(table.to_string()),
            fields,
            key_index,
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numbered => f.write_str("numbered"),
            Self::Handle => f.write_str("handle"),
        }
    }
}
