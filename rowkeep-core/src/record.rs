//! Records, insert payloads and partial updates
//!
//! Every type here is shaped against a `RecordSchema`: bodies are walked
//! field-by-field over the schema, never over the incoming JSON keys, so
//! unknown keys are ignored and the identity is handled explicitly.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value as JsonValue};

use crate::error::{describe_json, CoreError, Result};
use crate::ident::Ident;
use crate::schema::{FieldKind, RecordSchema};
use crate::value::FieldValue;

/// A stored row, fields in schema order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(Ident, FieldValue)>,
}

impl Record {
    /// Pair `values` with the schema's fields. `values` must be in schema order.
    pub fn from_values(schema: &RecordSchema, values: Vec<FieldValue>) -> Self {
        Self {
            fields: schema
                .fields()
                .iter()
                .map(|f| f.name.clone())
                .zip(values)
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(n, _)| n.as_str() == name)
            .map(|(_, v)| v)
    }

    /// Identity value according to `schema`
    pub fn key<'a>(&'a self, schema: &RecordSchema) -> &'a FieldValue {
        self.get(schema.key().name.as_str()).unwrap_or(&FieldValue::Null)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Ident, &FieldValue)> {
        self.fields.iter().map(|(n, v)| (n, v))
    }

    /// Overwrite every field the patch mentions; leave the rest alone.
    pub fn apply(&mut self, patch: &Patch) {
        for (name, value) in patch.iter() {
            if let Some((_, slot)) = self.fields.iter_mut().find(|(n, _)| n == name) {
                *slot = value.clone();
            }
        }
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name.as_str(), value)?;
        }
        map.end()
    }
}

/// Insert payload: every schema field, absent ones zero-filled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
    /// Identity value; `None` leaves assignment to the store
    pub key: Option<FieldValue>,
    /// Non-identity fields in schema order
    pub fields: Vec<(Ident, FieldValue)>,
}

impl NewRecord {
    /// Decode an insert body.
    ///
    /// An absent or null integer identity is left for the store to assign;
    /// an absent text identity becomes the empty string.
    pub fn decode(schema: &RecordSchema, body: &JsonValue) -> Result<Self> {
        let object = as_object(body)?;
        let key_def = schema.key();

        let key = match object.get(key_def.name.as_str()) {
            None | Some(JsonValue::Null) => match key_def.kind {
                FieldKind::Integer => None,
                FieldKind::Text => Some(key_def.kind.zero()),
            },
            Some(raw) => Some(FieldValue::coerce(key_def, raw)?),
        };

        let fields = schema
            .mutable_fields()
            .map(|def| -> Result<(Ident, FieldValue)> {
                let value = match object.get(def.name.as_str()) {
                    Some(raw) => FieldValue::coerce(def, raw)?,
                    None => def.kind.zero(),
                };
                Ok((def.name.clone(), value))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { key, fields })
    }

    /// Assemble the stored record once the identity is known.
    pub fn into_record(self, schema: &RecordSchema, key: FieldValue) -> Record {
        let mut rest = self.fields.into_iter();
        let values = schema
            .fields()
            .iter()
            .map(|def| {
                if def.identity {
                    key.clone()
                } else {
                    rest.next().map(|(_, v)| v).unwrap_or(FieldValue::Null)
                }
            })
            .collect();
        Record::from_values(schema, values)
    }
}

/// Partial update: field name to new value, schema order, identity excluded
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Patch {
    changes: Vec<(Ident, FieldValue)>,
}

impl Patch {
    /// Decode an update body. Only mutable schema fields present in the body
    /// are kept; the identity and unknown keys are dropped.
    pub fn decode(schema: &RecordSchema, body: &JsonValue) -> Result<Self> {
        let object = as_object(body)?;
        let changes = schema
            .mutable_fields()
            .filter_map(|def| {
                object
                    .get(def.name.as_str())
                    .map(|raw| FieldValue::coerce(def, raw).map(|v| (def.name.clone(), v)))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { changes })
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Ident, &FieldValue)> {
        self.changes.iter().map(|(n, v)| (n, v))
    }
}

fn as_object(body: &JsonValue) -> Result<&Map<String, JsonValue>> {
    body.as_object().ok_or_else(|| CoreError::NotAnObject {
        found: describe_json(body),
    })
}
