//! SQL text generation from a `RecordSchema`
//!
//! Identifiers come from validated `Ident`s and are always double-quoted;
//! values are never interpolated, only bound as `$n` parameters. Selected
//! columns are cast so tables created outside rowkeep (INTEGER, VARCHAR)
//! decode as `i64` / `String`.

use rowkeep_core::{FieldDef, FieldKind, Patch, RecordSchema};

/// `"col"::TYPE AS "col"` for every field, schema order
pub fn select_list(schema: &RecordSchema) -> String {
    schema
        .fields()
        .iter()
        .map(cast_column)
        .collect::<Vec<_>>()
        .join(", ")
}

fn cast_column(field: &FieldDef) -> String {
    let quoted = field.name.quoted();
    format!("{}::{} AS {}", quoted, field.kind.sql_type(), quoted)
}

/// All rows, store-native order
pub fn list(schema: &RecordSchema) -> String {
    format!("SELECT {} FROM {}", select_list(schema), schema.table().quoted())
}

/// One row by identity (`$1`)
pub fn get(schema: &RecordSchema) -> String {
    format!(
        "SELECT {} FROM {} WHERE {} = $1",
        select_list(schema),
        schema.table().quoted(),
        schema.key().name.quoted()
    )
}

/// Existence check that locks the row for the rest of the transaction
pub fn lock_existing(schema: &RecordSchema) -> String {
    format!(
        "SELECT 1 FROM {} WHERE {} = $1 FOR UPDATE",
        schema.table().quoted(),
        schema.key().name.quoted()
    )
}

/// Insert every mutable field, plus the identity when `with_key`.
///
/// Bind order: identity first (if present), then mutable fields in schema
/// order. Returns the stored identity.
pub fn insert(schema: &RecordSchema, with_key: bool) -> String {
    let key = schema.key();
    let columns: Vec<String> = with_key
        .then_some(key)
        .into_iter()
        .chain(schema.mutable_fields())
        .map(|f| f.name.quoted())
        .collect();

    let returning = cast_column(key);

    if columns.is_empty() {
        return format!(
            "INSERT INTO {} DEFAULT VALUES RETURNING {}",
            schema.table().quoted(),
            returning
        );
    }

    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("${}", i)).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
        schema.table().quoted(),
        columns.join(", "),
        placeholders.join(", "),
        returning
    )
}

/// Move the identity sequence past the largest stored key.
///
/// Binds: `$1` the quoted table name, `$2` the bare identity column name.
/// A column without a backing sequence yields NULL and is left alone.
pub fn sync_identity(schema: &RecordSchema) -> String {
    let key = schema.key().name.quoted();
    format!(
        "SELECT setval(pg_get_serial_sequence($1, $2), GREATEST((SELECT MAX({}) FROM {}), 1))",
        key,
        schema.table().quoted()
    )
}

/// Overwrite the patched fields. Bind order: patch values, then identity.
///
/// Returns `None` for an empty patch; there is nothing to write.
pub fn update(schema: &RecordSchema, patch: &Patch) -> Option<String> {
    if patch.is_empty() {
        return None;
    }

    let assignments: Vec<String> = patch
        .iter()
        .enumerate()
        .map(|(i, (name, _))| format!("{} = ${}", name.quoted(), i + 1))
        .collect();

    Some(format!(
        "UPDATE {} SET {} WHERE {} = ${}",
        schema.table().quoted(),
        assignments.join(", "),
        schema.key().name.quoted(),
        patch.len() + 1
    ))
}

/// Remove one row by identity (`$1`)
pub fn delete(schema: &RecordSchema) -> String {
    format!(
        "DELETE FROM {} WHERE {} = $1",
        schema.table().quoted(),
        schema.key().name.quoted()
    )
}

/// `CREATE TABLE IF NOT EXISTS` for the schema
pub fn create_table(schema: &RecordSchema) -> String {
    let columns: Vec<String> = schema
        .fields()
        .iter()
        .map(|f| {
            let constraint = match (f.identity, f.kind) {
                (true, FieldKind::Integer) => " GENERATED BY DEFAULT AS IDENTITY PRIMARY KEY",
                (true, FieldKind::Text) => " PRIMARY KEY",
                (false, _) => "",
            };
            format!("    {} {}{}", f.name.quoted(), f.kind.sql_type(), constraint)
        })
        .collect();

    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n{}\n)",
        schema.table().quoted(),
        columns.join(",\n")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowkeep_core::{Ident, Preset};
    use serde_json::json;

    fn tiny() -> RecordSchema {
        RecordSchema::new(
            Ident::new("players").unwrap(),
            Ident::new("players").unwrap(),
            vec![
                FieldDef::identity("id", FieldKind::Integer).unwrap(),
                FieldDef::new("user", FieldKind::Text).unwrap(),
                FieldDef::new("rating", FieldKind::Integer).unwrap(),
            ],
        )
        .unwrap()
    }

    #[test]
    fn list_casts_and_quotes() {
        assert_eq!(
            list(&tiny()),
            r#"SELECT "id"::BIGINT AS "id", "user"::TEXT AS "user", "rating"::BIGINT AS "rating" FROM "players""#
        );
    }

    #[test]
    fn get_filters_on_identity() {
        assert!(get(&tiny()).ends_with(r#"FROM "players" WHERE "id" = $1"#));
    }

    #[test]
    fn insert_with_and_without_key() {
        assert_eq!(
            insert(&tiny(), true),
            r#"INSERT INTO "players" ("id", "user", "rating") VALUES ($1, $2, $3) RETURNING "id"::BIGINT AS "id""#
        );
        assert_eq!(
            insert(&tiny(), false),
            r#"INSERT INTO "players" ("user", "rating") VALUES ($1, $2) RETURNING "id"::BIGINT AS "id""#
        );
    }

    #[test]
    fn sync_identity_reads_max_key() {
        assert_eq!(
            sync_identity(&tiny()),
            r#"SELECT setval(pg_get_serial_sequence($1, $2), GREATEST((SELECT MAX("id") FROM "players"), 1))"#
        );
    }

    #[test]
    fn insert_identity_only_schema_uses_default_values() {
        let schema = RecordSchema::new(
            Ident::new("ids").unwrap(),
            Ident::new("ids").unwrap(),
            vec![FieldDef::identity("id", FieldKind::Integer).unwrap()],
        )
        .unwrap();
        assert_eq!(
            insert(&schema, false),
            r#"INSERT INTO "ids" DEFAULT VALUES RETURNING "id"::BIGINT AS "id""#
        );
    }

    #[test]
    fn update_numbers_key_after_patch() {
        let schema = tiny();
        let patch = Patch::decode(&schema, &json!({"rating": 1600, "user": "bob"})).unwrap();
        assert_eq!(
            update(&schema, &patch).unwrap(),
            r#"UPDATE "players" SET "user" = $1, "rating" = $2 WHERE "id" = $3"#
        );
    }

    #[test]
    fn update_empty_patch_is_none() {
        let schema = tiny();
        let patch = Patch::decode(&schema, &json!({"id": 4})).unwrap();
        assert!(update(&schema, &patch).is_none());
    }

    #[test]
    fn delete_and_lock() {
        assert_eq!(delete(&tiny()), r#"DELETE FROM "players" WHERE "id" = $1"#);
        assert_eq!(
            lock_existing(&tiny()),
            r#"SELECT 1 FROM "players" WHERE "id" = $1 FOR UPDATE"#
        );
    }

    #[test]
    fn create_table_for_presets() {
        let ddl = create_table(&Preset::Numbered.schema());
        assert!(ddl.starts_with(r#"CREATE TABLE IF NOT EXISTS "users" ("#));
        assert!(ddl.contains(r#""id" BIGINT GENERATED BY DEFAULT AS IDENTITY PRIMARY KEY"#));
        assert!(ddl.contains(r#""user" TEXT"#));

        let ddl = create_table(&Preset::Handle.schema());
        assert!(ddl.contains(r#""handle" TEXT PRIMARY KEY"#));
        assert!(ddl.contains(r#""max_rating" BIGINT"#));
    }
}
