//! JSON loading.
//!
//! Supported inputs:
//! - A JSON array of objects: `[{"a":1}, {"a":2}]`
//! - A single object
//! - Newline-delimited JSON (NDJSON): `{"a":1}\n{"a":2}\n`
//!
//! Nested fields are addressed with dot paths in schema field names (e.g. `owner.team`). A field
//! missing from an object loads as [`Value::Null`]: absent values never form a bucket, so they are
//! not a load error.

use std::fs;
use std::path::Path;

use serde_json::{Map, Value as Json};

use crate::error::{IngestionError, IngestionResult};
use crate::types::{DataSet, DataType, Schema, Value};

/// Load a JSON or NDJSON file into a [`DataSet`].
pub fn ingest_json_from_path(path: impl AsRef<Path>, schema: &Schema) -> IngestionResult<DataSet> {
    let text = fs::read_to_string(path)?;
    ingest_json_from_str(&text, schema)
}

/// Load JSON or NDJSON text into a [`DataSet`].
pub fn ingest_json_from_str(input: &str, schema: &Schema) -> IngestionResult<DataSet> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(IngestionError::SchemaMismatch {
            message: "json input is empty".to_string(),
        });
    }

    let objects = match serde_json::from_str::<Json>(trimmed) {
        Ok(Json::Array(items)) => items,
        Ok(obj @ Json::Object(_)) => vec![obj],
        Ok(_) => {
            return Err(IngestionError::SchemaMismatch {
                message: "json must be an object, an array of objects, or NDJSON".to_string(),
            });
        }
        Err(_) => parse_ndjson(trimmed)?,
    };

    let rows = objects
        .iter()
        .enumerate()
        .map(|(idx0, v)| json_row(idx0 + 1, v, schema))
        .collect::<IngestionResult<Vec<_>>>()?;

    tracing::debug!(rows = rows.len(), fields = schema.fields.len(), "json loaded");
    Ok(DataSet::new(schema.clone(), rows))
}

fn parse_ndjson(input: &str) -> IngestionResult<Vec<Json>> {
    input
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str::<Json>(line.trim()).map_err(|e| IngestionError::SchemaMismatch {
                message: format!("invalid ndjson at line {}: {}", i + 1, e),
            })
        })
        .collect()
}

fn json_row(row: usize, v: &Json, schema: &Schema) -> IngestionResult<Vec<Value>> {
    let obj = v.as_object().ok_or_else(|| IngestionError::SchemaMismatch {
        message: format!("row {row} is not a json object"),
    })?;

    schema
        .fields
        .iter()
        .map(|field| match lookup(obj, &field.name) {
            Some(jv) => convert(row, &field.name, &field.data_type, jv),
            None => Ok(Value::Null),
        })
        .collect()
}

fn lookup<'a>(root: &'a Map<String, Json>, path: &str) -> Option<&'a Json> {
    if let Some(direct) = root.get(path) {
        return Some(direct);
    }
    let mut segments = path.split('.');
    let mut current = root.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

fn convert(row: usize, column: &str, data_type: &DataType, v: &Json) -> IngestionResult<Value> {
    let mismatch = |message: &str| IngestionError::ParseError {
        row,
        column: column.to_string(),
        raw: v.to_string(),
        message: message.to_string(),
    };

    match (data_type, v) {
        (_, Json::Null) => Ok(Value::Null),
        (DataType::Utf8, Json::String(s)) => Ok(Value::Utf8(s.clone())),
        (DataType::Utf8, Json::Number(n)) => Ok(Value::Utf8(n.to_string())),
        (DataType::Utf8, Json::Bool(b)) => Ok(Value::Utf8(b.to_string())),
        (DataType::Date, Json::String(s)) => Ok(Value::Utf8(s.clone())),
        // Kept as text; it simply has no month or year bucket.
        (DataType::Date, other) => Ok(Value::Utf8(other.to_string())),
        (DataType::Bool, Json::Bool(b)) => Ok(Value::Bool(*b)),
        (DataType::Bool, _) => Err(mismatch("expected bool")),
        (DataType::Int64, Json::Number(n)) => match (n.as_i64(), n.as_u64()) {
            (Some(i), _) => Ok(Value::Int64(i)),
            (None, Some(_)) => Err(mismatch("u64 out of range for i64")),
            (None, None) => Err(mismatch("expected integer number")),
        },
        (DataType::Int64, _) => Err(mismatch("expected integer number")),
        (DataType::Float64, Json::Number(n)) => n
            .as_f64()
            .map(Value::Float64)
            .ok_or_else(|| mismatch("expected number")),
        (DataType::Float64, _) => Err(mismatch("expected number")),
        (DataType::Utf8, _) => Err(mismatch("expected string")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Field;

    #[test]
    fn flat_keys_with_dots_win_over_nesting() {
        let schema = Schema::new(vec![Field::new("owner.team", DataType::Utf8)]);
        let ds = ingest_json_from_str(
            r#"[{"owner.team":"flat"},{"owner":{"team":"nested"}}]"#,
            &schema,
        )
        .unwrap();
        assert_eq!(ds.rows[0][0], Value::Utf8("flat".to_string()));
        assert_eq!(ds.rows[1][0], Value::Utf8("nested".to_string()));
    }

    #[test]
    fn scalars_coerce_into_text_fields() {
        let schema = Schema::new(vec![
            Field::new("code", DataType::Utf8),
            Field::new("opened_at", DataType::Date),
        ]);
        let ds = ingest_json_from_str(r#"{"code": 42}"#, &schema).unwrap();
        assert_eq!(ds.rows[0], vec![Value::Utf8("42".to_string()), Value::Null]);
    }

    #[test]
    fn non_string_dates_load_as_text() {
        let schema = Schema::new(vec![Field::new("opened_at", DataType::Date)]);
        let ds = ingest_json_from_str(
            r#"[{"opened_at":"2024-01-01"},{"opened_at":20240101},{"opened_at":true}]"#,
            &schema,
        )
        .unwrap();
        assert_eq!(ds.row_count(), 3);
        assert_eq!(ds.rows[1][0], Value::Utf8("20240101".to_string()));
        assert_eq!(ds.rows[2][0], Value::Utf8("true".to_string()));
    }
}
