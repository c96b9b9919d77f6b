//! CSV loading.

use std::path::Path;

use crate::error::{IngestionError, IngestionResult};
use crate::types::{DataSet, DataType, Schema, Value};

/// Load a CSV file into a [`DataSet`].
///
/// Rules:
///
/// - The first line is a header; it must name every schema field (order can differ, extra columns
///   are ignored).
/// - Empty cells become [`Value::Null`].
/// - `Date` fields are kept as text. A malformed date is not a load error; it simply has no month
///   or year bucket later on.
pub fn ingest_csv_from_path(
    path: impl AsRef<Path>,
    schema: &Schema,
    delimiter: u8,
) -> IngestionResult<DataSet> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .from_path(path)?;
    ingest_csv_from_reader(&mut rdr, schema)
}

/// Load comma-separated CSV text.
pub fn ingest_csv_from_str(input: &str, schema: &Schema) -> IngestionResult<DataSet> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(input.as_bytes());
    ingest_csv_from_reader(&mut rdr, schema)
}

/// Load CSV data from an existing reader.
pub fn ingest_csv_from_reader<R: std::io::Read>(
    rdr: &mut csv::Reader<R>,
    schema: &Schema,
) -> IngestionResult<DataSet> {
    let headers = rdr.headers()?.clone();

    let col_idxs = schema
        .fields
        .iter()
        .map(|field| {
            headers
                .iter()
                .position(|h| h.trim() == field.name)
                .ok_or_else(|| IngestionError::SchemaMismatch {
                    message: format!(
                        "missing required column '{}'. headers={:?}",
                        field.name,
                        headers.iter().collect::<Vec<_>>()
                    ),
                })
        })
        .collect::<IngestionResult<Vec<usize>>>()?;

    let mut rows: Vec<Vec<Value>> = Vec::new();
    for (row_idx0, result) in rdr.records().enumerate() {
        // 1-based, and the header occupies line 1.
        let line = row_idx0 + 2;
        let record = result?;

        let row = schema
            .fields
            .iter()
            .zip(&col_idxs)
            .map(|(field, &idx)| {
                parse_cell(line, &field.name, &field.data_type, record.get(idx).unwrap_or(""))
            })
            .collect::<IngestionResult<Vec<Value>>>()?;
        rows.push(row);
    }

    tracing::debug!(rows = rows.len(), fields = schema.fields.len(), "csv loaded");
    Ok(DataSet::new(schema.clone(), rows))
}

fn parse_cell(row: usize, column: &str, data_type: &DataType, raw: &str) -> IngestionResult<Value> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(Value::Null);
    }

    let parse_error = |message: String| IngestionError::ParseError {
        row,
        column: column.to_owned(),
        raw: raw.to_owned(),
        message,
    };

    match data_type {
        DataType::Utf8 | DataType::Date => Ok(Value::Utf8(trimmed.to_owned())),
        DataType::Int64 => trimmed
            .parse::<i64>()
            .map(Value::Int64)
            .map_err(|e| parse_error(e.to_string())),
        DataType::Float64 => trimmed
            .replace(',', ".")
            .parse::<f64>()
            .map(Value::Float64)
            .map_err(|e| parse_error(e.to_string())),
        DataType::Bool => parse_bool(trimmed).map(Value::Bool).map_err(parse_error),
    }
}

fn parse_bool(s: &str) -> Result<bool, String> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "t" | "1" | "yes" | "y" | "sim" | "s" => Ok(true),
        "false" | "f" | "0" | "no" | "n" | "não" | "nao" => Ok(false),
        _ => Err("expected bool (true/false/1/0/yes/no)".to_string()),
    }
}
