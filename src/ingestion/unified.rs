//! Unified dataset loading.
//!
//! Most callers should use [`ingest_from_path`]:
//!
//! - If [`IngestionOptions::format`] is `None`, the format is inferred from the file extension.
//! - If an [`IngestionObserver`] is configured, success/failure/alerts are reported to it.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::error::{IngestionError, IngestionResult};
use crate::types::{DataSet, Schema};

use super::observability::{IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats};
use super::{csv, json};

/// Supported input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestionFormat {
    /// Delimiter-separated values.
    Csv,
    /// JSON array-of-objects, single object, or NDJSON.
    Json,
}

impl IngestionFormat {
    /// Parse a format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" | "tsv" | "txt" => Some(Self::Csv),
            "json" | "ndjson" | "jsonl" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Options controlling [`ingest_from_path`].
#[derive(Clone)]
pub struct IngestionOptions {
    /// If `None`, auto-detect format from file extension.
    pub format: Option<IngestionFormat>,
    /// CSV field delimiter. If `None`, `\t` for `.tsv` files and `,` otherwise.
    pub csv_delimiter: Option<u8>,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn IngestionObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: IngestionSeverity,
}

impl fmt::Debug for IngestionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngestionOptions")
            .field("format", &self.format)
            .field("csv_delimiter", &self.csv_delimiter.map(char::from))
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for IngestionOptions {
    fn default() -> Self {
        Self {
            format: None,
            csv_delimiter: None,
            observer: None,
            alert_at_or_above: IngestionSeverity::Critical,
        }
    }
}

/// Load a dataset from `path`.
///
/// When an observer is configured, this reports `on_success` with the row count, or
/// `on_failure` with a computed severity (plus `on_alert` at or above
/// `options.alert_at_or_above`).
///
/// ```no_run
/// use std::sync::Arc;
///
/// use linked_facets::ingestion::{ingest_from_path, IngestionOptions};
/// use linked_facets::types::{DataType, Field, Schema};
///
/// # fn main() -> Result<(), linked_facets::IngestionError> {
/// let schema = Schema::new(vec![
///     Field::new("status", DataType::Utf8),
///     Field::new("opened_at", DataType::Date),
/// ]);
/// let tickets = Arc::new(ingest_from_path("tickets.csv", &schema, &IngestionOptions::default())?);
/// println!("rows={}", tickets.row_count());
/// # Ok(())
/// # }
/// ```
pub fn ingest_from_path(
    path: impl AsRef<Path>,
    schema: &Schema,
    options: &IngestionOptions,
) -> IngestionResult<DataSet> {
    let path = path.as_ref();
    let format = match options.format {
        Some(f) => f,
        None => infer_format_from_path(path)?,
    };

    let result = match format {
        IngestionFormat::Csv => {
            let delimiter = options.csv_delimiter.unwrap_or_else(|| default_delimiter(path));
            csv::ingest_csv_from_path(path, schema, delimiter)
        }
        IngestionFormat::Json => json::ingest_json_from_path(path, schema),
    };

    if let Some(obs) = options.observer.as_ref() {
        let ctx = IngestionContext {
            path: path.to_path_buf(),
            format,
        };
        match &result {
            Ok(ds) => obs.on_success(&ctx, IngestionStats { rows: ds.row_count() }),
            Err(e) => {
                let severity = severity_for_error(e);
                obs.on_failure(&ctx, severity, e);
                if severity >= options.alert_at_or_above {
                    obs.on_alert(&ctx, severity, e);
                }
            }
        }
    }

    result
}

fn default_delimiter(path: &Path) -> u8 {
    match path.extension().and_then(|s| s.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => b'\t',
        _ => b',',
    }
}

fn severity_for_error(e: &IngestionError) -> IngestionSeverity {
    match e {
        IngestionError::Io(_) => IngestionSeverity::Critical,
        IngestionError::Csv(err) => match err.kind() {
            ::csv::ErrorKind::Io(_) => IngestionSeverity::Critical,
            _ => IngestionSeverity::Error,
        },
        IngestionError::SchemaMismatch { .. } | IngestionError::ParseError { .. } => {
            IngestionSeverity::Error
        }
    }
}

fn infer_format_from_path(path: &Path) -> IngestionResult<IngestionFormat> {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .ok_or_else(|| IngestionError::SchemaMismatch {
            message: format!(
                "cannot infer format: path has no extension ({})",
                path.display()
            ),
        })?;

    IngestionFormat::from_extension(ext).ok_or_else(|| IngestionError::SchemaMismatch {
        message: format!(
            "cannot infer format from extension '{ext}' for path ({})",
            path.display()
        ),
    })
}
