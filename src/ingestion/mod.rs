//! Dataset loading.
//!
//! Most callers should use [`ingest_from_path`] (from [`unified`]), which:
//!
//! - auto-detects format by file extension (or you can override via [`IngestionOptions`])
//! - loads the file into an in-memory [`crate::types::DataSet`]
//! - optionally reports success/failure/alerts to an [`IngestionObserver`]
//!
//! Format-specific functions live under [`csv`] and [`json`].

pub mod csv;
pub mod json;
pub mod observability;
pub mod unified;

pub use observability::{
    CompositeObserver, IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats,
    TracingIngestionObserver,
};
pub use unified::{ingest_from_path, IngestionFormat, IngestionOptions};
