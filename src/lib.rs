//! `linked-facets` keeps several views of the same in-memory [`types::DataSet`] in lock-step
//! under one shared facet filter.
//!
//! Clicking a value in any view toggles it in the shared [`processing::FilterState`]; every
//! registered view is then recomputed and re-rendered before the call returns.
//!
//! ## Dimensions
//!
//! A view aggregates along one [`dimension::Dimension`]:
//!
//! - **Categorical**: the raw field value
//! - **Month**: month name of a date / date-time field, series sorted January → December
//! - **Year**: leading four digits of a date field
//! - **Duration**: fixed elapsed-time bins between a start and an end timestamp; empty bins hidden
//!
//! Records with a missing or malformed value simply have no bucket for that dimension; nothing
//! in aggregation or filtering returns an error for bad data.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use linked_facets::dimension::Dimension;
//! use linked_facets::types::{DataSet, DataType, Field, Schema, Series, Value};
//! use linked_facets::view::{RenderMeta, ViewSpec};
//! use linked_facets::Dashboard;
//!
//! let schema = Schema::new(vec![
//!     Field::new("team", DataType::Utf8),
//!     Field::new("data_abertura", DataType::Date),
//! ]);
//! let tickets = Arc::new(DataSet::new(
//!     schema,
//!     vec![
//!         vec![Value::Utf8("ops".into()), Value::Utf8("2024-01-15 10:00:00".into())],
//!         vec![Value::Utf8("dev".into()), Value::Utf8("2024-02-01 10:00:00".into())],
//!     ],
//! ));
//!
//! let mut dashboard = Dashboard::default();
//! let months = dashboard
//!     .register(tickets.clone(), &ViewSpec::auto("data_abertura"), |s: &Series, m: &RenderMeta| {
//!         println!("{:?} {:?} ({} of {})", s.labels, s.values, m.total, m.dataset_total);
//!     })
//!     .unwrap();
//! dashboard
//!     .register(tickets.clone(), &ViewSpec::auto("team"), |_: &Series, _: &RenderMeta| {})
//!     .unwrap();
//!
//! // A click on the "Janeiro" bar narrows every view.
//! dashboard.toggle_view(months, "Janeiro").unwrap();
//! assert_eq!(dashboard.visible_count(&tickets), 1);
//! assert!(dashboard.filters().accepted(&Dimension::month("data_abertura")).is_some());
//! ```
//!
//! ## Modules
//!
//! - [`dimension`]: bucket extraction (month table, duration bins, timestamp parsing)
//! - [`processing`]: filter state, aggregation, histogram, period comparison, reductions
//! - [`view`]: view specs, the registry and its observer hooks
//! - [`dashboard`]: the filter + registry facade
//! - [`report`]: export snapshot with per-field summaries
//! - [`ingestion`]: CSV/JSON loading into a [`types::DataSet`]
//! - [`types`], [`error`]: data model and error types

pub mod dashboard;
pub mod dimension;
pub mod error;
pub mod ingestion;
pub mod processing;
pub mod report;
pub mod types;
pub mod view;

pub use dashboard::{Dashboard, DashboardOptions};
pub use error::{DashboardError, DashboardResult, IngestionError, IngestionResult};
