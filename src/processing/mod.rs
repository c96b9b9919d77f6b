//! Filter-linked aggregation over an in-memory [`crate::types::DataSet`].
//!
//! - [`FilterState`]: the shared AND-of-OR facet predicate
//! - [`aggregate()`]: label/count series along one dimension
//! - [`histogram()`]: duration-bin series over a pair of timestamp fields
//! - [`compare()`]: count for a period vs. the period before it
//! - [`reduce()`]: single-column reductions (count/sum/min/max/mean)
//!
//! ## Example: filter → aggregate → compare
//!
//! ```rust
//! use linked_facets::dimension::Dimension;
//! use linked_facets::processing::{aggregate, compare, FilterState};
//! use linked_facets::types::{DataSet, DataType, Field, Schema, Value};
//!
//! let schema = Schema::new(vec![Field::new("opened_at", DataType::Date)]);
//! let ds = DataSet::new(
//!     schema,
//!     ["2024-01-15", "2024-02-01", "2024-02-10"]
//!         .into_iter()
//!         .map(|d| vec![Value::Utf8(d.to_string())])
//!         .collect(),
//! );
//!
//! let month = Dimension::month("opened_at");
//! let mut filters = FilterState::new();
//! filters.toggle(&month, "Fevereiro");
//!
//! let series = aggregate(filters.visible(&ds), &month);
//! assert_eq!(series.labels, vec!["Fevereiro"]);
//! assert_eq!(series.values, vec![2]);
//!
//! let cmp = compare(&ds, &filters, &month, "Fevereiro");
//! assert_eq!(cmp.variation_text.as_deref(), Some("+100.0% more"));
//! ```

pub mod aggregate;
pub mod compare;
pub mod filter;
pub mod histogram;
pub mod reduce;

pub use aggregate::aggregate;
pub use compare::{compare, previous_period, variation_text, Comparison, NOT_COMPARABLE};
pub use filter::FilterState;
pub use histogram::histogram;
pub use reduce::{reduce, ReduceOp};
