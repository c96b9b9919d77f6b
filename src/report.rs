//! Export payload: what a report or image exporter needs to reproduce the current dashboard.

use serde_json::json;

use crate::dimension::Dimension;
use crate::processing::{aggregate, reduce, ReduceOp};
use crate::types::{DataSet, Series, Value};
use crate::view::ViewId;

/// Summary of one field over the visible records.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldSummary {
    /// Every non-null value is numeric.
    Mean(f64),
    /// Value → count, in first-seen order.
    Distribution(Series),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldReport {
    pub field: String,
    pub summary: FieldSummary,
}

/// Snapshot handed to the export collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    /// Visible rows of the reported dataset.
    pub visible: DataSet,
    /// Latest series of every registered view, in registration order.
    pub views: Vec<(ViewId, Series)>,
    /// Per-field summaries over `visible`, in schema order.
    pub fields: Vec<FieldReport>,
}

impl Report {
    pub fn new(visible: DataSet, views: Vec<(ViewId, Series)>) -> Self {
        let fields = summarize(&visible);
        Self {
            visible,
            views,
            fields,
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldSummary> {
        self.fields
            .iter()
            .find(|f| f.field == name)
            .map(|f| &f.summary)
    }

    /// JSON rendering used by exporters.
    pub fn to_json(&self) -> serde_json::Value {
        let views: Vec<_> = self
            .views
            .iter()
            .map(|(id, series)| {
                json!({
                    "view": id.0,
                    "labels": series.labels,
                    "values": series.values,
                })
            })
            .collect();
        let fields: serde_json::Map<String, serde_json::Value> = self
            .fields
            .iter()
            .map(|f| {
                let summary = match &f.summary {
                    FieldSummary::Mean(mean) => json!({ "mean": mean }),
                    FieldSummary::Distribution(series) => {
                        let counts: serde_json::Map<String, serde_json::Value> = series
                            .iter()
                            .map(|(label, count)| (label.to_string(), json!(count)))
                            .collect();
                        json!({ "distribution": counts })
                    }
                };
                (f.field.clone(), summary)
            })
            .collect();

        json!({
            "visible_rows": self.visible.row_count(),
            "views": views,
            "fields": fields,
        })
    }
}

/// Summarize every field of `visible`.
pub fn summarize(visible: &DataSet) -> Vec<FieldReport> {
    visible
        .schema
        .field_names()
        .filter_map(|name| {
            summarize_field(visible, name).map(|summary| FieldReport {
                field: name.to_string(),
                summary,
            })
        })
        .collect()
}

/// Mean when every non-null value of `field` is numeric, otherwise its value distribution.
///
/// `None` if `field` is not in the schema.
pub fn summarize_field(visible: &DataSet, field: &str) -> Option<FieldSummary> {
    let idx = visible.schema.index_of(field)?;
    let mut non_null = visible
        .rows
        .iter()
        .filter_map(|row| row.get(idx))
        .filter(|v| !v.is_null())
        .peekable();

    let numeric = non_null.peek().is_some() && non_null.all(|v| v.as_f64().is_some());
    if numeric {
        if let Some(Value::Float64(mean)) = reduce(visible, field, ReduceOp::Mean) {
            return Some(FieldSummary::Mean(mean));
        }
    }
    Some(FieldSummary::Distribution(aggregate(
        visible.records(),
        &Dimension::categorical(field),
    )))
}
