//! Period-over-period comparison for date-like bucket values.

use chrono::NaiveDate;

use crate::dimension::{month_index, Dimension, MONTH_NAMES};
use crate::processing::FilterState;
use crate::types::DataSet;

/// Variation text used when a label has no comparable previous period.
pub const NOT_COMPARABLE: &str = "—";

/// Outcome of [`compare`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    /// The label that was compared.
    pub label: String,
    /// Visible records with `label` selected.
    pub total: usize,
    /// The preceding period, if one could be derived from `label`.
    pub previous_label: Option<String>,
    /// Visible records with `previous_label` selected.
    pub previous_total: Option<usize>,
    /// `"+X.X% more"`, `"X.X% less"`, `"no change"`, [`NOT_COMPARABLE`], or `None` when the
    /// previous period holds no records.
    pub variation_text: Option<String>,
}

/// The period immediately preceding `label`.
///
/// Month names wrap (December precedes January), bare years step back one year and `YYYY-MM-DD`
/// dates step back one calendar day. Anything else has no previous period.
pub fn previous_period(label: &str) -> Option<String> {
    if let Some(idx) = month_index(label) {
        return Some(MONTH_NAMES[(idx + 11) % 12].to_string());
    }
    if label.len() == 4 && label.bytes().all(|b| b.is_ascii_digit()) {
        let year: u32 = label.parse().ok()?;
        return year.checked_sub(1).map(|y| format!("{y:04}"));
    }
    if label.len() == 10 {
        let date = NaiveDate::parse_from_str(label, "%Y-%m-%d").ok()?;
        return date.pred_opt().map(|d| d.format("%Y-%m-%d").to_string());
    }
    None
}

/// Percentage change from `previous` to `current`, one decimal place.
///
/// `None` when there is no previous total or it is zero. A change that rounds to `0.0` is
/// `"no change"`.
pub fn variation_text(current: usize, previous: Option<usize>) -> Option<String> {
    let previous = previous.filter(|p| *p > 0)?;
    let change = (current as f64 - previous as f64) / previous as f64 * 100.0;
    let change = (change * 10.0).round() / 10.0;
    if change == 0.0 {
        return Some("no change".to_string());
    }
    Some(if change > 0.0 {
        format!("+{change:.1}% more")
    } else {
        format!("{:.1}% less", change.abs())
    })
}

/// Count visible records with `dimension` set to `label` alone, then to its previous period.
///
/// `filters` is read, never modified: the selections are applied to a scratch copy, so every other
/// constraint still applies and the caller observes the same state afterwards.
pub fn compare(
    dataset: &DataSet,
    filters: &FilterState,
    dimension: &Dimension,
    label: &str,
) -> Comparison {
    let mut scratch = filters.clone();

    scratch.set_exclusive(dimension, [label]);
    let total = scratch.visible_count(dataset);

    let previous_label = previous_period(label);
    let previous_total = previous_label.as_ref().map(|prev| {
        scratch.set_exclusive(dimension, [prev.as_str()]);
        scratch.visible_count(dataset)
    });

    let variation_text = match previous_label {
        Some(_) => variation_text(total, previous_total),
        None => Some(NOT_COMPARABLE.to_string()),
    };
    tracing::debug!(%dimension, label, total, ?previous_total, "period comparison");

    Comparison {
        label: label.to_string(),
        total,
        previous_label,
        previous_total,
        variation_text,
    }
}
