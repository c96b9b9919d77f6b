//! Duration histogram over a pair of timestamp fields.

use crate::dimension::{duration_bin_index, elapsed_minutes, Dimension, DURATION_BINS};
use crate::processing::FilterState;
use crate::types::{Record, Series};

/// Count `records` into the fixed duration bins for the `(start_field, end_field)` pair.
///
/// Records with an unparseable timestamp, or whose end precedes the start, are not counted. Empty
/// bins are omitted. When `filters` constrains this pair's duration dimension, bins outside the
/// accepted set are omitted too.
pub fn histogram<'a, I>(
    records: I,
    start_field: &str,
    end_field: &str,
    filters: &FilterState,
) -> Series
where
    I: IntoIterator<Item = Record<'a>>,
{
    let mut counts = [0usize; DURATION_BINS.len()];
    let mut dropped = 0usize;

    for record in records {
        let minutes = match (record.text(start_field), record.text(end_field)) {
            (Some(start), Some(end)) => elapsed_minutes(start, end),
            _ => None,
        };
        match minutes.and_then(duration_bin_index) {
            Some(idx) => counts[idx] += 1,
            None => dropped += 1,
        }
    }
    if dropped > 0 {
        tracing::trace!(start_field, end_field, dropped, "records without a valid duration");
    }

    let accepted = filters.accepted(&Dimension::duration(start_field, end_field));
    DURATION_BINS
        .iter()
        .zip(counts)
        .filter(|(_, count)| *count > 0)
        .filter(|(bin, _)| accepted.is_none_or(|set| set.contains(bin.label)))
        .map(|(bin, count)| (bin.label, count))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::histogram;
    use crate::dimension::Dimension;
    use crate::processing::FilterState;
    use crate::types::{DataSet, DataType, Field, Schema, Value};

    fn tickets(pairs: &[(&str, &str)]) -> DataSet {
        let schema = Schema::new(vec![
            Field::new("opened_at", DataType::Date),
            Field::new("closed_at", DataType::Date),
        ]);
        let rows = pairs
            .iter()
            .map(|(a, b)| vec![Value::Utf8(a.to_string()), Value::Utf8(b.to_string())])
            .collect();
        DataSet::new(schema, rows)
    }

    #[test]
    fn lower_bound_belongs_to_the_higher_bin() {
        let ds = tickets(&[
            ("2024-01-15 10:00:00", "2024-01-15 10:29:00"),
            ("2024-01-15 10:00:00", "2024-01-15 10:30:00"),
        ]);
        let series = histogram(ds.records(), "opened_at", "closed_at", &FilterState::new());
        assert_eq!(series.labels, vec!["under 30 minutes", "30–45m"]);
        assert_eq!(series.values, vec![1, 1]);
    }

    #[test]
    fn empty_bins_are_hidden_and_order_is_fixed() {
        let ds = tickets(&[
            ("2024-01-01 00:00:00", "2024-01-03 00:00:00"),
            ("2024-01-01 00:00:00", "2024-01-01 00:05:00"),
            ("2024-01-01 00:00:00", "2024-01-01 05:00:00"),
            ("2024-01-01 00:00:00", "2024-01-01 06:00:00"),
        ]);
        let series = histogram(ds.records(), "opened_at", "closed_at", &FilterState::new());
        assert_eq!(series.labels, vec!["under 30 minutes", "1–24h", "24–48h"]);
        assert_eq!(series.values, vec![1, 2, 1]);
        assert_eq!(series.get("over 5 days"), None);
    }

    #[test]
    fn invalid_pairs_are_dropped_silently() {
        let ds = tickets(&[
            ("2024-01-02 00:00:00", "2024-01-01 00:00:00"),
            ("garbage", "2024-01-01 00:00:00"),
            ("2024-01-01 00:00:00", ""),
            ("2024-01-01 00:00:00", "2024-01-10 00:00:00"),
        ]);
        let series = histogram(ds.records(), "opened_at", "closed_at", &FilterState::new());
        assert_eq!(series.labels, vec!["over 5 days"]);
        assert_eq!(series.values, vec![1]);
    }

    #[test]
    fn accepted_bins_post_filter() {
        let ds = tickets(&[
            ("2024-01-01 00:00:00", "2024-01-01 00:10:00"),
            ("2024-01-01 00:00:00", "2024-01-01 02:00:00"),
        ]);
        let mut filters = FilterState::new();
        filters.toggle(&Dimension::duration("opened_at", "closed_at"), "1–24h");

        let series = histogram(ds.records(), "opened_at", "closed_at", &filters);
        assert_eq!(series.labels, vec!["1–24h"]);
        assert_eq!(series.values, vec![1]);
    }

    #[test]
    fn missing_fields_yield_an_empty_series() {
        let ds = tickets(&[("2024-01-01 00:00:00", "2024-01-01 00:10:00")]);
        let series = histogram(ds.records(), "opened_at", "resolved_at", &FilterState::new());
        assert!(series.is_empty());
    }
}
