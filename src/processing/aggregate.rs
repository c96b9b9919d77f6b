//! Label/count aggregation of visible records along one dimension.

use std::collections::HashMap;

use crate::dimension::{month_index, Dimension};
use crate::types::{Record, Series};

/// Group `records` by their bucket for `dimension` and count each bucket.
///
/// Buckets appear in first-seen order, except that a series made only of canonical month names is
/// put in calendar order. Records without a bucket are skipped.
pub fn aggregate<'a, I>(records: I, dimension: &Dimension) -> Series
where
    I: IntoIterator<Item = Record<'a>>,
{
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut buckets: Vec<(String, usize)> = Vec::new();

    for record in records {
        let Some(bucket) = dimension.extract(&record) else {
            continue;
        };
        match slots.get(&bucket) {
            Some(&slot) => buckets[slot].1 += 1,
            None => {
                slots.insert(bucket.clone(), buckets.len());
                buckets.push((bucket, 1));
            }
        }
    }

    sort_months(&mut buckets);
    buckets.into_iter().collect()
}

/// Reorder into calendar order when every label is a month name; otherwise leave untouched.
pub(crate) fn sort_months(buckets: &mut [(String, usize)]) {
    if buckets.is_empty() || !buckets.iter().all(|(label, _)| month_index(label).is_some()) {
        return;
    }
    buckets.sort_by_key(|(label, _)| month_index(label));
}
