//! The shared facet filter.
//!
//! [`FilterState`] maps each constrained [`Dimension`] to the non-empty set of bucket values it
//! accepts. A record is visible when, for every constrained dimension, its bucket is accepted. An
//! empty state accepts everything.

use std::collections::{BTreeMap, BTreeSet};

use crate::dimension::Dimension;
use crate::types::{DataSet, Record};

/// AND-of-OR equality predicate over record dimensions.
///
/// Every mutation replaces or removes a whole entry, and an entry never holds an empty set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    accepted: BTreeMap<Dimension, BTreeSet<String>>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `value` to the accepted set of `dimension` if absent, remove it if present.
    ///
    /// Returns `true` when the value is accepted after the call.
    pub fn toggle(&mut self, dimension: &Dimension, value: impl Into<String>) -> bool {
        let value = value.into();
        let mut set = self.accepted.remove(dimension).unwrap_or_default();
        let now_accepted = if set.remove(&value) {
            false
        } else {
            set.insert(value);
            true
        };
        if !set.is_empty() {
            self.accepted.insert(dimension.clone(), set);
        }
        tracing::trace!(%dimension, now_accepted, "filter toggled");
        now_accepted
    }

    /// Replace the accepted set of `dimension`. An empty `values` clears the dimension.
    pub fn set_exclusive<I, S>(&mut self, dimension: &Dimension, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set: BTreeSet<String> = values.into_iter().map(Into::into).collect();
        if set.is_empty() {
            self.accepted.remove(dimension);
        } else {
            self.accepted.insert(dimension.clone(), set);
        }
    }

    /// Remove any constraint on `dimension`. Returns `true` if one was present.
    pub fn clear(&mut self, dimension: &Dimension) -> bool {
        self.accepted.remove(dimension).is_some()
    }

    /// Remove every constraint.
    pub fn clear_all(&mut self) {
        self.accepted.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.accepted.is_empty()
    }

    /// Accepted values for `dimension`, or `None` if it is unconstrained.
    pub fn accepted(&self, dimension: &Dimension) -> Option<&BTreeSet<String>> {
        self.accepted.get(dimension)
    }

    /// Constrained dimensions, in key order.
    pub fn dimensions(&self) -> impl Iterator<Item = &Dimension> {
        self.accepted.keys()
    }

    /// `true` if `record` passes every constrained dimension.
    ///
    /// A record with no bucket for a constrained dimension is not visible.
    pub fn is_visible(&self, record: &Record<'_>) -> bool {
        self.accepted.iter().all(|(dimension, values)| {
            dimension
                .extract(record)
                .is_some_and(|bucket| values.contains(&bucket))
        })
    }

    /// Iterate the visible records of `dataset`.
    pub fn visible<'a>(&'a self, dataset: &'a DataSet) -> impl Iterator<Item = Record<'a>> + 'a {
        dataset.records().filter(move |r| self.is_visible(r))
    }

    pub fn visible_count(&self, dataset: &DataSet) -> usize {
        self.visible(dataset).count()
    }

    /// Copy of `dataset` holding only the visible rows.
    pub fn visible_rows(&self, dataset: &DataSet) -> DataSet {
        dataset.filter_records(|r| self.is_visible(r))
    }
}
