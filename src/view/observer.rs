use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::dimension::Dimension;

use super::ViewId;

/// How a filter mutation changed the shared state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterChange {
    Toggled,
    SetExclusive,
    Cleared,
    ClearedAll,
}

/// Events emitted by a [`crate::Dashboard`].
#[derive(Debug, Clone)]
pub enum DashboardEvent {
    FilterChanged {
        change: FilterChange,
        dimension: Option<Dimension>,
        /// Constrained dimensions after the change.
        active_dimensions: usize,
    },
    ViewRegistered { view: ViewId, dimension: Dimension },
    ViewUnregistered { view: ViewId },
    ViewRendered {
        view: ViewId,
        buckets: usize,
        total: usize,
    },
    BroadcastFinished {
        views: usize,
        elapsed: Duration,
        metrics: DashboardMetricsSnapshot,
    },
}

/// Observer hook for dashboard events.
pub trait DashboardObserver: Send + Sync {
    fn on_event(&self, event: &DashboardEvent);
}

/// Forwards events to `tracing`: broadcasts and filter changes at `debug`, renders at `trace`.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl DashboardObserver for TracingObserver {
    fn on_event(&self, event: &DashboardEvent) {
        match event {
            DashboardEvent::FilterChanged {
                change,
                dimension,
                active_dimensions,
            } => {
                let dimension = dimension.as_ref().map(ToString::to_string);
                tracing::debug!(?change, ?dimension, active_dimensions, "filter changed");
            }
            DashboardEvent::ViewRegistered { view, dimension } => {
                tracing::debug!(view = %view, %dimension, "view registered");
            }
            DashboardEvent::ViewUnregistered { view } => {
                tracing::debug!(view = %view, "view unregistered");
            }
            DashboardEvent::ViewRendered {
                view,
                buckets,
                total,
            } => {
                tracing::trace!(view = %view, buckets, total, "view rendered");
            }
            DashboardEvent::BroadcastFinished {
                views,
                elapsed,
                metrics,
            } => {
                tracing::debug!(views, ?elapsed, %metrics, "broadcast finished");
            }
        }
    }
}

/// A simple stderr logger for dashboard events.
#[derive(Debug, Default)]
pub struct StdErrObserver;

impl DashboardObserver for StdErrObserver {
    fn on_event(&self, event: &DashboardEvent) {
        eprintln!("[dashboard] {event:?}");
    }
}

/// Running counters for a dashboard.
///
/// Updated on every mutation and broadcast; callers can snapshot them at any time through the
/// handle returned by [`crate::Dashboard::metrics`].
#[derive(Debug, Default)]
pub struct DashboardMetrics {
    filter_mutations: AtomicU64,
    broadcasts: AtomicU64,
    renders: AtomicU64,
    last_broadcast_ns: AtomicU64,
}

impl DashboardMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_filter_mutation(&self) {
        let _ = self.filter_mutations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn on_render(&self) {
        let _ = self.renders.fetch_add(1, Ordering::Relaxed);
    }

    pub fn on_broadcast(&self, elapsed: Duration) {
        let _ = self.broadcasts.fetch_add(1, Ordering::Relaxed);
        self.last_broadcast_ns.store(
            elapsed.as_nanos().min(u64::MAX as u128) as u64,
            Ordering::Relaxed,
        );
    }

    pub fn snapshot(&self) -> DashboardMetricsSnapshot {
        DashboardMetricsSnapshot {
            filter_mutations: self.filter_mutations.load(Ordering::Relaxed),
            broadcasts: self.broadcasts.load(Ordering::Relaxed),
            renders: self.renders.load(Ordering::Relaxed),
            last_broadcast: Duration::from_nanos(self.last_broadcast_ns.load(Ordering::Relaxed)),
        }
    }
}

/// Immutable snapshot of [`DashboardMetrics`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardMetricsSnapshot {
    pub filter_mutations: u64,
    pub broadcasts: u64,
    pub renders: u64,
    pub last_broadcast: Duration,
}

impl fmt::Display for DashboardMetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "filter_mutations={}, broadcasts={}, renders={}, last_broadcast={:?}",
            self.filter_mutations, self.broadcasts, self.renders, self.last_broadcast
        )
    }
}
