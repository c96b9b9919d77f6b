//! The dashboard: one shared [`FilterState`] and the views it drives.
//!
//! Every mutation goes through [`Dashboard`], which applies it to the filter and then broadcasts
//! to every registered view before returning. Independent dashboards in the same process do not
//! share anything.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use serde::Deserialize;

use crate::dimension::Dimension;
use crate::error::{DashboardError, DashboardResult};
use crate::processing::{compare, Comparison, FilterState};
use crate::report::Report;
use crate::types::DataSet;
use crate::view::{
    DashboardEvent, DashboardMetrics, DashboardObserver, FilterChange, RenderMeta, ViewConsumer,
    ViewId, ViewRegistry, ViewSpec,
};

/// Options controlling dashboard behavior.
///
/// Use [`Default`] for common cases, or decode from JSON with [`DashboardOptions::from_json_str`].
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct DashboardOptions {
    /// Attach a period comparison to views whose own dimension has exactly one accepted value.
    pub compare_single_selection: bool,
    /// Optional observer for logging/monitoring.
    #[serde(skip)]
    pub observer: Option<Arc<dyn DashboardObserver>>,
}

impl fmt::Debug for DashboardOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DashboardOptions")
            .field("compare_single_selection", &self.compare_single_selection)
            .field("observer_set", &self.observer.is_some())
            .finish()
    }
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            compare_single_selection: true,
            observer: None,
        }
    }
}

impl DashboardOptions {
    /// Decode options from a JSON object; missing keys keep their defaults.
    pub fn from_json_str(input: &str) -> DashboardResult<Self> {
        serde_json::from_str(input).map_err(|e| DashboardError::InvalidOptions(e.to_string()))
    }

    pub fn with_observer(mut self, observer: Arc<dyn DashboardObserver>) -> Self {
        self.observer = Some(observer);
        self
    }
}

/// Shared filter plus the views kept in lock-step with it.
pub struct Dashboard {
    filters: FilterState,
    views: ViewRegistry,
    options: DashboardOptions,
    metrics: Arc<DashboardMetrics>,
}

impl fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dashboard")
            .field("filters", &self.filters)
            .field("views", &self.views)
            .field("options", &self.options)
            .finish()
    }
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new(DashboardOptions::default())
    }
}

impl Dashboard {
    pub fn new(options: DashboardOptions) -> Self {
        Self {
            filters: FilterState::new(),
            views: ViewRegistry::new(),
            options,
            metrics: Arc::new(DashboardMetrics::new()),
        }
    }

    /// Current filter state (read-only; mutate through the dashboard).
    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn views(&self) -> &ViewRegistry {
        &self.views
    }

    /// Handle to live counters.
    pub fn metrics(&self) -> Arc<DashboardMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Register a view over `dataset` and render it once.
    ///
    /// # Errors
    ///
    /// [`DashboardError::MissingEndField`] for a duration spec without an end field, and
    /// [`DashboardError::UnknownField`] when the spec names a field `dataset` does not have.
    pub fn register<C>(
        &mut self,
        dataset: Arc<DataSet>,
        spec: &ViewSpec,
        consumer: C,
    ) -> DashboardResult<ViewId>
    where
        C: ViewConsumer + 'static,
    {
        let id = self.views.register(
            dataset,
            spec,
            Box::new(consumer),
            &self.filters,
            self.options.compare_single_selection,
        )?;
        self.metrics.on_render();
        if let Some(dimension) = self.views.dimension(id) {
            self.emit(DashboardEvent::ViewRegistered {
                view: id,
                dimension: dimension.clone(),
            });
        }
        self.emit_rendered(id);
        Ok(id)
    }

    /// Drop a view.
    pub fn unregister(&mut self, id: ViewId) -> DashboardResult<()> {
        if !self.views.unregister(id) {
            return Err(DashboardError::UnknownView(id.0));
        }
        self.emit(DashboardEvent::ViewUnregistered { view: id });
        Ok(())
    }

    /// Replace a view with one built from a new spec (e.g. the user switched chart type).
    ///
    /// The old view is only dropped once the new spec has been accepted.
    pub fn replace<C>(
        &mut self,
        id: ViewId,
        spec: &ViewSpec,
        consumer: C,
    ) -> DashboardResult<ViewId>
    where
        C: ViewConsumer + 'static,
    {
        let dataset = self
            .views
            .dataset(id)
            .cloned()
            .ok_or(DashboardError::UnknownView(id.0))?;
        spec.resolve(&dataset)?;
        self.unregister(id)?;
        self.register(dataset, spec, consumer)
    }

    /// Toggle `value` on `dimension`, then broadcast.
    pub fn toggle(&mut self, dimension: &Dimension, value: impl Into<String>) -> bool {
        let accepted = self.filters.toggle(dimension, value);
        self.after_mutation(FilterChange::Toggled, Some(dimension));
        accepted
    }

    /// Toggle `value` on the dimension a view aggregates (a click on one of its buckets).
    pub fn toggle_view(&mut self, id: ViewId, value: impl Into<String>) -> DashboardResult<bool> {
        let dimension = self
            .views
            .dimension(id)
            .cloned()
            .ok_or(DashboardError::UnknownView(id.0))?;
        Ok(self.toggle(&dimension, value))
    }

    /// Accept exactly `values` on `dimension`, then broadcast. Empty `values` clears it.
    pub fn set_exclusive<I, S>(&mut self, dimension: &Dimension, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filters.set_exclusive(dimension, values);
        self.after_mutation(FilterChange::SetExclusive, Some(dimension));
    }

    /// Remove the constraint on `dimension`, then broadcast.
    pub fn clear(&mut self, dimension: &Dimension) {
        self.filters.clear(dimension);
        self.after_mutation(FilterChange::Cleared, Some(dimension));
    }

    /// Remove every constraint, then broadcast.
    pub fn clear_all(&mut self) {
        self.filters.clear_all();
        self.after_mutation(FilterChange::ClearedAll, None);
    }

    /// Re-render every view against the current filter. Returns the number of renders.
    pub fn broadcast(&mut self) -> usize {
        let start = Instant::now();
        let rendered = self
            .views
            .broadcast(&self.filters, self.options.compare_single_selection);

        let ids: Vec<ViewId> = self.views.ids().collect();
        for id in ids {
            self.metrics.on_render();
            self.emit_rendered(id);
        }

        let elapsed = start.elapsed();
        self.metrics.on_broadcast(elapsed);
        self.emit(DashboardEvent::BroadcastFinished {
            views: rendered,
            elapsed,
            metrics: self.metrics.snapshot(),
        });
        rendered
    }

    /// Period comparison for `label` on `dimension` over `dataset`, under the current filter.
    ///
    /// Leaves the filter unchanged and does not broadcast.
    pub fn compare(&self, dataset: &DataSet, dimension: &Dimension, label: &str) -> Comparison {
        compare(dataset, &self.filters, dimension, label)
    }

    /// Visible records of `dataset` under the current filter.
    pub fn visible_count(&self, dataset: &DataSet) -> usize {
        self.filters.visible_count(dataset)
    }

    /// Export snapshot for `dataset`: its visible rows, every view's latest series and per-field
    /// summaries.
    pub fn report(&self, dataset: &DataSet) -> Report {
        let views = self
            .views
            .ids()
            .filter_map(|id| self.views.latest(id).map(|s| (id, s.clone())))
            .collect();
        Report::new(self.filters.visible_rows(dataset), views)
    }

    fn after_mutation(&mut self, change: FilterChange, dimension: Option<&Dimension>) {
        self.metrics.on_filter_mutation();
        self.emit(DashboardEvent::FilterChanged {
            change,
            dimension: dimension.cloned(),
            active_dimensions: self.filters.dimensions().count(),
        });
        self.broadcast();
    }

    fn emit_rendered(&self, id: ViewId) {
        if self.options.observer.is_none() {
            return;
        }
        let buckets = self.views.latest(id).map_or(0, |s| s.len());
        let total = self.views.latest_meta(id).map_or(0, |m: &RenderMeta| m.total);
        self.emit(DashboardEvent::ViewRendered {
            view: id,
            buckets,
            total,
        });
    }

    fn emit(&self, event: DashboardEvent) {
        if let Some(obs) = &self.options.observer {
            obs.on_event(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::Mutex;

    use super::*;
    use crate::types::{DataType, Field, Schema, Series, Value};

    fn tickets() -> Arc<DataSet> {
        let schema = Schema::new(vec![
            Field::new("team", DataType::Utf8),
            Field::new("opened_at", DataType::Date),
        ]);
        let rows = [
            ("ops", "2024-01-15 10:00:00"),
            ("dev", "2024-01-20 10:00:00"),
            ("ops", "2024-02-01 10:00:00"),
            ("qa", "2024-02-10 10:00:00"),
        ]
        .into_iter()
        .map(|(t, d)| vec![Value::Utf8(t.to_string()), Value::Utf8(d.to_string())])
        .collect();
        Arc::new(DataSet::new(schema, rows))
    }

    #[derive(Default)]
    struct Events(Mutex<Vec<String>>);

    impl DashboardObserver for Events {
        fn on_event(&self, event: &DashboardEvent) {
            let name = match event {
                DashboardEvent::FilterChanged { .. } => "filter",
                DashboardEvent::ViewRegistered { .. } => "registered",
                DashboardEvent::ViewUnregistered { .. } => "unregistered",
                DashboardEvent::ViewRendered { .. } => "rendered",
                DashboardEvent::BroadcastFinished { .. } => "broadcast",
            };
            self.0.lock().unwrap().push(name.to_string());
        }
    }

    #[test]
    fn options_from_json() {
        let opts = DashboardOptions::from_json_str(r#"{"compare_single_selection": false}"#).unwrap();
        assert!(!opts.compare_single_selection);
        let opts = DashboardOptions::from_json_str("{}").unwrap();
        assert!(opts.compare_single_selection);
        assert!(matches!(
            DashboardOptions::from_json_str("[1]"),
            Err(DashboardError::InvalidOptions(_))
        ));
    }

    #[test]
    fn toggle_view_filters_every_view() {
        let ds = tickets();
        let mut dash = Dashboard::default();
        let teams = Rc::new(RefCell::new(Series::new()));
        let teams2 = Rc::clone(&teams);

        let months = dash
            .register(Arc::clone(&ds), &ViewSpec::auto("opened_at"), |_: &Series, _: &RenderMeta| {})
            .unwrap();
        dash.register(Arc::clone(&ds), &ViewSpec::auto("team"), move |s: &Series, _: &RenderMeta| {
            *teams2.borrow_mut() = s.clone();
        })
        .unwrap();

        assert!(dash.toggle_view(months, "Janeiro").unwrap());
        assert_eq!(teams.borrow().labels, vec!["ops", "dev"]);
        assert_eq!(dash.visible_count(&ds), 2);

        dash.clear_all();
        assert_eq!(teams.borrow().labels, vec!["ops", "dev", "qa"]);
        assert!(matches!(
            dash.toggle_view(ViewId(99), "x"),
            Err(DashboardError::UnknownView(99))
        ));
    }

    #[test]
    fn replace_keeps_old_view_on_bad_spec() {
        let ds = tickets();
        let mut dash = Dashboard::default();
        let id = dash
            .register(Arc::clone(&ds), &ViewSpec::auto("team"), |_: &Series, _: &RenderMeta| {})
            .unwrap();

        let err = dash
            .replace(
                id,
                &ViewSpec::new("opened_at", crate::view::ViewMode::Duration),
                |_: &Series, _: &RenderMeta| {},
            )
            .unwrap_err();
        assert!(matches!(err, DashboardError::MissingEndField { .. }));
        assert_eq!(dash.views().len(), 1);

        let new_id = dash
            .replace(id, &ViewSpec::year("opened_at"), |_: &Series, _: &RenderMeta| {})
            .unwrap();
        assert_ne!(new_id, id);
        assert_eq!(dash.views().len(), 1);
        assert_eq!(
            dash.views().latest(new_id).map(|s| s.labels.clone()),
            Some(vec!["2024".to_string()])
        );
    }

    #[test]
    fn observer_and_metrics_track_mutations() {
        let events = Arc::new(Events::default());
        let mut dash = Dashboard::new(DashboardOptions::default().with_observer(events.clone()));
        let metrics = dash.metrics();
        let id = dash
            .register(tickets(), &ViewSpec::auto("team"), |_: &Series, _: &RenderMeta| {})
            .unwrap();

        dash.toggle(&Dimension::categorical("team"), "ops");
        dash.unregister(id).unwrap();
        assert_eq!(dash.unregister(id), Err(DashboardError::UnknownView(id.0)));

        let names = events.0.lock().unwrap().clone();
        assert_eq!(
            names,
            vec!["registered", "rendered", "filter", "rendered", "broadcast", "unregistered"]
        );
        let snap = metrics.snapshot();
        assert_eq!(snap.filter_mutations, 1);
        assert_eq!(snap.broadcasts, 1);
        assert_eq!(snap.renders, 2);
    }

    #[test]
    fn compare_and_report_use_current_filter() {
        let ds = tickets();
        let mut dash = Dashboard::default();
        dash.register(Arc::clone(&ds), &ViewSpec::auto("team"), |_: &Series, _: &RenderMeta| {})
            .unwrap();
        dash.toggle(&Dimension::categorical("team"), "ops");

        let cmp = dash.compare(&ds, &Dimension::month("opened_at"), "Fevereiro");
        assert_eq!(cmp.total, 1);
        assert_eq!(cmp.previous_total, Some(1));
        assert_eq!(dash.filters().dimensions().count(), 1);

        let report = dash.report(&ds);
        assert_eq!(report.visible.row_count(), 2);
        assert_eq!(report.views.len(), 1);
        assert_eq!(report.views[0].1.labels, vec!["ops"]);
    }
}
