//! Views bound to a dataset and a dimension, kept in sync with the shared filter.
//!
//! A view is anything that presents a [`Series`]: a chart, a table, an export client. The
//! [`ViewRegistry`] owns every live view and, on [`ViewRegistry::broadcast`], recomputes each one
//! against the current [`FilterState`] and hands the fresh series to its [`ViewConsumer`].
//!
//! Broadcasting is synchronous and visits views in registration order. A consumer that does slow
//! work inside [`ViewConsumer::render`] delays the views after it, so expensive rendering should
//! be deferred by the consumer itself.

mod observer;

use std::fmt;
use std::sync::Arc;

use crate::dimension::Dimension;
use crate::error::{DashboardError, DashboardResult};
use crate::processing::{aggregate, compare, histogram, FilterState};
use crate::types::{DataSet, Series};

pub use observer::{
    DashboardEvent, DashboardMetrics, DashboardMetricsSnapshot, DashboardObserver, FilterChange,
    StdErrObserver, TracingObserver,
};

/// Identifier handed out at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId(pub u64);

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Bucketing strategy requested for a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    /// Month for `Date` fields, categorical otherwise.
    #[default]
    Auto,
    Categorical,
    Month,
    Year,
    /// Duration histogram; requires an end field.
    Duration,
}

/// What a view aggregates: a field, a mode and (for durations) the end field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewSpec {
    pub field: String,
    pub mode: ViewMode,
    pub end_field: Option<String>,
}

impl ViewSpec {
    pub fn new(field: impl Into<String>, mode: ViewMode) -> Self {
        Self {
            field: field.into(),
            mode,
            end_field: None,
        }
    }

    pub fn auto(field: impl Into<String>) -> Self {
        Self::new(field, ViewMode::Auto)
    }

    pub fn categorical(field: impl Into<String>) -> Self {
        Self::new(field, ViewMode::Categorical)
    }

    pub fn month(field: impl Into<String>) -> Self {
        Self::new(field, ViewMode::Month)
    }

    pub fn year(field: impl Into<String>) -> Self {
        Self::new(field, ViewMode::Year)
    }

    pub fn duration(start_field: impl Into<String>, end_field: impl Into<String>) -> Self {
        Self::new(start_field, ViewMode::Duration).with_end_field(end_field)
    }

    pub fn with_end_field(mut self, end_field: impl Into<String>) -> Self {
        self.end_field = Some(end_field.into());
        self
    }

    /// Turn the spec into a [`Dimension`], checking it against `dataset`'s schema.
    pub fn resolve(&self, dataset: &DataSet) -> DashboardResult<Dimension> {
        let schema = &dataset.schema;
        let dimension = match self.mode {
            ViewMode::Auto => Dimension::infer(schema, &self.field)?,
            ViewMode::Categorical => Dimension::categorical(&self.field),
            ViewMode::Month => Dimension::month(&self.field),
            ViewMode::Year => Dimension::year(&self.field),
            ViewMode::Duration => {
                let end = self
                    .end_field
                    .as_ref()
                    .ok_or_else(|| DashboardError::MissingEndField {
                        start_field: self.field.clone(),
                    })?;
                Dimension::duration(&self.field, end)
            }
        };
        dimension.validate(schema)?;
        Ok(dimension)
    }
}

/// Per-render metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderMeta {
    pub view: ViewId,
    /// Visible records in the view's dataset.
    pub total: usize,
    /// All records in the view's dataset.
    pub dataset_total: usize,
    /// Period comparison for a single selected value on the view's own dimension.
    pub variation_text: Option<String>,
}

/// Receives fresh series for one view.
pub trait ViewConsumer {
    fn render(&mut self, series: &Series, meta: &RenderMeta);
}

impl<F> ViewConsumer for F
where
    F: FnMut(&Series, &RenderMeta),
{
    fn render(&mut self, series: &Series, meta: &RenderMeta) {
        self(series, meta)
    }
}

struct View {
    id: ViewId,
    dataset: Arc<DataSet>,
    dimension: Dimension,
    consumer: Box<dyn ViewConsumer>,
    latest: Series,
    latest_meta: Option<RenderMeta>,
}

impl View {
    fn recompute(&self, filters: &FilterState, with_comparison: bool) -> (Series, RenderMeta) {
        let ds = self.dataset.as_ref();
        let series = match &self.dimension {
            Dimension::Duration { start, end } => histogram(filters.visible(ds), start, end, filters),
            other => aggregate(filters.visible(ds), other),
        };

        let variation_text = match filters.accepted(&self.dimension) {
            Some(values) if with_comparison && values.len() == 1 && !self.dimension.is_duration() => {
                values
                    .iter()
                    .next()
                    .and_then(|label| compare(ds, filters, &self.dimension, label).variation_text)
            }
            _ => None,
        };

        let meta = RenderMeta {
            view: self.id,
            total: filters.visible_count(ds),
            dataset_total: ds.row_count(),
            variation_text,
        };
        (series, meta)
    }
}

/// Ordered collection of live views.
#[derive(Default)]
pub struct ViewRegistry {
    views: Vec<View>,
    next_id: u64,
}

impl fmt::Debug for ViewRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewRegistry")
            .field("views_len", &self.views.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}

impl ViewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a view and render it once against `filters`.
    ///
    /// # Errors
    ///
    /// Fails without registering anything when `spec` is a duration without an end field, or names
    /// a field missing from `dataset`.
    pub fn register(
        &mut self,
        dataset: Arc<DataSet>,
        spec: &ViewSpec,
        consumer: Box<dyn ViewConsumer>,
        filters: &FilterState,
        with_comparison: bool,
    ) -> DashboardResult<ViewId> {
        let dimension = spec.resolve(&dataset)?;
        let id = ViewId(self.next_id);
        self.next_id += 1;

        let mut view = View {
            id,
            dataset,
            dimension,
            consumer,
            latest: Series::new(),
            latest_meta: None,
        };
        render(&mut view, filters, with_comparison);
        self.views.push(view);
        Ok(id)
    }

    /// Drop a view. Returns `false` if `id` was not registered.
    pub fn unregister(&mut self, id: ViewId) -> bool {
        let before = self.views.len();
        self.views.retain(|v| v.id != id);
        self.views.len() != before
    }

    /// Recompute and render every view, in registration order. Returns the number of renders.
    pub fn broadcast(&mut self, filters: &FilterState, with_comparison: bool) -> usize {
        for view in &mut self.views {
            render(view, filters, with_comparison);
        }
        self.views.len()
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// Registered ids, in registration order.
    pub fn ids(&self) -> impl Iterator<Item = ViewId> + '_ {
        self.views.iter().map(|v| v.id)
    }

    pub fn dimension(&self, id: ViewId) -> Option<&Dimension> {
        self.find(id).map(|v| &v.dimension)
    }

    pub fn dataset(&self, id: ViewId) -> Option<&Arc<DataSet>> {
        self.find(id).map(|v| &v.dataset)
    }

    /// Most recently rendered series of a view.
    pub fn latest(&self, id: ViewId) -> Option<&Series> {
        self.find(id).map(|v| &v.latest)
    }

    pub fn latest_meta(&self, id: ViewId) -> Option<&RenderMeta> {
        self.find(id).and_then(|v| v.latest_meta.as_ref())
    }

    fn find(&self, id: ViewId) -> Option<&View> {
        self.views.iter().find(|v| v.id == id)
    }
}

fn render(view: &mut View, filters: &FilterState, with_comparison: bool) {
    let (series, meta) = view.recompute(filters, with_comparison);
    view.consumer.render(&series, &meta);
    view.latest = series;
    view.latest_meta = Some(meta);
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::types::{DataType, Field, Schema, Value};

    type Log = Rc<RefCell<Vec<(Series, RenderMeta)>>>;

    fn recorder(log: &Log) -> Box<dyn ViewConsumer> {
        let log = Rc::clone(log);
        Box::new(move |series: &Series, meta: &RenderMeta| {
            log.borrow_mut().push((series.clone(), meta.clone()));
        })
    }

    fn tickets() -> Arc<DataSet> {
        let schema = Schema::new(vec![
            Field::new("team", DataType::Utf8),
            Field::new("opened_at", DataType::Date),
            Field::new("closed_at", DataType::Date),
        ]);
        let rows = [
            ("ops", "2024-01-15 10:00:00", "2024-01-15 10:10:00"),
            ("dev", "2024-01-20 10:00:00", "2024-01-20 12:00:00"),
            ("ops", "2024-02-01 10:00:00", "2024-02-01 10:40:00"),
        ]
        .into_iter()
        .map(|(t, o, c)| {
            vec![
                Value::Utf8(t.to_string()),
                Value::Utf8(o.to_string()),
                Value::Utf8(c.to_string()),
            ]
        })
        .collect();
        Arc::new(DataSet::new(schema, rows))
    }

    #[test]
    fn spec_resolution() {
        let ds = tickets();
        assert_eq!(
            ViewSpec::auto("opened_at").resolve(&ds).unwrap(),
            Dimension::month("opened_at")
        );
        assert_eq!(
            ViewSpec::year("opened_at").resolve(&ds).unwrap(),
            Dimension::year("opened_at")
        );
        assert_eq!(
            ViewSpec::duration("opened_at", "closed_at").resolve(&ds).unwrap(),
            Dimension::duration("opened_at", "closed_at")
        );
        assert_eq!(
            ViewSpec::new("opened_at", ViewMode::Duration).resolve(&ds),
            Err(DashboardError::MissingEndField {
                start_field: "opened_at".to_string()
            })
        );
        assert!(matches!(
            ViewSpec::categorical("nope").resolve(&ds),
            Err(DashboardError::UnknownField { .. })
        ));
    }

    #[test]
    fn register_renders_once_immediately() {
        let log: Log = Rc::default();
        let mut registry = ViewRegistry::new();
        let filters = FilterState::new();

        let id = registry
            .register(tickets(), &ViewSpec::auto("team"), recorder(&log), &filters, true)
            .unwrap();

        let log = log.borrow();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].0.labels, vec!["ops", "dev"]);
        assert_eq!(log[0].1.view, id);
        assert_eq!(log[0].1.total, 3);
        assert_eq!(log[0].1.dataset_total, 3);
        assert_eq!(registry.latest(id), Some(&log[0].0));
    }

    #[test]
    fn failed_registration_renders_nothing() {
        let log: Log = Rc::default();
        let mut registry = ViewRegistry::new();
        let err = registry
            .register(
                tickets(),
                &ViewSpec::new("opened_at", ViewMode::Duration),
                recorder(&log),
                &FilterState::new(),
                true,
            )
            .unwrap_err();
        assert!(matches!(err, DashboardError::MissingEndField { .. }));
        assert!(registry.is_empty());
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn broadcast_visits_views_in_registration_order() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let mut registry = ViewRegistry::new();
        let filters = FilterState::new();
        for field in ["team", "opened_at"] {
            let order = Rc::clone(&order);
            registry
                .register(
                    tickets(),
                    &ViewSpec::auto(field),
                    Box::new(move |_: &Series, meta: &RenderMeta| order.borrow_mut().push(meta.view)),
                    &filters,
                    false,
                )
                .unwrap();
        }
        order.borrow_mut().clear();

        assert_eq!(registry.broadcast(&filters, false), 2);
        assert_eq!(*order.borrow(), vec![ViewId(0), ViewId(1)]);
    }

    #[test]
    fn duration_view_uses_the_histogram() {
        let log: Log = Rc::default();
        let mut registry = ViewRegistry::new();
        registry
            .register(
                tickets(),
                &ViewSpec::duration("opened_at", "closed_at"),
                recorder(&log),
                &FilterState::new(),
                true,
            )
            .unwrap();
        let log = log.borrow();
        assert_eq!(log[0].0.labels, vec!["under 30 minutes", "30–45m", "1–24h"]);
        assert_eq!(log[0].0.values, vec![1, 1, 1]);
        assert_eq!(log[0].1.variation_text, None);
    }

    #[test]
    fn single_selection_carries_a_comparison() {
        let log: Log = Rc::default();
        let mut registry = ViewRegistry::new();
        let month = Dimension::month("opened_at");
        let mut filters = FilterState::new();
        filters.toggle(&month, "Fevereiro");

        registry
            .register(tickets(), &ViewSpec::month("opened_at"), recorder(&log), &filters, true)
            .unwrap();
        assert_eq!(
            log.borrow()[0].1.variation_text.as_deref(),
            Some("50.0% less")
        );

        registry.broadcast(&filters, false);
        assert_eq!(log.borrow()[1].1.variation_text, None);
    }

    #[test]
    fn unregister_removes_the_view() {
        let log: Log = Rc::default();
        let mut registry = ViewRegistry::new();
        let id = registry
            .register(tickets(), &ViewSpec::auto("team"), recorder(&log), &FilterState::new(), true)
            .unwrap();
        assert!(registry.unregister(id));
        assert!(!registry.unregister(id));
        assert_eq!(registry.broadcast(&FilterState::new(), true), 0);
        assert_eq!(log.borrow().len(), 1);
        assert_eq!(registry.latest(id), None);
    }
}
