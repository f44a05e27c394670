//! Chart-ready output built from a session.

use serde::{Deserialize, Serialize};

use super::counters::NameCount;
use super::derive::build_cache;
use super::filter::Selection;
use super::merge::merge_instances;
use super::record::RouteRecord;
use super::session::Session;

/// Chart styles the dashboard draws top-N lists with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    #[default]
    Pie,
    Column,
    Line,
    Area,
}

/// How many items each chart style shows.
///
/// These are display-layer truncation limits; the pipeline itself never
/// drops data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartLimits {
    pub pie: usize,
    pub column: usize,
    pub line: usize,
    pub area: usize,
}

impl Default for ChartLimits {
    fn default() -> Self {
        Self {
            pie: 15,
            column: 10,
            line: 8,
            area: 5,
        }
    }
}

impl ChartLimits {
    pub fn limit(&self, kind: ChartKind) -> usize {
        match kind {
            ChartKind::Pie => self.pie,
            ChartKind::Column => self.column,
            ChartKind::Line => self.line,
            ChartKind::Area => self.area,
        }
    }
}

/// Every value the filter selectors can offer, unfiltered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    pub routes: Vec<String>,
    pub instances: Vec<String>,
    pub status_codes: Vec<String>,
}

/// Everything the charting layer needs for one redraw.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub selection: Selection,
    pub total_requests: u64,
    pub top_routes: Vec<NameCount>,
    pub top_instances: Vec<NameCount>,
    pub top_status_codes: Vec<NameCount>,
    pub options: FilterOptions,
    pub routers: Vec<RouteRecord>,
    pub cloud_api: Vec<RouteRecord>,
}

impl DashboardView {
    /// Build a view from the session's counters and a processed copy of its
    /// records. The session itself is not modified.
    pub fn build(session: &Session, selection: &Selection, limit: usize) -> Self {
        let counters = session.counters();

        Self {
            selection: selection.clone(),
            total_requests: counters.instances.total(),
            top_routes: counters.routes.top(limit),
            top_instances: counters.instances.top(limit),
            top_status_codes: counters.status_codes.top(limit),
            options: FilterOptions {
                routes: counters.routes.names(),
                instances: counters.instances.names(),
                status_codes: counters.status_codes.names(),
            },
            routers: process(session.routers(), selection),
            cloud_api: process(session.cloud_api(), selection),
        }
    }
}

/// Filter, merge and derive a copy of `records`.
pub fn process(records: &[RouteRecord], selection: &Selection) -> Vec<RouteRecord> {
    let mut records = merge_instances(selection.apply(records.to_vec()));
    build_cache(&mut records);
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{ResponseType, RouteUrlEntry};
    use crate::source::{Arrival, InstanceBucket};
    use chrono::Utc;

    fn session() -> Session {
        let mut session = Session::new();
        let now = Utc::now();
        session.ingest_batch(&[Arrival::new(
            vec![
                InstanceBucket {
                    instance: "web-1".into(),
                    routers: vec![
                        RouteUrlEntry::new("GET /").with_status(200, 8).with_total_response_time(80.0),
                        RouteUrlEntry::new("POST /login").with_status(401, 2),
                    ],
                    cloud_api: vec![],
                },
                InstanceBucket {
                    instance: "web-2".into(),
                    routers: vec![RouteUrlEntry::new("GET /").with_status(500, 2).with_total_response_time(20.0)],
                    cloud_api: vec![],
                },
            ],
            now,
        )]);
        session
    }

    #[test]
    fn test_chart_limits_default() {
        let limits = ChartLimits::default();
        assert_eq!(limits.limit(ChartKind::Pie), 15);
        assert_eq!(limits.limit(ChartKind::Column), 10);
        assert_eq!(limits.limit(ChartKind::Line), 8);
        assert_eq!(limits.limit(ChartKind::Area), 5);
    }

    #[test]
    fn test_view_merges_and_derives() {
        let session = session();
        let view = DashboardView::build(&session, &Selection::default(), 15);

        assert_eq!(view.total_requests, 12);
        assert_eq!(view.top_routes[0], NameCount::new("GET /", 10));
        assert_eq!(view.top_instances[0], NameCount::new("web-1", 10));
        assert_eq!(view.options.status_codes, vec!["200", "401", "500"]);

        assert_eq!(view.routers.len(), 1);
        let row = &view.routers[0];
        assert_eq!(row.merged_instances, vec!["web-2".to_string()]);
        let root = row.entry("GET /").unwrap();
        assert_eq!(root.response_types[&ResponseType::Success], 8);
        assert_eq!(root.response_types[&ResponseType::ServerError], 2);
        assert_eq!(root.response_time, Some(10.0));
    }

    #[test]
    fn test_view_applies_selection_without_touching_session() {
        let session = session();
        let selection = Selection::new(Some("GET /"), None, Some("500"));
        let view = DashboardView::build(&session, &selection, 1);

        assert_eq!(view.top_routes.len(), 1);
        let root = view.routers[0].entry("GET /").unwrap();
        assert_eq!(root.response_types[&ResponseType::ServerError], 2);
        assert_eq!(root.response_types[&ResponseType::Success], 0);
        assert_eq!(view.routers[0].urls.len(), 1);

        // Counters and stored records are unaffected by the view
        assert_eq!(session.counters().routes.get("POST /login"), Some(2));
        assert!(session.routers()[0].urls[0].response_types.is_empty());
        assert_eq!(session.routers()[0].urls.len(), 2);
    }

    #[test]
    fn test_view_serializes_no_data_as_null() {
        let mut session = Session::new();
        session.ingest_event(
            InstanceBucket {
                instance: "web-1".into(),
                routers: vec![RouteUrlEntry::new("GET /idle")],
                cloud_api: vec![],
            },
            Utc::now(),
        );

        let view = DashboardView::build(&session, &Selection::default(), 5);
        let json = serde_json::to_value(&view).unwrap();

        assert!(json["routers"][0]["responseTime"].is_null());
        assert!(json["routers"][0]["urls"][0]["responseTime"].is_null());
        assert_eq!(json["routers"][0]["success"], 0);
    }
}
