//! Accumulated aggregation state for one ingestion session.

use chrono::{DateTime, Utc};
use tracing::debug;

use super::counters::Counters;
use super::filter::Selection;
use super::flatten::flatten;
use super::record::RouteRecord;
use super::view::DashboardView;
use crate::source::{Arrival, InstanceBucket};

/// Counters and record history for the current ingestion mode.
///
/// Records only ever grow; counters only ever increase. Both are cleared
/// together by [`Session::reset`].
#[derive(Debug, Clone, Default)]
pub struct Session {
    counters: Counters,
    routers: Vec<RouteRecord>,
    cloud_api: Vec<RouteRecord>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingest a bulk batch of arrivals.
    ///
    /// Returns the number of instance buckets ingested.
    pub fn ingest_batch(&mut self, arrivals: &[Arrival]) -> usize {
        let flattened = flatten(arrivals, &mut self.counters);
        let added = flattened.routers.len();

        self.routers.extend(flattened.routers);
        self.cloud_api.extend(flattened.cloud_api);

        debug!(arrivals = arrivals.len(), buckets = added, "Ingested batch");
        added
    }

    /// Ingest one real-time event, stamped with `received_at`.
    ///
    /// Events with neither router nor cloud API data are skipped and leave
    /// the session untouched. Returns whether the event was ingested.
    pub fn ingest_event(&mut self, bucket: InstanceBucket, received_at: DateTime<Utc>) -> bool {
        if bucket.is_empty() {
            debug!(instance = %bucket.instance, "Skipping empty event");
            return false;
        }

        let instance = bucket.instance.clone();
        let flattened = flatten(&[Arrival::new(vec![bucket], received_at)], &mut self.counters);
        self.routers.extend(flattened.routers);
        self.cloud_api.extend(flattened.cloud_api);

        debug!(instance = %instance, records = self.routers.len(), "Ingested event");
        true
    }

    /// Drop all counters and records.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn counters(&self) -> &Counters {
        &self.counters
    }

    pub fn routers(&self) -> &[RouteRecord] {
        &self.routers
    }

    pub fn cloud_api(&self) -> &[RouteRecord] {
        &self.cloud_api
    }

    pub fn is_empty(&self) -> bool {
        self.routers.is_empty() && self.cloud_api.is_empty() && self.counters.is_empty()
    }

    /// Build a chart-ready view with top lists truncated to `limit`.
    pub fn view(&self, selection: &Selection, limit: usize) -> DashboardView {
        DashboardView::build(self, selection, limit)
    }
}
