//! Application state: the active source, the session and the view selection.

use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::data::{ChartKind, ChartLimits, DashboardView, Selection, Session};
use crate::error::SourceError;
use crate::source::{DataSource, Delivery, IngestMode};

/// Main application state.
///
/// Owns exactly one source at a time. Deliveries are ingested one by one,
/// each to completion, in the order the source hands them out.
pub struct App {
    source: Box<dyn DataSource>,
    pub session: Session,
    pub selection: Selection,
    pub chart: ChartKind,
    pub chart_limits: ChartLimits,
    pub load_error: Option<SourceError>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl App {
    /// Create a new App reading from the given source.
    pub fn new(source: Box<dyn DataSource>, chart_limits: ChartLimits) -> Self {
        Self {
            source,
            session: Session::new(),
            selection: Selection::default(),
            chart: ChartKind::default(),
            chart_limits,
            load_error: None,
            last_updated: None,
        }
    }

    /// Returns a description of the current data source.
    pub fn source_description(&self) -> &str {
        self.source.description()
    }

    /// The ingestion mode of the current source.
    pub fn mode(&self) -> IngestMode {
        self.source.mode()
    }

    /// Replace the active source, dropping (and so closing) the old one.
    ///
    /// Switching to a source of a different ingestion mode starts a fresh
    /// session: counters, records and the filter selection are reset.
    pub fn switch_source(&mut self, source: Box<dyn DataSource>) {
        let previous = self.source.mode();
        info!(from = self.source.description(), to = source.description(), "Switching source");

        self.source = source;
        self.load_error = None;

        if self.source.mode() != previous {
            info!(mode = ?self.source.mode(), "Ingestion mode changed, resetting session");
            self.session.reset();
            self.selection = Selection::default();
            self.last_updated = None;
        }
    }

    /// Drain every delivery the source has ready.
    ///
    /// Returns true if any data was ingested.
    pub fn reload_data(&mut self) -> bool {
        let mut changed = false;

        while let Some(delivery) = self.source.poll() {
            changed |= match delivery {
                Delivery::Batch(arrivals) => self.session.ingest_batch(&arrivals) > 0,
                Delivery::Event(bucket) => self.session.ingest_event(bucket, Utc::now()),
            };
        }

        let error = self.source.error();
        if error.is_some() && error != self.load_error {
            if let Some(ref e) = error {
                warn!(source = self.source.description(), error = %e, "Source reported an error");
            }
        }
        self.load_error = error;

        if changed {
            self.last_updated = Some(Utc::now());
        }
        changed
    }

    /// True once the source will never deliver again.
    pub fn is_finished(&self) -> bool {
        self.source.is_exhausted()
    }

    pub fn set_route_filter(&mut self, route: Option<&str>) {
        self.selection.set_route(route);
    }

    pub fn set_instance_filter(&mut self, instance: Option<&str>) {
        self.selection.set_instance(instance);
    }

    pub fn set_status_code_filter(&mut self, status_code: Option<&str>) {
        self.selection.set_status_code(status_code);
    }

    pub fn clear_filters(&mut self) {
        self.selection = Selection::default();
    }

    /// Build the view for the current selection and chart style.
    pub fn view(&self) -> DashboardView {
        self.session
            .view(&self.selection, self.chart_limits.limit(self.chart))
    }

    /// Export the current view to a JSON file.
    pub fn export_state(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.view())?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
