//! Data models and the aggregation pipeline for request-log snapshots.
//!
//! This module turns raw arrivals into chart-ready aggregates.
//!
//! ## Submodules
//!
//! - [`status`]: Status code to [`ResponseType`] classification
//! - [`record`]: Normalized [`RouteRecord`]s and typed [`RouteUrlEntry`]s
//! - [`counters`]: Running totals by route, instance and status code
//! - [`flatten`]: Arrivals to records, feeding [`Counters`]
//! - [`filter`]: Route / instance / status-code view filters and [`Selection`]
//! - [`merge`]: Folding consecutive records from different instances
//! - [`derive`]: Response-type totals and average response times
//! - [`session`]: The accumulated state of one ingestion session
//! - [`view`]: The [`DashboardView`] handed to the charting layer
//!
//! ## Data Flow
//!
//! ```text
//! Arrival / InstanceBucket (raw JSON)
//!        │
//!        ▼
//! flatten() ──────────▶ Counters (all data, never filtered)
//!        │
//!        ▼
//! Session records (append-only)
//!        │  copy per view
//!        ▼
//! Selection::apply() ─▶ merge_instances() ─▶ build_cache()
//!        │
//!        ▼
//! DashboardView
//! ```

pub mod counters;
pub mod derive;
pub mod filter;
pub mod flatten;
pub mod merge;
pub mod record;
pub mod session;
pub mod status;
pub mod view;

pub use counters::{Counter, Counters, NameCount};
pub use derive::build_cache;
pub use filter::{filter_by_instance, filter_by_route, filter_by_status_code, Selection};
pub use flatten::{flatten, Flattened};
pub use merge::{merge_instances, merge_urls};
pub use record::{RouteRecord, RouteUrlEntry};
pub use session::Session;
pub use status::{classify, ResponseType};
pub use view::{ChartKind, ChartLimits, DashboardView, FilterOptions};
