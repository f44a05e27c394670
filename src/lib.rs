//! # routewatch
//!
//! Aggregates per-instance request-log snapshots into chart-ready route,
//! instance and status metrics.
//!
//! Snapshots arrive either as one bulk batch (a JSON file of arrivals) or as
//! an unbounded stream of per-instance events (a TCP connection carrying
//! newline-delimited JSON or Server-Sent Events). Either way they are
//! flattened into per-instance route records, counted, and on demand turned
//! into a [`DashboardView`]: filtered, merged across instances and annotated
//! with response-type counts and average response times.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Application                          │
//! │  ┌─────────┐    ┌──────────┐    ┌───────────────┐           │
//! │  │  app    │───▶│ session  │───▶│ DashboardView │──▶ JSON   │
//! │  │ (state) │    │ (data)   │    │ (filter/merge │           │
//! │  └────┬────┘    └──────────┘    │  /derive)     │           │
//! │       │                         └───────────────┘           │
//! │       ▼                                                     │
//! │  ┌─────────┐                                                │
//! │  │ source  │◀── FileSource | StreamSource | ChannelSource   │
//! │  │ (input) │                                                │
//! │  └─────────┘                                                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`app`]**: The active source, the session and the filter selection
//! - **[`source`]**: Data source abstraction ([`DataSource`] trait) with
//!   implementations for bulk files, async byte streams and channels
//! - **[`data`]**: Records, counters and the filter, merge and derive pipeline
//! - **[`events`]**: Decoding of SSE / NDJSON event streams
//! - **[`config`]**: Layered [`Settings`]
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Summarize a bulk statistics file
//! routewatch --file lastDayStatistics.json --instance web-1
//!
//! # Follow a live event stream
//! routewatch --connect localhost:9090 --chart area
//! ```
//!
//! ### As a library with file source
//!
//! ```
//! use routewatch::{App, ChartLimits, FileSource};
//!
//! let source = Box::new(FileSource::new("lastDayStatistics.json"));
//! let mut app = App::new(source, ChartLimits::default());
//! app.reload_data();
//! let view = app.view();
//! ```
//!
//! ### As a library with stream source (TCP, etc.)
//!
//! ```no_run
//! use std::io::Cursor;
//! use routewatch::{App, ChartLimits, StreamSource};
//!
//! # tokio_test::block_on(async {
//! // In practice, use a TcpStream
//! let data = b"{\"instance\":\"web-1\",\"routers\":[],\"cloudApi\":[]}\n";
//! let stream = Cursor::new(data.to_vec());
//! let source = StreamSource::spawn(stream, "example");
//! let app = App::new(Box::new(source), ChartLimits::default());
//! # });
//! ```
//!
//! ### As a library with channel source
//!
//! ```
//! use routewatch::{App, ChannelSource, ChartLimits, Delivery, IngestMode, InstanceBucket};
//!
//! let (tx, source) = ChannelSource::create(IngestMode::Realtime, "in-process");
//! let mut app = App::new(Box::new(source), ChartLimits::default());
//!
//! tx.try_send(Delivery::Event(InstanceBucket::new("web-1"))).unwrap();
//! app.reload_data();
//! ```

pub mod app;
pub mod config;
pub mod data;
pub mod error;
pub mod events;
pub mod logging;
pub mod source;

// Re-export main types for convenience
pub use app::App;
pub use config::Settings;
pub use data::{
    ChartKind, ChartLimits, Counters, DashboardView, NameCount, ResponseType, RouteRecord,
    RouteUrlEntry, Selection, Session,
};
pub use error::SourceError;
pub use source::{
    Arrival, ChannelSource, DataSource, Delivery, FileSource, IngestMode, InstanceBucket,
    StreamSource,
};
