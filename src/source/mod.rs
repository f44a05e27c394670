//! Data source abstraction for receiving request-log snapshots.
//!
//! This module provides a trait-based abstraction for receiving snapshot
//! data in either ingestion mode: a one-shot bulk batch (files) or an
//! unbounded real-time stream (network streams, in-process channels).

mod channel;
mod file;
mod snapshot;
mod stream;

pub use channel::ChannelSource;
pub use file::FileSource;
pub use snapshot::{Arrival, Delivery, IngestMode, InstanceBucket};
pub use stream::StreamSource;

use std::fmt::Debug;

use crate::error::SourceError;

/// Trait for receiving snapshot data from various sources.
///
/// # Example
///
/// ```
/// use routewatch::{DataSource, FileSource};
///
/// let mut source = FileSource::new("lastDayStatistics.json");
/// if let Some(delivery) = source.poll() {
///     println!("Got {:?}", delivery);
/// }
/// ```
pub trait DataSource: Send + Debug {
    /// Poll for the next delivery.
    ///
    /// Returns `Some(delivery)` if data is available, `None` otherwise.
    /// This method should be non-blocking.
    fn poll(&mut self) -> Option<Delivery>;

    /// Which ingestion mode this source feeds.
    fn mode(&self) -> IngestMode;

    /// Returns a human-readable description of the source.
    fn description(&self) -> &str;

    /// The most recent error, if the last read or event failed.
    fn error(&self) -> Option<SourceError>;

    /// True once the source will never deliver again.
    fn is_exhausted(&self) -> bool;
}
