//! Error types for data sources.

use thiserror::Error;

/// Errors a [`DataSource`](crate::DataSource) can report.
///
/// None of these stop the pipeline: sources record the latest one and keep
/// going (or stay closed), and already-ingested state is never touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// Reading from the file or stream failed.
    #[error("Read error: {0}")]
    Read(String),

    /// A payload was not valid snapshot JSON.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Could not connect to the stream endpoint.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// The stream reported an error event.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The stream has ended.
    #[error("Stream closed")]
    Closed,
}

impl SourceError {
    /// True for errors after which the source will never deliver again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SourceError::Closed)
    }
}
