//! File-based data source.
//!
//! Loads a bulk batch of arrivals from a JSON file.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::{Arrival, DataSource, Delivery, IngestMode};
use crate::error::SourceError;

/// A data source that reads a JSON array of arrivals from a file.
///
/// The batch is delivered exactly once. Reprocessing it would double every
/// counter, so later polls return nothing even if the file changes. A failed
/// read or parse is recorded and retried on the next poll.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    description: String,
    last_error: Option<SourceError>,
    loaded: bool,
}

impl FileSource {
    /// Create a new file source for the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let description = format!("file: {}", path.display());
        Self {
            path,
            description,
            last_error: None,
            loaded: false,
        }
    }

    /// Returns the path being loaded.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the file.
    fn read_file(&self) -> Result<Vec<Arrival>, SourceError> {
        let content = fs::read_to_string(&self.path).map_err(|e| SourceError::Read(e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| SourceError::Parse(e.to_string()))
    }
}

impl DataSource for FileSource {
    fn poll(&mut self) -> Option<Delivery> {
        if self.loaded {
            return None;
        }

        match self.read_file() {
            Ok(arrivals) => {
                info!(path = %self.path.display(), arrivals = arrivals.len(), "Loaded bulk snapshot file");
                self.last_error = None;
                self.loaded = true;
                Some(Delivery::Batch(arrivals))
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to load bulk snapshot file");
                self.last_error = Some(e);
                None
            }
        }
    }

    fn mode(&self) -> IngestMode {
        IngestMode::Bulk
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<SourceError> {
        self.last_error.clone()
    }

    fn is_exhausted(&self) -> bool {
        self.loaded
    }
}
