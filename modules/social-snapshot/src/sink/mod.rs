// Result sinks: where materialized snapshot records end up.

pub mod drive;
pub mod file;
pub mod table;

pub use drive::DriveSink;
pub use file::{EmptyPolicy, FileSink};

use async_trait::async_trait;
use brightdata_client::SnapshotRecord;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Drive error: {0}")]
    Drive(#[from] drive_client::DriveError),
}

/// Destination of one job's output: a folder (per platform and handle) and a file stem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    pub folder: String,
    pub name: String,
}

impl Locator {
    pub fn new(folder: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            folder: folder.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.folder, self.name)
    }
}

/// One artifact a sink produced (a path, a Drive link).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Written {
    pub sink: &'static str,
    pub location: String,
}

#[async_trait]
pub trait RecordSink: Send + Sync {
    fn name(&self) -> &'static str;

    async fn write(
        &self,
        records: &[SnapshotRecord],
        locator: &Locator,
    ) -> Result<Vec<Written>, WriteError>;
}
