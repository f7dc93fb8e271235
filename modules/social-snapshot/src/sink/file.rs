use std::path::{Path, PathBuf};

use async_trait::async_trait;
use brightdata_client::SnapshotRecord;
use tracing::info;

use super::{table, Locator, RecordSink, WriteError, Written};

/// What to do when a job returns zero records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum EmptyPolicy {
    /// Write nothing.
    #[default]
    Skip,
    /// Create empty files so downstream tooling sees the job ran.
    CreateEmpty,
}

/// Writes `{root}/{folder}/{name}.json` (one record per line) and/or `{name}.csv`.
#[derive(Debug, Clone)]
pub struct FileSink {
    root: PathBuf,
    json: bool,
    csv: bool,
    empty: EmptyPolicy,
}

impl FileSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            json: true,
            csv: true,
            empty: EmptyPolicy::Skip,
        }
    }

    pub fn with_formats(mut self, json: bool, csv: bool) -> Self {
        self.json = json;
        self.csv = csv;
        self
    }

    pub fn with_empty_policy(mut self, empty: EmptyPolicy) -> Self {
        self.empty = empty;
        self
    }

    fn path_for(&self, locator: &Locator, extension: &str) -> PathBuf {
        self.root
            .join(&locator.folder)
            .join(format!("{}.{extension}", locator.name))
    }
}

/// Newline-delimited JSON, no enclosing array.
pub fn to_json_lines(records: &[SnapshotRecord]) -> Result<Vec<u8>, WriteError> {
    let mut out = Vec::new();
    for record in records {
        serde_json::to_writer(&mut out, record)?;
        out.push(b'\n');
    }
    Ok(out)
}

async fn write_file(path: &Path, contents: &[u8]) -> Result<(), WriteError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, contents).await?;
    Ok(())
}

#[async_trait]
impl RecordSink for FileSink {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn write(
        &self,
        records: &[SnapshotRecord],
        locator: &Locator,
    ) -> Result<Vec<Written>, WriteError> {
        if records.is_empty() && self.empty == EmptyPolicy::Skip {
            info!(%locator, "No records, skipping file output");
            return Ok(Vec::new());
        }

        let mut written = Vec::new();
        if self.json {
            let path = self.path_for(locator, "json");
            write_file(&path, &to_json_lines(records)?).await?;
            written.push(path);
        }
        if self.csv {
            let path = self.path_for(locator, "csv");
            write_file(&path, &table::to_csv(records)?).await?;
            written.push(path);
        }

        Ok(written
            .into_iter()
            .map(|path| {
                info!(path = %path.display(), count = records.len(), "Data saved");
                Written {
                    sink: "file",
                    location: path.display().to_string(),
                }
            })
            .collect())
    }
}
