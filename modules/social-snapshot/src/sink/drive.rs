use async_trait::async_trait;
use brightdata_client::SnapshotRecord;
use chrono::{DateTime, Utc};
use drive_client::{DriveClient, Role, UploadCsv};
use tracing::info;

use super::{table, Locator, RecordSink, WriteError, Written};

/// Uploads the CSV projection into a per-job Drive folder.
pub struct DriveSink {
    client: DriveClient,
    parent_folder_id: Option<String>,
    share_with: Option<String>,
    as_spreadsheet: bool,
}

impl DriveSink {
    pub fn new(client: DriveClient) -> Self {
        Self {
            client,
            parent_folder_id: None,
            share_with: None,
            as_spreadsheet: false,
        }
    }

    pub fn with_parent_folder(mut self, folder_id: Option<String>) -> Self {
        self.parent_folder_id = folder_id;
        self
    }

    pub fn with_share_with(mut self, email: Option<String>) -> Self {
        self.share_with = email;
        self
    }

    pub fn as_spreadsheet(mut self, enabled: bool) -> Self {
        self.as_spreadsheet = enabled;
        self
    }

    fn file_name(&self, stem: &str) -> String {
        if self.as_spreadsheet {
            stem.to_string()
        } else {
            format!("{stem}.csv")
        }
    }
}

/// Name for a new upload when `stem` is already taken in the folder.
pub fn unique_stem(stem: &str, now: DateTime<Utc>) -> String {
    format!("{stem}_{}", now.format("%Y%m%d_%H%M%S"))
}

#[async_trait]
impl RecordSink for DriveSink {
    fn name(&self) -> &'static str {
        "drive"
    }

    async fn write(
        &self,
        records: &[SnapshotRecord],
        locator: &Locator,
    ) -> Result<Vec<Written>, WriteError> {
        if records.is_empty() {
            info!(%locator, "No records, skipping Drive upload");
            return Ok(Vec::new());
        }

        let content = table::to_csv(records)?;
        let folder_id = self
            .client
            .get_or_create_folder(&locator.folder, self.parent_folder_id.as_deref())
            .await?;

        let mut name = self.file_name(&locator.name);
        if self.client.find_file(&name, Some(&folder_id)).await?.is_some() {
            name = self.file_name(&unique_stem(&locator.name, Utc::now()));
            info!(%locator, name = %name, "Destination exists, uploading under a new name");
        }

        let file = self
            .client
            .upload_csv(&UploadCsv {
                name,
                folder_id: Some(folder_id),
                content,
                as_spreadsheet: self.as_spreadsheet,
            })
            .await?;

        if let Some(email) = &self.share_with {
            self.client.share_with(&file.id, email, Role::Writer).await?;
        }

        info!(folder = %locator.folder, file_id = %file.id, "File uploaded to Google Drive");
        Ok(vec![Written {
            sink: "drive",
            location: file
                .web_view_link
                .unwrap_or_else(|| format!("drive:{}", file.id)),
        }])
    }
}
