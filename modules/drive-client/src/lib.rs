pub mod auth;
pub mod error;
pub mod types;

pub use auth::{ServiceAccountKey, ServiceAccountTokens, StaticToken, TokenProvider};
pub use error::{DriveError, Result};
pub use types::{DriveFile, Role, UploadCsv, FOLDER_MIME_TYPE, SPREADSHEET_MIME_TYPE};

use std::sync::Arc;
use std::time::Duration;

use types::{FileList, FileMetadata, PermissionRequest};

const API_BASE: &str = "https://www.googleapis.com/drive/v3";
const UPLOAD_BASE: &str = "https://www.googleapis.com/upload/drive/v3";
const FILE_FIELDS: &str = "id,name,mimeType,webViewLink";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

pub struct DriveClient {
    client: reqwest::Client,
    api_base: String,
    upload_base: String,
    tokens: Arc<dyn TokenProvider>,
}

impl DriveClient {
    pub fn new(tokens: Arc<dyn TokenProvider>) -> Self {
        Self {
            client: http_client(DEFAULT_TIMEOUT),
            api_base: API_BASE.to_string(),
            upload_base: UPLOAD_BASE.to_string(),
            tokens,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = http_client(timeout);
        self
    }

    /// Point metadata and upload calls somewhere else (both take a `/drive/v3`-style root).
    pub fn with_endpoints(mut self, api_base: &str, upload_base: &str) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self.upload_base = upload_base.trim_end_matches('/').to_string();
        self
    }

    /// Look up a folder by name, optionally restricted to a parent folder.
    pub async fn find_folder(&self, name: &str, parent_id: Option<&str>) -> Result<Option<String>> {
        let mut query = format!(
            "name = '{}' and mimeType = '{}' and trashed = false",
            escape_query(name),
            FOLDER_MIME_TYPE
        );
        if let Some(parent) = parent_id {
            query.push_str(&format!(" and '{}' in parents", escape_query(parent)));
        }

        let files = self.list(&query).await?;
        Ok(files.into_iter().next().map(|f| f.id))
    }

    pub async fn create_folder(&self, name: &str, parent_id: Option<&str>) -> Result<String> {
        let metadata = FileMetadata {
            name,
            mime_type: Some(FOLDER_MIME_TYPE),
            parents: parent_id.into_iter().collect(),
        };

        let url = format!("{}/files", self.api_base);
        let token = self.tokens.access_token().await?;
        let resp = self
            .client
            .post(&url)
            .bearer_auth(token)
            .query(&[("fields", "id")])
            .json(&metadata)
            .send()
            .await?;

        let folder: DriveFile = read_json(resp).await?;
        tracing::info!(name, folder_id = %folder.id, "Created Drive folder");
        Ok(folder.id)
    }

    pub async fn get_or_create_folder(&self, name: &str, parent_id: Option<&str>) -> Result<String> {
        match self.find_folder(name, parent_id).await? {
            Some(id) => {
                tracing::debug!(name, folder_id = %id, "Found existing Drive folder");
                Ok(id)
            }
            None => self.create_folder(name, parent_id).await,
        }
    }

    /// Look up a non-trashed file by exact name inside a folder.
    pub async fn find_file(&self, name: &str, folder_id: Option<&str>) -> Result<Option<DriveFile>> {
        let mut query = format!("name = '{}' and trashed = false", escape_query(name));
        if let Some(folder) = folder_id {
            query.push_str(&format!(" and '{}' in parents", escape_query(folder)));
        }
        Ok(self.list(&query).await?.into_iter().next())
    }

    /// Upload CSV content as a new file (multipart/related upload).
    pub async fn upload_csv(&self, upload: &UploadCsv) -> Result<DriveFile> {
        let metadata = FileMetadata {
            name: &upload.name,
            mime_type: upload.as_spreadsheet.then_some(SPREADSHEET_MIME_TYPE),
            parents: upload.folder_id.as_deref().into_iter().collect(),
        };
        let boundary = format!("snapshot-{}", uuid::Uuid::new_v4().simple());
        let body = multipart_related(&boundary, &serde_json::to_vec(&metadata)?, "text/csv", &upload.content);

        let url = format!("{}/files", self.upload_base);
        let token = self.tokens.access_token().await?;
        let resp = self
            .client
            .post(&url)
            .bearer_auth(token)
            .query(&[("uploadType", "multipart"), ("fields", FILE_FIELDS)])
            .header(
                reqwest::header::CONTENT_TYPE,
                format!("multipart/related; boundary={boundary}"),
            )
            .body(body)
            .send()
            .await?;

        let file: DriveFile = read_json(resp).await?;
        tracing::info!(name = %upload.name, file_id = %file.id, "Uploaded file to Drive");
        Ok(file)
    }

    /// Grant `email` access to a file.
    pub async fn share_with(&self, file_id: &str, email: &str, role: Role) -> Result<()> {
        let permission = PermissionRequest {
            kind: "user",
            role,
            email_address: email,
        };

        let url = format!("{}/files/{}/permissions", self.api_base, file_id);
        let token = self.tokens.access_token().await?;
        let resp = self
            .client
            .post(&url)
            .bearer_auth(token)
            .query(&[("fields", "id")])
            .json(&permission)
            .send()
            .await?;

        let _: serde_json::Value = read_json(resp).await?;
        tracing::info!(file_id, email, "Shared Drive file");
        Ok(())
    }

    async fn list(&self, query: &str) -> Result<Vec<DriveFile>> {
        let url = format!("{}/files", self.api_base);
        let token = self.tokens.access_token().await?;
        let resp = self
            .client
            .get(&url)
            .bearer_auth(token)
            .query(&[
                ("q", query),
                ("fields", "files(id,name,mimeType,webViewLink)"),
                ("spaces", "drive"),
            ])
            .send()
            .await?;

        let list: FileList = read_json(resp).await?;
        Ok(list.files)
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(resp: reqwest::Response) -> Result<T> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(DriveError::Api {
            status: status.as_u16(),
            message: body,
        });
    }
    let body = resp.text().await?;
    serde_json::from_str(&body).map_err(Into::into)
}

fn http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .expect("Failed to build HTTP client")
}

/// Escape a literal for a Drive `q` expression.
fn escape_query(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

fn multipart_related(boundary: &str, metadata: &[u8], media_type: &str, media: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(metadata.len() + media.len() + 256);
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(b"Content-Type: application/json; charset=UTF-8\r\n\r\n");
    body.extend_from_slice(metadata);
    body.extend_from_slice(format!("\r\n--{boundary}\r\n").as_bytes());
    body.extend_from_slice(format!("Content-Type: {media_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(media);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    body
}
