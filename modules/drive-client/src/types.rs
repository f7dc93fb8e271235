use serde::{Deserialize, Serialize};

pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";
pub const SPREADSHEET_MIME_TYPE: &str = "application/vnd.google-apps.spreadsheet";

/// File metadata as returned by `files.create` / `files.list`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct DriveFile {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "mimeType", default)]
    pub mime_type: Option<String>,
    #[serde(rename = "webViewLink", default)]
    pub web_view_link: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct FileList {
    #[serde(default)]
    pub files: Vec<DriveFile>,
}

/// Metadata part of a `files.create` request.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct FileMetadata<'a> {
    pub name: &'a str,
    #[serde(rename = "mimeType", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<&'a str>,
}

/// A CSV document to upload into a folder.
#[derive(Debug, Clone)]
pub struct UploadCsv {
    pub name: String,
    pub folder_id: Option<String>,
    pub content: Vec<u8>,
    /// Convert to a Google Sheet on upload.
    pub as_spreadsheet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Reader,
    Commenter,
    Writer,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct PermissionRequest<'a> {
    #[serde(rename = "type")]
    pub kind: &'a str,
    pub role: Role,
    #[serde(rename = "emailAddress")]
    pub email_address: &'a str,
}
