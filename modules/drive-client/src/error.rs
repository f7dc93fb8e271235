use thiserror::Error;

pub type Result<T> = std::result::Result<T, DriveError>;

#[derive(Debug, Error)]
pub enum DriveError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Auth error: {0}")]
    Auth(String),
}

impl From<reqwest::Error> for DriveError {
    fn from(err: reqwest::Error) -> Self {
        DriveError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for DriveError {
    fn from(err: serde_json::Error) -> Self {
        DriveError::Parse(err.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for DriveError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        DriveError::Auth(err.to_string())
    }
}
