use thiserror::Error;

/// Transport-level failure talking to the file backend.
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed response: {0}")]
    Decode(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl DirectoryError {
    pub fn from_status(status: reqwest::StatusCode, body: String) -> Self {
        match status.as_u16() {
            404 => DirectoryError::NotFound(body),
            401 | 403 => DirectoryError::Unauthorized(body),
            code => DirectoryError::Status { status: code, body },
        }
    }
}

impl From<reqwest::Error> for DirectoryError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            DirectoryError::NetworkError("Request timeout".to_string())
        } else if error.is_connect() {
            DirectoryError::NetworkError(format!("Connection failed: {}", error))
        } else if error.is_decode() {
            DirectoryError::Decode(error.to_string())
        } else if let Some(status) = error.status() {
            DirectoryError::from_status(status, error.to_string())
        } else if error.is_builder() {
            DirectoryError::InvalidRequest(error.to_string())
        } else {
            DirectoryError::NetworkError(error.to_string())
        }
    }
}
