use thiserror::Error;

use crate::{
    domain::{config::client::ConfigError, filters::FilterField},
    services::DirectoryError,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("{field} must be a non-negative number of KB, got '{value}'")]
    InvalidSize { field: FilterField, value: String },
}

/// Failures surfaced to the user. The transport cause is kept as the source
/// for logging; `Display` stays generic.
#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error("Failed to fetch files")]
    ListFailed(#[source] DirectoryError),

    #[error("Failed to upload file")]
    UploadFailed(#[source] DirectoryError),

    #[error("Failed to delete file")]
    DeleteFailed(#[source] DirectoryError),

    #[error("Failed to download file")]
    DownloadFailed(#[source] DirectoryError),

    #[error("Invalid filter: {0}")]
    InvalidFilter(#[from] FilterError),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl ApplicationError {
    pub fn cause(&self) -> Option<&DirectoryError> {
        match self {
            ApplicationError::ListFailed(e)
            | ApplicationError::UploadFailed(e)
            | ApplicationError::DeleteFailed(e)
            | ApplicationError::DownloadFailed(e) => Some(e),
            _ => None,
        }
    }
}
