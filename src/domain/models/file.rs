use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored file as reported by the server. The client never computes any
/// of these values itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: String,
    pub original_filename: String,
    pub file_type: String,
    pub size: u64,
    pub uploaded_at: DateTime<Utc>,
    pub file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
}

impl FileRecord {
    pub fn download_request(&self) -> DownloadRequest {
        DownloadRequest {
            file_url: self.file.clone(),
            filename: self.original_filename.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FileUpload {
    pub content: Vec<u8>,
    pub filename: String,
    pub mime_type: String,
}

impl FileUpload {
    pub fn new(content: Vec<u8>, filename: String, mime_type: String) -> Self {
        Self {
            content,
            filename,
            mime_type,
        }
    }

    /// Reads `path` and guesses the MIME type from its extension unless one
    /// is given.
    pub async fn from_path(path: &Path, mime_type: Option<String>) -> std::io::Result<Self> {
        let content = tokio::fs::read(path).await?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let mime_type = mime_type.unwrap_or_else(|| {
            mime_guess::from_path(path)
                .first_or_octet_stream()
                .essence_str()
                .to_string()
        });

        Ok(Self::new(content, filename, mime_type))
    }

    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub file_url: String,
    pub filename: String,
}
