use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::{
    application::error::ApplicationError,
    domain::{
        filters::FilterState,
        models::{
            file::{DownloadRequest, FileRecord, FileUpload},
            savings::StorageSavings,
        },
    },
};

#[async_trait]
pub trait FileDirectory: Send + Sync {
    async fn list_files(&self, filters: &FilterState) -> Result<Vec<FileRecord>, ApplicationError>;
    async fn upload_file(&self, upload: FileUpload) -> Result<FileRecord, ApplicationError>;
    async fn delete_file(&self, id: &str) -> Result<(), ApplicationError>;
    /// Saves the resource under `request.filename` inside `dest_dir` and
    /// returns the written path.
    async fn download_file(
        &self,
        request: &DownloadRequest,
        dest_dir: &Path,
    ) -> Result<PathBuf, ApplicationError>;
    /// Best effort: never fails, falls back to the zero aggregate.
    async fn get_storage_savings(&self) -> StorageSavings;
}
