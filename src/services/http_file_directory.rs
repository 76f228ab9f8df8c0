use std::{
    io::{self, Write},
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use reqwest::{multipart, Client, Response};
use tempfile::NamedTempFile;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::{
    application::{error::ApplicationError, query, services::FileDirectory},
    domain::{
        config::client::ClientConfig,
        filters::FilterState,
        models::{
            file::{DownloadRequest, FileRecord, FileUpload},
            savings::StorageSavings,
        },
    },
    services::error::DirectoryError,
};

const FILES_PATH: &str = "files/";
const SAVINGS_PATH: &str = "storage-savings/total_savings/";
const MAX_NAME_ATTEMPTS: u32 = 1000;

pub struct HttpFileDirectory {
    client: Client,
    api_url: String,
}

impl HttpFileDirectory {
    pub fn new(config: &ClientConfig) -> Result<Self, DirectoryError> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self::with_client(client, &config.api_url))
    }

    pub fn with_client(client: Client, api_url: &str) -> Self {
        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path)
    }

    async fn fetch_files(&self, url: &str) -> Result<Vec<FileRecord>, DirectoryError> {
        let response = self.client.get(url).send().await?;
        let response = ensure_success(response).await?;
        Ok(response.json::<Vec<FileRecord>>().await?)
    }

    async fn post_upload(&self, upload: FileUpload) -> Result<FileRecord, DirectoryError> {
        let file_part = multipart::Part::bytes(upload.content)
            .file_name(upload.filename)
            .mime_str(&upload.mime_type)
            .map_err(|e| DirectoryError::InvalidRequest(e.to_string()))?;
        let form = multipart::Form::new().part("file", file_part);

        let response = self
            .client
            .post(self.endpoint(FILES_PATH))
            .multipart(form)
            .send()
            .await?;
        let response = ensure_success(response).await?;
        Ok(response.json::<FileRecord>().await?)
    }

    /// `{api}/files/{id}/` with the id as one escaped path segment.
    fn file_url(&self, id: &str) -> Result<Url, DirectoryError> {
        // `.` and `..` are dropped by `push`, so they can't be sent as-is.
        if id.is_empty() || id == "." || id == ".." {
            return Err(DirectoryError::InvalidRequest(format!("Invalid file id: {}", id)));
        }
        let mut url = Url::parse(&self.endpoint(FILES_PATH))
            .map_err(|e| DirectoryError::InvalidRequest(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| DirectoryError::InvalidRequest("API URL cannot have a path".to_string()))?
            .pop_if_empty()
            .push(id)
            .push("");
        Ok(url)
    }

    async fn send_delete(&self, id: &str) -> Result<(), DirectoryError> {
        let url = self.file_url(id)?;
        let response = self.client.delete(url).send().await?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn fetch_and_save(
        &self,
        request: &DownloadRequest,
        dest_dir: &Path,
    ) -> Result<PathBuf, DirectoryError> {
        let filename = local_filename(&request.filename)?;

        let response = self.client.get(&request.file_url).send().await?;
        let response = ensure_success(response).await?;
        let bytes = response.bytes().await?;

        tokio::fs::create_dir_all(dest_dir).await?;
        let dest_dir = dest_dir.to_path_buf();

        // The temp file is removed on drop unless persisted.
        tokio::task::spawn_blocking(move || -> Result<PathBuf, DirectoryError> {
            let mut staged = NamedTempFile::new_in(&dest_dir)?;
            staged.write_all(&bytes)?;
            staged.flush()?;
            persist_unique(staged, &dest_dir, &filename)
        })
        .await
        .map_err(|e| DirectoryError::Io(io::Error::other(e)))?
    }

    async fn fetch_savings(&self) -> Result<StorageSavings, DirectoryError> {
        let response = self.client.get(self.endpoint(SAVINGS_PATH)).send().await?;
        let response = ensure_success(response).await?;
        Ok(response.json::<StorageSavings>().await?)
    }
}

async fn ensure_success(response: Response) -> Result<Response, DirectoryError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(DirectoryError::from_status(status, body))
}

/// Final path component of the user-supplied name. Anything the server says
/// about the filename is ignored.
fn local_filename(requested: &str) -> Result<String, DirectoryError> {
    Path::new(requested)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| DirectoryError::InvalidRequest(format!("Invalid filename: {}", requested)))
}

/// Moves the staged download to `filename` in `dest_dir`, or to the first
/// free `name (n).ext` when that is taken. Existing files are never replaced.
fn persist_unique(
    mut staged: NamedTempFile,
    dest_dir: &Path,
    filename: &str,
) -> Result<PathBuf, DirectoryError> {
    for attempt in 0..MAX_NAME_ATTEMPTS {
        let target = dest_dir.join(numbered_name(filename, attempt));
        match staged.persist_noclobber(&target) {
            Ok(_) => {
                if attempt > 0 {
                    info!("{} already exists, saved as {}", filename, target.display());
                }
                return Ok(target);
            }
            Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => staged = e.file,
            Err(e) => return Err(DirectoryError::Io(e.error)),
        }
    }
    Err(DirectoryError::Io(io::Error::new(
        io::ErrorKind::AlreadyExists,
        format!("No free name for {} in {}", filename, dest_dir.display()),
    )))
}

fn numbered_name(filename: &str, n: u32) -> String {
    if n == 0 {
        return filename.to_string();
    }
    let path = Path::new(filename);
    match (path.file_stem(), path.extension()) {
        (Some(stem), Some(ext)) => format!(
            "{} ({}).{}",
            stem.to_string_lossy(),
            n,
            ext.to_string_lossy()
        ),
        _ => format!("{} ({})", filename, n),
    }
}

#[async_trait]
impl FileDirectory for HttpFileDirectory {
    async fn list_files(&self, filters: &FilterState) -> Result<Vec<FileRecord>, ApplicationError> {
        let url = query::list_url(&self.api_url, filters)?;
        debug!("Listing files: {}", url);

        self.fetch_files(&url).await.map_err(|e| {
            error!("Error fetching files: {}", e);
            ApplicationError::ListFailed(e)
        })
    }

    async fn upload_file(&self, upload: FileUpload) -> Result<FileRecord, ApplicationError> {
        info!(
            "Uploading {} ({} bytes, {})",
            upload.filename,
            upload.size(),
            upload.mime_type
        );

        let record = self.post_upload(upload).await.map_err(|e| {
            error!("Upload error: {}", e);
            ApplicationError::UploadFailed(e)
        })?;

        info!("Uploaded file stored as {}", record.id);
        Ok(record)
    }

    async fn delete_file(&self, id: &str) -> Result<(), ApplicationError> {
        self.send_delete(id).await.map_err(|e| {
            error!("Delete error for {}: {}", id, e);
            ApplicationError::DeleteFailed(e)
        })?;

        info!("Deleted file {}", id);
        Ok(())
    }

    async fn download_file(
        &self,
        request: &DownloadRequest,
        dest_dir: &Path,
    ) -> Result<PathBuf, ApplicationError> {
        let path = self.fetch_and_save(request, dest_dir).await.map_err(|e| {
            error!("Download error for {}: {}", request.file_url, e);
            ApplicationError::DownloadFailed(e)
        })?;

        info!("Saved {} to {}", request.file_url, path.display());
        Ok(path)
    }

    async fn get_storage_savings(&self) -> StorageSavings {
        match self.fetch_savings().await {
            Ok(savings) => savings,
            Err(e) => {
                warn!("Error fetching storage savings: {}", e);
                StorageSavings::default()
            }
        }
    }
}
