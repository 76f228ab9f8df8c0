use std::{fmt::Write, path::Path};

use tracing::{info, warn};

use crate::{
    adapters::{
        browser::{FileBrowser, MutationOutcome},
        cli::FilterArgs,
    },
    application::error::ApplicationError,
    domain::models::{
        file::FileUpload,
        file_type::{ALL_TYPES, FILE_TYPE_OPTIONS},
    },
};

pub struct FileController;

impl FileController {
    pub async fn list(browser: &FileBrowser, args: &FilterArgs) -> Result<String, ApplicationError> {
        for (field, value) in args.edits() {
            browser.set_filter(field, value);
        }
        browser.apply_filters().await?;
        Ok(browser.list_view().to_string())
    }

    pub async fn upload(
        browser: &FileBrowser,
        path: &Path,
        mime_type: Option<String>,
    ) -> Result<String, ApplicationError> {
        let upload = FileUpload::from_path(path, mime_type).await.map_err(|e| {
            warn!("Cannot read {}: {}", path.display(), e);
            ApplicationError::UploadFailed(e.into())
        })?;

        let outcome = browser.upload(upload).await;
        let summary = match &outcome.result {
            Ok(record) => format!(
                "Uploaded {} as {} ({}, {} bytes)\n",
                record.original_filename, record.id, record.file_type, record.size
            ),
            Err(_) => String::new(),
        };
        Self::report(browser, outcome, summary)
    }

    pub async fn delete(browser: &FileBrowser, id: &str) -> Result<String, ApplicationError> {
        let outcome = browser.delete(id).await;
        Self::report(browser, outcome, format!("Deleted {}\n", id))
    }

    /// Resolves `id` against the loaded listing.
    pub async fn download(browser: &FileBrowser, id: &str) -> Result<String, ApplicationError> {
        let path = browser.download_by_id(id).await?;
        info!("Download of {} complete", id);
        Ok(format!("Saved {}\n", path.display()))
    }

    pub async fn savings(browser: &FileBrowser) -> String {
        browser.savings().await;
        browser.savings_view().to_string()
    }

    pub fn file_types() -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{:<6}{}", "-", ALL_TYPES.label);
        for option in FILE_TYPE_OPTIONS {
            let _ = writeln!(out, "{:<6}{}", option.label, option.value);
        }
        out
    }

    /// Mutation result followed by the refetched listing. A refetch failure
    /// is shown in the listing but does not turn the mutation into an error.
    fn report<T>(
        browser: &FileBrowser,
        outcome: MutationOutcome<T>,
        summary: String,
    ) -> Result<String, ApplicationError> {
        outcome.result?;
        let mut out = summary;
        out.push_str(&browser.list_view().to_string());
        Ok(out)
    }
}
