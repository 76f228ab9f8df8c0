use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{
    filters::FilterField,
    models::file_type::resolve_file_type,
};

#[derive(Debug, Parser)]
#[command(name = "file-vault", version, about = "Browse a deduplicating file store")]
pub struct Cli {
    /// Backend API URL, overrides FILE_VAULT_API_URL
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List stored files
    List(FilterArgs),
    /// Upload a local file
    Upload {
        path: PathBuf,
        /// MIME type to send, guessed from the extension by default
        #[arg(long)]
        mime_type: Option<String>,
    },
    /// Delete a stored file by id
    Delete { id: String },
    /// Download a stored file by id
    Download {
        id: String,
        /// Directory to save into, overrides FILE_VAULT_DOWNLOAD_DIR
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Show deduplication savings
    Savings,
    /// List the MIME types accepted by --file-type
    FileTypes,
    /// Interactive session
    Browse,
}

#[derive(Debug, Default, Clone, Args)]
pub struct FilterArgs {
    /// Only files uploaded on this day (YYYY-MM-DD)
    #[arg(long)]
    pub upload_date: Option<String>,
    /// Minimum size in KB
    #[arg(long)]
    pub min_size: Option<String>,
    /// Maximum size in KB
    #[arg(long)]
    pub max_size: Option<String>,
    /// MIME type or label such as png, pdf
    #[arg(long)]
    pub file_type: Option<String>,
    /// Substring of the filename
    #[arg(long)]
    pub search: Option<String>,
}

impl FilterArgs {
    /// Draft edits for every flag that was given.
    pub fn edits(&self) -> Vec<(FilterField, String)> {
        let file_type = self
            .file_type
            .as_deref()
            .map(|raw| resolve_file_type(raw).unwrap_or(raw).to_string());

        [
            (FilterField::UploadDate, self.upload_date.clone()),
            (FilterField::MaxSize, self.max_size.clone()),
            (FilterField::MinSize, self.min_size.clone()),
            (FilterField::FileType, file_type),
            (FilterField::Search, self.search.clone()),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.map(|v| (field, v)))
        .collect()
    }
}
