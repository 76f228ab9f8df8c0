//! Client for a deduplicating file-storage REST backend: filter state,
//! query building, the HTTP directory client and the listing/mutation
//! coordination used by the `file-vault` binary.

pub mod adapters;
pub mod application;
pub mod domain;
pub mod services;

pub use adapters::browser::{FileBrowser, MutationKey, MutationOutcome, MutationState};
pub use adapters::view::{ListView, SavingsView};
pub use application::{error::ApplicationError, services::FileDirectory};
pub use domain::{
    config::client::{ClientConfig, ConfigError},
    filters::{FilterField, FilterState},
    models::{
        file::{DownloadRequest, FileRecord, FileUpload},
        savings::StorageSavings,
    },
};
pub use services::{create_file_directory, DirectoryError, HttpFileDirectory};
