mod error;
mod http_file_directory;

pub use error::DirectoryError;
pub use http_file_directory::HttpFileDirectory;

use std::sync::Arc;

use crate::{application::services::FileDirectory, domain::config::client::ClientConfig};

pub fn create_file_directory(config: &ClientConfig) -> Result<Arc<dyn FileDirectory>, DirectoryError> {
    let directory = HttpFileDirectory::new(config)?;
    Ok(Arc::new(directory))
}
