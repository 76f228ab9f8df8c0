mod file_directory;

pub use file_directory::FileDirectory;
