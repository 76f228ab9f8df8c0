pub mod browse_controller;
pub mod file_controller;
