pub mod browser;
pub mod cli;
pub mod controllers;
pub mod listing_cache;
pub mod view;
