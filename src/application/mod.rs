pub mod error;
pub mod filter_model;
pub mod query;
pub mod services;
