pub mod auth;
pub mod config;
pub mod docgen;
pub mod error;
pub mod http;
pub mod model;
pub mod prompt;
pub mod python;
pub mod types;
