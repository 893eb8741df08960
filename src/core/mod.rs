pub mod attributes;
pub mod config;
pub mod error;
