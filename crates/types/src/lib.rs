//! Shared types for the API documentation configuration engine
//!
//! This crate contains the error taxonomy and the enumerated options used
//! across the schema, the loader and the command line tool.

pub mod error;
pub mod options;
pub mod utils;

// Re-export commonly used types
pub use error::{ConfigError, Result};
pub use options::{AssetsMode, OperationIdGeneration};
