//! Error types for the API documentation configuration engine

use thiserror::Error;

/// Configuration errors surfaced to the caller.
///
/// Rule violations carry the dotted path of the offending node (rooted at
/// `nelmio_api_doc`) and the rule's message. The message is meant to be shown
/// to the user verbatim.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A value does not have the shape its node declares
    #[error("Invalid type for path \"{path}\": {message}")]
    TypeMismatch { path: String, message: String },

    /// A value outside the fixed set of allowed values
    #[error("Invalid configuration for path \"{path}\": {message}")]
    EnumViolation { path: String, message: String },

    /// A constraint between sibling values is broken
    #[error("Invalid configuration for path \"{path}\": {message}")]
    CrossFieldViolation { path: String, message: String },

    /// A structurally required key is absent
    #[error("Invalid configuration for path \"{path}\": {message}")]
    MissingRequiredKey { path: String, message: String },

    /// A key that no node of the schema recognizes
    #[error("Unrecognized option \"{key}\" under \"{path}\". Available options are {available}.")]
    UnrecognizedOption {
        path: String,
        key: String,
        available: String,
    },

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    /// The source could not be decoded into a tree
    #[error("Configuration parse error: {0}")]
    ParseError(String),
}

impl ConfigError {
    /// Path of the node the error was raised for, if any
    pub fn path(&self) -> Option<&str> {
        match self {
            ConfigError::TypeMismatch { path, .. }
            | ConfigError::EnumViolation { path, .. }
            | ConfigError::CrossFieldViolation { path, .. }
            | ConfigError::MissingRequiredKey { path, .. }
            | ConfigError::UnrecognizedOption { path, .. }
            | ConfigError::FileNotFound { path } => Some(path),
            ConfigError::ParseError(_) => None,
        }
    }

    /// The bare rule message, without the path prefix
    pub fn message(&self) -> String {
        match self {
            ConfigError::TypeMismatch { message, .. }
            | ConfigError::EnumViolation { message, .. }
            | ConfigError::CrossFieldViolation { message, .. }
            | ConfigError::MissingRequiredKey { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// Whether this error was produced by a schema rule rather than by the source
    pub fn is_validation(&self) -> bool {
        !matches!(
            self,
            ConfigError::FileNotFound { .. } | ConfigError::ParseError(_)
        )
    }
}

/// Result type alias for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;
