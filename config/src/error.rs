//! Error types for loading registry definitions.

use thiserror::Error;

/// Errors that can occur while loading or building a registry definition.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// A default literal does not fit the declared type.
    #[error("invalid default for '{name}': {detail}")]
    InvalidDefault { name: String, detail: String },

    /// A timestamp declaration has no default to derive its type from.
    #[error("'{0}' needs a default value")]
    MissingDefault(String),

    /// The declarations violate a schema rule.
    #[error("schema error: {0}")]
    SchemaError(#[from] optparse_core::SchemaError),
}

/// Convenience alias for results with [`ConfigError`].
pub type Result<T> = std::result::Result<T, ConfigError>;
