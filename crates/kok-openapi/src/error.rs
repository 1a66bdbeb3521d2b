//! Error types for documentation generation.

use thiserror::Error;

/// Errors that can occur while deriving responses or building documents.
#[derive(Debug, Error)]
pub enum OpenApiError {
    /// The operation's codec failed to encode an example.
    #[error("codec failed for operation '{operation}': {source}")]
    Codec {
        operation: String,
        #[source]
        source: kok_core::Error,
    },

    /// A status code outside 100..=599, the range `success` accepts.
    #[error("invalid status code {status} for operation '{operation}'")]
    InvalidStatus { operation: String, status: u16 },

    /// Schema conflict: same name, different definitions.
    #[error("Schema conflict for '{name}': defined differently in multiple specs")]
    SchemaConflict { name: String },

    /// Invalid OpenAPI document structure.
    #[error("Invalid OpenAPI spec: {message}")]
    InvalidSpec { message: String },

    #[error("invalid doc config: {0}")]
    Config(#[from] toml::de::Error),

    #[error("failed to read doc config: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
