//! Error types for namespace composition

use thiserror::Error;

/// Errors raised while composing namespaces or deriving accessors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NamespaceError {
    #[error("Namespace not found: {key}")]
    NamespaceNotFound { key: String },

    #[error("Duplicate namespace key among siblings: {key}")]
    DuplicateNamespace { key: String },

    #[error("Composite key '{key}' claimed by both {first} and {second}")]
    KeyCollision {
        key: String,
        first: String,
        second: String,
    },

    #[error("Invalid addressing for namespace '{key}': {reason}")]
    InvalidAddressing { key: String, reason: String },

    #[error("Interface is already composed")]
    AlreadyComposed,

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for NamespaceError {
    fn from(e: serde_json::Error) -> Self {
        NamespaceError::Serialization(e.to_string())
    }
}
