//! Error types for Lazy Query.

/// A specialized Result type for Lazy Query operations.
pub type Result<T> = std::result::Result<T, ContainerError>;

/// The error type shared by containers, views, queries and configuration.
///
/// Failures raised by a backing store (`Source`) or by data checks on commit
/// (`Validation`) travel through views and containers unchanged. Containers
/// never wrap, retry or swallow them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContainerError {
    /// The collaborator does not support the requested operation.
    #[error("Unsupported operation: {0}")]
    Unsupported(&'static str),

    /// The backing store failed.
    #[error("Source error: {0}")]
    Source(String),

    /// The buffered data failed validation on commit.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// An index-based access fell outside `[0, size)`.
    #[error("Index {index} out of bounds for container of size {size}")]
    IndexOutOfBounds {
        /// The offending index.
        index: i64,
        /// The size at the time of the access.
        size: usize,
    },

    /// The property id is not part of the definition.
    #[error("Unknown property '{0}'")]
    UnknownProperty(String),

    /// The property is read-only and cannot be written.
    #[error("Property '{0}' is read-only")]
    ReadOnlyProperty(String),

    /// Configuration could not be read or is invalid.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ContainerError {
    /// Create a source error.
    pub fn source(message: impl Into<String>) -> Self {
        Self::Source(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create an out-of-bounds error.
    pub fn out_of_bounds(index: i64, size: usize) -> Self {
        Self::IndexOutOfBounds { index, size }
    }

    /// Returns `true` for failures that originate in the backing store or its
    /// validation, as opposed to caller misuse.
    pub fn is_commit_failure(&self) -> bool {
        matches!(self, Self::Source(_) | Self::Validation(_))
    }
}
