//! Error types shared across the sync stack.

use thiserror::Error;

/// Result type alias for store and repository operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Failure class driving the offline-first fallback policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Absorbed by the repository: fall back to the local cache or the outbox.
    Soft,
    /// Surfaced to the caller; the operation aborts.
    Hard,
}

/// Errors that can occur during local or remote store operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The record is absent from the local cache; nothing to update or delete.
    #[error("record '{0}' not found locally")]
    NotFoundLocally(String),

    /// The remote store could not be reached or answered with a service error.
    #[error("remote store unavailable: {0}")]
    RemoteUnavailable(String),

    /// A bounded remote call did not complete in time.
    #[error("remote call timed out")]
    Timeout,

    /// The remote store has no document under the addressed id.
    #[error("remote document '{0}' not found")]
    RemoteNotFound(String),

    /// JSON serialization/deserialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The local slot store failed to read or write.
    #[error("local storage error: {0}")]
    Storage(String),
}

impl Error {
    /// Create a local-miss error for the given record id.
    pub fn not_found_locally(id: impl Into<String>) -> Self {
        Self::NotFoundLocally(id.into())
    }

    /// Create a remote-unavailable error
    pub fn remote_unavailable(message: impl Into<String>) -> Self {
        Self::RemoteUnavailable(message.into())
    }

    /// Create a remote-miss error for the given document id.
    pub fn remote_not_found(id: impl Into<String>) -> Self {
        Self::RemoteNotFound(id.into())
    }

    /// Create a local storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// Classify for the fallback policy.
    pub fn severity(&self) -> Severity {
        match self {
            Self::RemoteUnavailable(_)
            | Self::Timeout
            | Self::RemoteNotFound(_)
            | Self::Serialization(_) => Severity::Soft,
            Self::NotFoundLocally(_) | Self::Storage(_) => Severity::Hard,
        }
    }

    /// Soft failures trigger the offline path instead of surfacing.
    pub fn is_soft(&self) -> bool {
        self.severity() == Severity::Soft
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_failures_are_soft() {
        assert!(Error::remote_unavailable("connection refused").is_soft());
        assert!(Error::Timeout.is_soft());
        assert!(Error::remote_not_found("doc-1").is_soft());
    }

    #[test]
    fn local_misses_and_storage_failures_are_hard() {
        assert_eq!(
            Error::not_found_locally("rec-1").severity(),
            Severity::Hard
        );
        assert_eq!(Error::storage("disk full").severity(), Severity::Hard);
    }
}
