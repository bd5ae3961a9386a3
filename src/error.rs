//! Error types for the import engine.

/// Top-level error type for the engine.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Normalization error: {0}")]
    Normalize(#[from] NormalizeError),

    #[error("Mailbox error: {0}")]
    Mailbox(#[from] MailboxError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),
}

/// Configuration-related errors, surfaced when the engine is constructed.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid pattern in {family} family: '{pattern}': {source}")]
    InvalidPattern {
        family: String,
        pattern: String,
        source: regex::Error,
    },

    #[error("Confidence threshold {value} outside [0, 1]")]
    InvalidThreshold { value: f32 },
}

/// Message normalization errors.
#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    /// Subject and body are both empty and the sender is absent.
    /// Such messages are counted and skipped, never classified.
    #[error("Message {id} has no usable content")]
    MalformedMessage { id: String },
}

/// Errors from the mail provider collaborator.
///
/// Both variants are transient: the scan keeps its commits and reports an
/// incomplete status, and a re-scan picks up where the ledger left off.
#[derive(Debug, thiserror::Error)]
pub enum MailboxError {
    #[error("Mailbox fetch rate limited")]
    RateLimited,

    #[error("Mailbox unavailable: {0}")]
    Unavailable(String),
}

/// Errors from the persistence collaborator.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store itself is unreachable. Aborts the remaining scan window.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A single operation failed. Counts as one error; the message stays
    /// unmarked in the ledger and is retried on the next scan.
    #[error("Store operation failed: {0}")]
    Query(String),

    /// Two processes raced on the same ledger entry. Treated as
    /// already-processed, a safe no-op.
    #[error("Ledger entry for message {message_id} already written")]
    WriteConflict { message_id: String },
}

/// Scan-level errors.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// Another scan holds this owner's lock. Retryable later.
    #[error("A scan is already in progress for owner {owner}")]
    AlreadyInProgress { owner: String },
}

/// Result type alias for the engine.
pub type Result<T> = std::result::Result<T, Error>;
