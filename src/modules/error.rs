use std::path::PathBuf;

use thiserror::Error;

/// Result type alias used throughout the crate
pub type Result<T> = std::result::Result<T, WatchError>;

/// Everything that can go wrong while resolving credentials or watching a folder.
///
/// Only `CredentialUnavailable` and `Subscription` stop a run; the remaining
/// variants are logged and the caller carries on.
#[derive(Error, Debug)]
pub enum WatchError {
    /// The platform credential store could not be opened.
    #[error("secret store unavailable: {0}")]
    StoreUnavailable(String),

    /// Querying the store for an identifier failed.
    #[error("secret store lookup failed for '{identifier}': {reason}")]
    Lookup { identifier: String, reason: String },

    /// The user entered nothing when asked for a credential.
    #[error("no credential entered for '{0}'")]
    InputAbandoned(String),

    /// Writing a freshly entered credential back to the store failed.
    #[error("failed to persist credential '{identifier}': {reason}")]
    Persistence { identifier: String, reason: String },

    /// Neither the store nor the user supplied a credential.
    #[error("no credential available for '{0}'")]
    CredentialUnavailable(String),

    /// Registering for creation events failed.
    #[error("failed to watch {path}: {reason}")]
    Subscription { path: PathBuf, reason: String },

    /// Releasing the creation-event registration failed.
    #[error("failed to stop watching {path}: {reason}")]
    Unsubscribe { path: PathBuf, reason: String },

    /// A single notification could not be sent.
    #[error("failed to deliver notification for {path}: {reason}")]
    Delivery { path: PathBuf, reason: String },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl WatchError {
    /// Whether this error ends the current run.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            WatchError::CredentialUnavailable(_)
                | WatchError::Subscription { .. }
                | WatchError::Config(_)
        )
    }
}
