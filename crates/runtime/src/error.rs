//! Error types for the async execution runtime.

use std::time::Duration;

use relay_protocol::{ScriptFailure, WireErrorKind};
use thiserror::Error;

/// Result type alias for runtime operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while executing scripts out-of-band.
#[derive(Debug, Error)]
pub enum Error {
    /// Mobile command outside the supported allow-list.
    #[error("unknown mobile command: {0}")]
    UnknownCommand(String),

    /// Remote script failure, mapped from either wire convention.
    #[error("{kind}: {message}")]
    RemoteScript {
        kind: WireErrorKind,
        message: String,
        stacktrace: Option<String>,
    },

    /// Certificate trust install/uninstall failure. Surfaced, never
    /// swallowed: a non-trusted certificate makes the callback path
    /// unusable.
    #[error("certificate trust operation failed: {0}")]
    TrustInstall(String),

    /// No async response arrived within the wait budget plus grace.
    #[error("timed out after {0:?} waiting for async script response")]
    Timeout(Duration),

    /// A newer executeAsync call replaced this pending script.
    #[error("async script superseded by a newer executeAsync call")]
    Superseded,

    /// The callback server was stopped while a response was pending.
    #[error("callback server closed while an async response was pending")]
    ServerClosed,

    /// Callback server stop failure covering one or both sub-steps.
    #[error("callback server stop failed: {0}")]
    ServerStop(String),

    /// Script submission or native command transport failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// The resolved callback URL could not be composed.
    #[error("invalid callback url: {0}")]
    InvalidCallbackUrl(String),

    /// Settlement channel closed without a value.
    #[error("async response channel closed unexpectedly")]
    ChannelClosed,

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the taxonomy kind if this is a mapped remote script failure.
    pub fn remote_kind(&self) -> Option<WireErrorKind> {
        match self {
            Error::RemoteScript { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Returns true if this is a timeout error, local or remote.
    pub fn is_timeout(&self) -> bool {
        match self {
            Error::Timeout(_) => true,
            Error::RemoteScript { kind, .. } => {
                matches!(kind, WireErrorKind::Timeout | WireErrorKind::ScriptTimeout)
            }
            _ => false,
        }
    }
}

impl From<ScriptFailure> for Error {
    fn from(failure: ScriptFailure) -> Self {
        Error::RemoteScript {
            kind: failure.kind,
            message: failure.message,
            stacktrace: failure.stacktrace,
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::InvalidCallbackUrl(err.to_string())
    }
}
