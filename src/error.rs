//! Error types for tfw-sdk.
//!
//! Two families live here:
//! - [`SdkError`] - transport, configuration and decoding failures
//! - [`HandlerError`] - failures raised by user event handlers

use thiserror::Error;

/// Main error type for all SDK operations.
#[derive(Debug, Error)]
pub enum SdkError {
    /// I/O error during socket operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A message part was not valid UTF-8.
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// Framing violation on the byte stream (oversized part, etc.).
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Inbound message that cannot be routed.
    #[error("Malformed message: {0}")]
    Malformed(String),

    /// Required startup configuration is absent.
    #[error("Missing configuration: {0}")]
    MissingConfig(String),

    /// The handler source could not be loaded.
    #[error("Failed to load event handlers: {0}")]
    HandlerLoad(String),

    /// Configuration value present but unusable.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// No proxy service entry is registered for the port.
    #[error("No proxy service registered for port {0}")]
    NoProxyForPort(u16),

    /// Connection closed unexpectedly.
    #[error("Connection closed")]
    ConnectionClosed,
}

impl SdkError {
    /// Process exit status for a failure that prevents the loop from starting.
    ///
    /// Missing configuration exits with 1, everything else with 2.
    pub fn exit_code(&self) -> u8 {
        match self {
            SdkError::MissingConfig(_) => 1,
            _ => 2,
        }
    }
}

/// Result type alias using SdkError.
pub type Result<T> = std::result::Result<T, SdkError>;

/// Failure reported by (or caught around) a user event handler.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The handler returned an error.
    #[error("{0}")]
    Failed(String),

    /// The handler panicked.
    #[error("panicked: {0}")]
    Panicked(String),

    /// The handler set does not implement this event.
    #[error("{0} is not implemented")]
    NotImplemented(&'static str),
}

impl HandlerError {
    /// Build a failure from anything printable.
    pub fn msg(message: impl std::fmt::Display) -> Self {
        HandlerError::Failed(message.to_string())
    }
}

impl From<SdkError> for HandlerError {
    fn from(err: SdkError) -> Self {
        HandlerError::Failed(err.to_string())
    }
}

impl From<std::io::Error> for HandlerError {
    fn from(err: std::io::Error) -> Self {
        HandlerError::Failed(err.to_string())
    }
}

impl From<serde_json::Error> for HandlerError {
    fn from(err: serde_json::Error) -> Self {
        HandlerError::Failed(err.to_string())
    }
}

/// Result type returned by event handlers.
pub type HandlerResult<T = ()> = std::result::Result<T, HandlerError>;
