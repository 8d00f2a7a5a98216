//! Error types for pollcache.
//!
//! A single error type with explicit variants for page fetch failures and
//! input validation errors. Errors are local to one collection; nothing here
//! is fatal to the host.

use std::fmt;
use thiserror::Error;

/// The unified error type for pollcache operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A page fetch failed (transport or server side).
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Input validation errors (invalid ids, cursors, event names).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),
}

impl Error {
    /// Returns true when retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Fetch(err) => err.is_retryable(),
            Error::InvalidInput(_) => false,
        }
    }
}

/// Errors raised while fetching a page.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request never reached the server or the connection dropped.
    #[error("transport failed: {message}")]
    Transport { message: String },

    /// The server answered with an error status.
    #[error("{0}")]
    Server(ServerError),

    /// The fetch was abandoned before it produced a page.
    #[error("fetch cancelled")]
    Cancelled,
}

impl FetchError {
    /// Create a transport error from any displayable cause.
    pub fn transport(message: impl fmt::Display) -> Self {
        FetchError::Transport {
            message: message.to_string(),
        }
    }

    /// Returns true for transport failures and 5xx responses.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Transport { .. } => true,
            FetchError::Server(err) => err.status >= 500,
            FetchError::Cancelled => false,
        }
    }
}

/// An error status returned by the server for a page query.
#[derive(Debug)]
pub struct ServerError {
    /// HTTP-style status code.
    pub status: u16,
    /// Error code, if the server sent one.
    pub code: Option<String>,
    /// Error message from the server.
    pub message: Option<String>,
}

impl ServerError {
    /// Create a new server error.
    pub fn new(status: u16, code: Option<String>, message: Option<String>) -> Self {
        Self {
            status,
            code,
            message,
        }
    }
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "server returned {}", self.status)?;
        if let Some(ref code) = self.code {
            write!(f, " [{}]", code)?;
        }
        if let Some(ref message) = self.message {
            write!(f, ": {}", message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ServerError {}

impl From<ServerError> for Error {
    fn from(err: ServerError) -> Self {
        Error::Fetch(FetchError::Server(err))
    }
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// An identifier failed validation.
    #[error("invalid {kind} '{value}': {reason}")]
    Id {
        kind: &'static str,
        value: String,
        reason: String,
    },

    /// A pagination cursor could not be decoded.
    #[error("invalid cursor '{value}': {reason}")]
    Cursor { value: String, reason: String },

    /// An event name outside the supported set.
    #[error("unknown event '{value}'")]
    EventKind { value: String },

    /// A vote referenced by id does not exist.
    #[error("unknown vote '{id}'")]
    UnknownVote { id: String },

    /// Generic invalid input.
    #[error("{message}")]
    Other { message: String },
}
