//! Error types for pgportal.
//!
//! Defines the main error enum used throughout the application.

use crate::runner::ExecStatus;
use thiserror::Error;

/// Main error type for pgportal operations.
#[derive(Error, Debug)]
pub enum PortalError {
    /// The session could not be established (host unreachable, auth failed, bad descriptor, etc.)
    #[error("Connection to database failed: {0}")]
    Connection(String),

    /// A required command came back with the wrong status.
    #[error("{step} failed: {message}")]
    Command {
        /// Human-readable name of the failing step, e.g. "BEGIN command".
        step: String,
        expected: ExecStatus,
        actual: ExecStatus,
        message: String,
    },

    /// A result was used in a way its status does not allow.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Configuration errors (invalid config file, unknown named connection, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PortalError {
    /// Creates a connection error with the given message.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates a command failure for `step`.
    ///
    /// When the server supplied no message (the status simply did not match),
    /// the message describes the mismatch instead.
    pub fn command(
        step: impl Into<String>,
        expected: ExecStatus,
        actual: ExecStatus,
        message: Option<String>,
    ) -> Self {
        let message =
            message.unwrap_or_else(|| format!("expected {expected}, server returned {actual}"));
        Self::Command {
            step: step.into(),
            expected,
            actual,
            message,
        }
    }

    /// Creates an invalid state error with the given message.
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Connection(_) => "Connection Error",
            Self::Command { .. } => "Command Error",
            Self::InvalidState(_) => "Invalid State",
            Self::Config(_) => "Configuration Error",
            Self::Io(_) => "I/O Error",
        }
    }
}

/// Result type alias using PortalError.
pub type Result<T> = std::result::Result<T, PortalError>;
