//! Error types for reconciliation operations.
//!
//! Errors are categorized so adapters can give appropriate user feedback.
//! The core itself never retries: a resolver error terminates the call that
//! triggered it and is returned unchanged.

use std::fmt;
use thiserror::Error;

/// Categories of reconciliation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// A referenced entity does not exist in the remote system
    NotFound,
    /// The remote call itself could not complete
    Transport,
    /// A caller precondition was violated
    MalformedInput,
}

impl ErrorCategory {
    /// Get a user-friendly description of this error category.
    pub fn description(&self) -> &'static str {
        match self {
            Self::NotFound => "Referenced entity not found",
            Self::Transport => "Remote call failed",
            Self::MalformedInput => "Invalid input",
        }
    }

    /// Get actionable advice for resolving this error category.
    pub fn advice(&self) -> &'static str {
        match self {
            Self::NotFound => "Check that the referenced name or id exists in the remote system",
            Self::Transport => "Check connectivity and credentials for the remote API",
            Self::MalformedInput => "Fix the configuration value named in the error",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Errors that can occur during aggregation, flattening or resolution.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// The referenced entity does not exist remotely
    #[error("{kind} not found: {key}")]
    NotFound {
        /// What was being looked up (e.g. "segment name", "segment id")
        kind: String,
        /// The key that could not be resolved
        key: String,
    },

    /// The resolver could not complete its call
    #[error("transport error: {message}")]
    Transport {
        /// Detailed error message from the failed remote call
        message: String,
    },

    /// A caller precondition was violated
    #[error("malformed input: {message}")]
    MalformedInput {
        /// Description of the violated precondition
        message: String,
    },
}

impl Error {
    /// Create a `NotFound` error.
    pub fn not_found(kind: impl Into<String>, key: impl Into<String>) -> Self {
        Self::NotFound {
            kind: kind.into(),
            key: key.into(),
        }
    }

    /// Create a `Transport` error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create a `MalformedInput` error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedInput {
            message: message.into(),
        }
    }

    /// Get the error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::NotFound { .. } => ErrorCategory::NotFound,
            Error::Transport { .. } => ErrorCategory::Transport,
            Error::MalformedInput { .. } => ErrorCategory::MalformedInput,
        }
    }

    /// Whether the referenced entity was missing remotely.
    pub fn is_not_found(&self) -> bool {
        self.category() == ErrorCategory::NotFound
    }
}

/// Result type for reconciliation operations.
pub type Result<T> = std::result::Result<T, Error>;
