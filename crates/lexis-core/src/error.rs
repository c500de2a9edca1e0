// SPDX-FileCopyrightText: 2026 Lexis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Lexis vocabulary coordinator.

use thiserror::Error;

/// The primary error type used across collaborator traits and the router.
#[derive(Debug, Error)]
pub enum LexisError {
    /// An envelope carried a `type` outside the message registry.
    #[error("unrecognized message type `{kind}`")]
    UnrecognizedMessageType { kind: String },

    /// A request is missing a required field or carries an invalid value.
    #[error("validation error: {0}")]
    Validation(String),

    /// A lookup found nothing. Word lookups never surface this to clients.
    #[error("{what} not found")]
    NotFound { what: String },

    /// Persistence collaborator failure (connection, query, serialization).
    #[error("persistence error: {message}")]
    Persistence {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Upstream AI collaborator failure (HTTP, API error, stream decode).
    #[error("upstream error: {message}")]
    Upstream {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The requesting context went away before the stream finished.
    #[error("stream cancelled")]
    StreamCancelled,

    /// Configuration errors (invalid values, missing credentials).
    #[error("configuration error: {0}")]
    Config(String),

    /// The background answered a request with `success: false`.
    ///
    /// Only produced on the client side, carrying the response's `error`.
    #[error("request rejected: {0}")]
    Rejected(String),

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl LexisError {
    /// Wraps any storage-layer error as a persistence failure.
    pub fn persistence<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Persistence {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }

    /// Plain-language message safe to send across the context boundary.
    ///
    /// Never includes the source chain: clients only see what went wrong,
    /// not where inside the background process it happened.
    pub fn user_message(&self) -> String {
        match self {
            Self::UnrecognizedMessageType { kind } => {
                format!("Unrecognized message type: {kind}")
            }
            Self::Validation(message) => message.clone(),
            Self::NotFound { what } => format!("{what} not found"),
            Self::Persistence { .. } => {
                "Could not access the vocabulary store. Please try again.".to_string()
            }
            Self::Upstream { message, .. } => format!("AI service error: {message}"),
            Self::StreamCancelled => "The request was cancelled.".to_string(),
            Self::Config(message) => format!("Configuration problem: {message}"),
            Self::Rejected(message) => message.clone(),
            Self::Timeout { duration } => {
                format!("The request timed out after {}s.", duration.as_secs())
            }
            Self::Internal(_) => "Something went wrong. Please try again.".to_string(),
        }
    }
}
