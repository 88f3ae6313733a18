// SPDX-FileCopyrightText: 2026 Qualia Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Qualia conversation engine.

use thiserror::Error;

/// The primary error type used across all Qualia collaborator traits and
/// core operations.
#[derive(Debug, Error)]
pub enum QualiaError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Repository errors (document fetch/update failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Outbound delivery errors (push/send API failure, rate limiting).
    #[error("delivery error: {message}")]
    Delivery {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Model-backend transport errors (network failure, non-2xx status).
    ///
    /// A job that hits this aborts without committing flags or sending a
    /// reply; the next inbound message re-arms the funnel.
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Model output could not be parsed into the expected JSON shape, or a
    /// required field was absent.
    #[error("malformed model response: {reason}")]
    MalformedResponse { reason: String },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl QualiaError {
    /// Wraps an arbitrary repository-layer error.
    pub fn storage<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        QualiaError::Storage {
            source: Box::new(source),
        }
    }

    /// Builds a transport error without an underlying source.
    pub fn transport(message: impl Into<String>) -> Self {
        QualiaError::Transport {
            message: message.into(),
            source: None,
        }
    }

    /// Builds a malformed-response error.
    pub fn malformed(reason: impl Into<String>) -> Self {
        QualiaError::MalformedResponse {
            reason: reason.into(),
        }
    }
}
