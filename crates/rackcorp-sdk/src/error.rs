// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Error types for rackcorp-sdk.

use thiserror::Error;

/// Result type using SdkError.
pub type Result<T> = std::result::Result<T, SdkError>;

/// Errors that can occur when using the SDK.
#[derive(Debug, Error)]
pub enum SdkError {
    /// Configuration error (missing or invalid values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Caller-side precondition violated before any request was sent.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The transport failed to deliver the request or read the reply.
    #[error("transport error during {action}: {message}")]
    Transport { action: String, message: String },

    /// The reply could not be decoded into the expected shape.
    #[error("malformed response for {action}: {message}")]
    MalformedResponse { action: String, message: String },

    /// The API answered with a non-OK code, or with OK but without the
    /// payload the operation guarantees.
    #[error("api error during {action} [{code}]: {message}")]
    Api {
        action: String,
        code: String,
        message: String,
        /// Nested error detail, verbatim from the response.
        detail: Option<serde_json::Value>,
    },

    /// Serialization of an outgoing payload failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Waiting for pending transactions exceeded the configured deadline.
    #[error("timed out after {waited_ms}ms waiting for pending transactions on {object_id}")]
    PollTimeout { object_id: String, waited_ms: u64 },

    /// Waiting for pending transactions was cancelled by the caller.
    #[error("cancelled while waiting for pending transactions on {object_id}")]
    Cancelled { object_id: String },
}

impl SdkError {
    /// True for errors reported by the API itself.
    pub fn is_api_error(&self) -> bool {
        matches!(self, SdkError::Api { .. })
    }

    /// True for connection, timeout and HTTP-level failures.
    pub fn is_transport_error(&self) -> bool {
        matches!(self, SdkError::Transport { .. })
    }

    /// The provider status code, if this is an API error.
    pub fn api_code(&self) -> Option<&str> {
        match self {
            SdkError::Api { code, .. } => Some(code),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for SdkError {
    fn from(err: serde_json::Error) -> Self {
        SdkError::Serialization(err.to_string())
    }
}
