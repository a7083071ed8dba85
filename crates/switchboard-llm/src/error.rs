use switchboard_core::{BAD_REQUEST, Interrupted, ReplyError, SERVER_ERROR};
use thiserror::Error;

/// Errors that can occur while serving an LLM operation
#[derive(Debug, Error)]
pub enum LlmError {
    /// Request body could not be decoded or violates the canonical schema
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The readiness step could not confirm or fetch the requested model
    #[error("failed to provision model '{model}': {reason}")]
    Provisioning {
        /// Requested model identifier
        model: String,
        /// Underlying failure
        reason: String,
    },

    /// The backend call itself failed
    #[error("backend error: {0}")]
    Backend(String),

    /// The backend replied in a shape that has no canonical equivalent
    #[error("translation error: {0}")]
    Translation(String),

    /// The backend does not serve this operation
    #[error("operation '{operation}' is not supported by backend '{backend}'")]
    Unsupported {
        /// Backend name
        backend: String,
        /// Operation name
        operation: String,
    },

    /// The call deadline passed while waiting on the backend
    #[error("deadline exceeded")]
    DeadlineExceeded,

    /// The call was cancelled while waiting on the backend
    #[error("request cancelled")]
    Cancelled,

    /// The canonical response could not be encoded
    #[error("failed to encode response: {0}")]
    Encode(String),

    /// Unexpected internal error
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl LlmError {
    /// Build a provisioning failure for `model`
    pub fn provisioning(model: &str, reason: impl ToString) -> Self {
        Self::Provisioning {
            model: model.to_owned(),
            reason: reason.to_string(),
        }
    }
}

impl From<Interrupted> for LlmError {
    fn from(interrupted: Interrupted) -> Self {
        match interrupted {
            Interrupted::DeadlineExceeded => Self::DeadlineExceeded,
            Interrupted::Cancelled => Self::Cancelled,
        }
    }
}

impl ReplyError for LlmError {
    fn code(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) | Self::Unsupported { .. } | Self::Encode(_) => BAD_REQUEST,
            Self::Provisioning { .. }
            | Self::Backend(_)
            | Self::Translation(_)
            | Self::DeadlineExceeded
            | Self::Cancelled
            | Self::Internal(_) => SERVER_ERROR,
        }
    }

    fn client_message(&self) -> String {
        match self {
            Self::Internal(_) => "an internal error occurred".to_owned(),
            other => other.to_string(),
        }
    }
}
