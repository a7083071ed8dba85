use std::time::Duration;

/// Client-specific result type
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors from the client stub
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request could not be encoded
    #[error("failed to encode request: {0}")]
    Encode(String),

    /// The reply could not be decoded as the expected response type
    #[error("failed to decode reply: {0}")]
    Decode(#[from] serde_json::Error),

    /// The bus connection failed
    #[error("transport error: {0}")]
    Transport(String),

    /// No reply arrived within the budget
    #[error("no reply within {0:?}")]
    Timeout(Duration),

    /// The service answered with an empty body
    #[error("service sent an empty reply")]
    EmptyReply,

    /// The service answered with an error reply
    #[error("service error {code}: {description}")]
    Service {
        /// `"400"` or `"500"`
        code: String,
        /// Human-readable description
        description: String,
    },

    /// The caller cancelled the request
    #[error("request cancelled")]
    Cancelled,
}

impl ClientError {
    /// Whether the service rejected the request itself
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Service { code, .. } if code == switchboard_core::BAD_REQUEST)
    }
}
