use thiserror::Error;

/// Reply code for malformed or invalid requests
pub const BAD_REQUEST: &str = "400";

/// Reply code for backend, provisioning or translation failures
pub const SERVER_ERROR: &str = "500";

/// Trait for domain errors that can be sent back over the bus
///
/// Implemented by each feature crate's error type. The service layer turns
/// these into error replies, keeping domain errors decoupled from the
/// transport.
pub trait ReplyError: std::error::Error {
    /// Short machine-readable code (`"400"` or `"500"`)
    fn code(&self) -> &'static str;

    /// Human-readable description sent to the caller
    fn client_message(&self) -> String {
        self.to_string()
    }
}

/// Why a call stopped before its future completed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Interrupted {
    /// The call deadline passed
    #[error("deadline exceeded")]
    DeadlineExceeded,
    /// The call was cancelled
    #[error("call cancelled")]
    Cancelled,
}
