use switchboard_llm::LlmError;
use thiserror::Error;

/// Errors that stop the service from starting
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The micro-service could not be registered on the bus
    #[error("failed to register service '{name}': {reason}")]
    Register {
        /// Service name
        name: String,
        /// Underlying failure
        reason: String,
    },

    /// An endpoint could not be added
    #[error("failed to add endpoint '{subject}': {reason}")]
    Endpoint {
        /// Endpoint subject
        subject: String,
        /// Underlying failure
        reason: String,
    },

    /// Endpoint schema metadata could not be generated
    #[error("failed to build endpoint schema: {0}")]
    Schema(#[from] LlmError),
}
