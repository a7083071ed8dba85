//! Backend trait and implementations

pub mod gemini;
pub mod ollama;

use std::future::Future;

use async_trait::async_trait;
use switchboard_core::CallContext;

use crate::error::LlmError;
use crate::progress::ProgressReporter;
use crate::types::{ApiRequest, ApiResponse, Operation};

/// Trait implemented by each LLM backend served on the bus
#[async_trait]
pub trait Backend: Send + Sync {
    /// Backend name, used as the subject prefix
    fn name(&self) -> &'static str;

    /// Operations this backend serves
    fn operations(&self) -> &'static [Operation];

    /// Whether `operation` needs the model loaded before the call
    fn requires_model(&self, _operation: Operation) -> bool {
        false
    }

    /// Make sure `model` is available on the backend
    async fn ensure_model(&self, _model: &str, _context: &CallContext) -> Result<(), LlmError> {
        Ok(())
    }

    /// Translate, invoke and translate back
    async fn handle(&self, request: ApiRequest, context: &CallContext) -> Result<ApiResponse, LlmError>;

    /// Whether this backend serves `operation`
    fn supports(&self, operation: Operation) -> bool {
        self.operations().contains(&operation)
    }
}

/// Run one backend call under the context's deadline and cancellation
///
/// This is the only suspension point of a call. The progress reporter sees
/// the call as a "processing" phase.
pub(crate) async fn invoke<F, T>(
    context: &CallContext,
    progress: &dyn ProgressReporter,
    future: F,
) -> Result<T, LlmError>
where
    F: Future<Output = Result<T, LlmError>> + Send,
{
    progress.begin("processing");
    let outcome = context.run(future).await;
    progress.finish();
    outcome?
}

/// Error for a request routed to a backend that does not serve it
pub(crate) fn unsupported(backend: &str, operation: Operation) -> LlmError {
    LlmError::Unsupported {
        backend: backend.to_owned(),
        operation: operation.as_str().to_owned(),
    }
}
