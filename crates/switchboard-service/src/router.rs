use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use switchboard_core::{BAD_REQUEST, CallContext, ReplyError};
use switchboard_llm::{ApiRequest, Backend, LlmError, Operation};

/// Outcome of one request, ready to be sent back on the bus
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Encoded canonical response
    Success(Bytes),
    /// Error reply carried in the service error headers
    Failure {
        /// `"400"` or `"500"`
        code: &'static str,
        /// Human-readable description
        description: String,
    },
}

impl Reply {
    fn from_error(error: &impl ReplyError) -> Self {
        Self::Failure {
            code: error.code(),
            description: error.client_message(),
        }
    }

    /// Convert into the shape the NATS service API responds with
    pub fn into_service_result(self) -> Result<Bytes, async_nats::service::error::Error> {
        match self {
            Self::Success(body) => Ok(body),
            Self::Failure { code, description } => Err(async_nats::service::error::Error {
                status: description,
                code: code.parse().unwrap_or(500),
            }),
        }
    }
}

/// A (backend, operation) pair bound to a subject
#[derive(Clone)]
struct Route {
    backend: Arc<dyn Backend>,
    operation: Operation,
}

/// Binds every (backend, operation) pair to its subject and runs requests
///
/// Per request: decode, force streaming off, validate, run readiness when the
/// backend needs it under the readiness budget, invoke the backend under the
/// per-request budget, encode.
/// Every failure becomes exactly one error reply; none of them stop the
/// router.
pub struct Router {
    backends: Vec<Arc<dyn Backend>>,
    routes: HashMap<String, Route>,
    request_timeout: Option<Duration>,
    readiness_timeout: Option<Duration>,
}

/// Readiness budget used unless [`Router::with_readiness_timeout`] says otherwise
pub const DEFAULT_READINESS_TIMEOUT: Duration = Duration::from_secs(30 * 60);

impl Router {
    /// Router with no backends; `request_timeout` bounds each backend call
    pub fn new(request_timeout: Option<Duration>) -> Self {
        Self {
            backends: Vec::new(),
            routes: HashMap::new(),
            request_timeout,
            readiness_timeout: Some(DEFAULT_READINESS_TIMEOUT),
        }
    }

    /// Bound model readiness (listing plus any pull) by `timeout`
    ///
    /// `None` leaves readiness bounded only by the caller's context.
    #[must_use]
    pub const fn with_readiness_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.readiness_timeout = timeout;
        self
    }

    /// Register every operation `backend` serves
    #[must_use]
    pub fn with_backend(mut self, backend: Arc<dyn Backend>) -> Self {
        for &operation in backend.operations() {
            self.routes.insert(
                operation.subject(backend.name()),
                Route {
                    backend: backend.clone(),
                    operation,
                },
            );
        }
        self.backends.push(backend);
        self
    }

    /// Registered backends, in registration order
    pub fn backends(&self) -> &[Arc<dyn Backend>] {
        &self.backends
    }

    /// Every subject served
    pub fn subjects(&self) -> impl Iterator<Item = &str> {
        self.routes.keys().map(String::as_str)
    }

    /// Handle a request that arrived on `subject`
    pub async fn route(&self, subject: &str, payload: &[u8], parent: &CallContext) -> Reply {
        let Some(route) = self.routes.get(subject) else {
            tracing::warn!(subject, "no endpoint bound to subject");
            return Reply::Failure {
                code: BAD_REQUEST,
                description: format!("no endpoint bound to subject '{subject}'"),
            };
        };

        self.dispatch(route.backend.as_ref(), route.operation, payload, parent)
            .await
    }

    /// Handle a request for `operation` on `backend`
    pub async fn dispatch(
        &self,
        backend: &dyn Backend,
        operation: Operation,
        payload: &[u8],
        parent: &CallContext,
    ) -> Reply {
        let mut model = String::new();

        match self.process(backend, operation, payload, parent, &mut model).await {
            Ok(body) => {
                tracing::debug!(backend = backend.name(), %operation, model, bytes = body.len(), "request served");
                Reply::Success(Bytes::from(body))
            }
            Err(e) => {
                tracing::warn!(
                    backend = backend.name(),
                    %operation,
                    model,
                    code = e.code(),
                    error = %e,
                    "request failed"
                );
                Reply::from_error(&e)
            }
        }
    }

    async fn process(
        &self,
        backend: &dyn Backend,
        operation: Operation,
        payload: &[u8],
        parent: &CallContext,
        model: &mut String,
    ) -> Result<Vec<u8>, LlmError> {
        let mut request = ApiRequest::decode(operation, payload)?;
        model.push_str(request.model());

        request.disable_streaming();
        request.validate()?;

        // separate budget: a first pull can outlast the call budget
        if backend.requires_model(operation) {
            let readiness = parent.child(self.readiness_timeout);
            backend.ensure_model(model, &readiness).await?;
        }

        let context = parent.child(self.request_timeout);
        let response = backend.handle(request, &context).await?;

        response.encode()
    }
}
