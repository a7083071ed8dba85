use std::time::Duration;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use switchboard_core::{CallContext, Interrupted};
use switchboard_llm::types::{
    ChatRequest, ChatResponse, EmbedRequest, EmbedResponse, EmbeddingRequest, EmbeddingResponse, GenerateRequest,
    GenerateResponse, ShowRequest, ShowResponse,
};
use switchboard_llm::ApiRequest;

use crate::error::{ClientError, Result};
use crate::transport::Transport;

/// Reply budget when the call context carries no deadline
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client bound to one backend and one model
///
/// The `model` field of every request is overwritten with the bound model
/// before it is sent.
#[derive(Debug, Clone)]
pub struct LlmClient<T> {
    transport: T,
    backend: String,
    model: String,
}

impl<T: Transport> LlmClient<T> {
    /// Client for `model` on `backend` (`ollama` or `gemini`)
    pub fn new(transport: T, backend: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            transport,
            backend: backend.into(),
            model: model.into(),
        }
    }

    /// Backend the client talks to
    pub fn backend(&self) -> &str {
        &self.backend
    }

    /// Model every request is sent with
    pub fn model(&self) -> &str {
        &self.model
    }

    /// One non-streaming chat turn
    pub async fn chat(&self, request: ChatRequest, context: &CallContext) -> Result<ChatResponse> {
        self.call(ApiRequest::Chat(request), context).await
    }

    /// Single-prompt completion
    pub async fn generate(&self, request: GenerateRequest, context: &CallContext) -> Result<GenerateResponse> {
        self.call(ApiRequest::Generate(request), context).await
    }

    /// Batch embeddings
    pub async fn embed(&self, request: EmbedRequest, context: &CallContext) -> Result<EmbedResponse> {
        self.call(ApiRequest::Embed(request), context).await
    }

    /// Legacy single-prompt embedding
    pub async fn embedding(&self, request: EmbeddingRequest, context: &CallContext) -> Result<EmbeddingResponse> {
        self.call(ApiRequest::Embedding(request), context).await
    }

    /// Model metadata
    pub async fn show(&self, request: ShowRequest, context: &CallContext) -> Result<ShowResponse> {
        self.call(ApiRequest::Show(request), context).await
    }

    async fn call<R: DeserializeOwned>(&self, mut request: ApiRequest, context: &CallContext) -> Result<R> {
        request.set_model(self.model.as_str());

        let operation = request.operation();
        let subject = operation.subject(&self.backend);
        let payload = request.encode().map_err(|e| ClientError::Encode(e.to_string()))?;

        let budget = context.remaining().unwrap_or(DEFAULT_TIMEOUT);
        if budget.is_zero() {
            return Err(ClientError::Timeout(budget));
        }

        tracing::debug!(%subject, model = %self.model, ?budget, "sending request");

        let reply = context
            .run(self.transport.request(subject, Bytes::from(payload), budget))
            .await
            .map_err(|interrupted| match interrupted {
                Interrupted::Cancelled => ClientError::Cancelled,
                Interrupted::DeadlineExceeded => ClientError::Timeout(budget),
            })??;

        if reply.is_empty() {
            return Err(ClientError::EmptyReply);
        }

        Ok(serde_json::from_slice(&reply)?)
    }
}
