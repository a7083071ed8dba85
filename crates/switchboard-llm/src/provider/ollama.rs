//! Ollama backend

use std::sync::Arc;

use async_trait::async_trait;
use switchboard_core::CallContext;

use super::{Backend, invoke};
use crate::api::ollama::OllamaApi;
use crate::convert::ollama::{describe_model, show_request, translate_request, translate_response};
use crate::error::LlmError;
use crate::progress::ProgressReporter;
use crate::readiness::{ModelStore, ReadinessManager};
use crate::types::{ApiRequest, ApiResponse, Operation};

const OPERATIONS: &[Operation] = &[
    Operation::Chat,
    Operation::Generate,
    Operation::Embed,
    Operation::Embedding,
    Operation::Show,
];

/// Local Ollama server
pub struct OllamaBackend {
    api: Arc<dyn OllamaApi>,
    readiness: ReadinessManager,
    progress: Arc<dyn ProgressReporter>,
}

impl OllamaBackend {
    /// Backend over a handle that serves both the API and the model store
    pub fn new<C>(client: Arc<C>, progress: Arc<dyn ProgressReporter>) -> Self
    where
        C: OllamaApi + ModelStore + 'static,
    {
        Self::from_parts(client.clone(), client, progress)
    }

    /// Backend over separate API and model store handles
    pub fn from_parts(
        api: Arc<dyn OllamaApi>,
        store: Arc<dyn ModelStore>,
        progress: Arc<dyn ProgressReporter>,
    ) -> Self {
        Self {
            api,
            readiness: ReadinessManager::new(store, progress.clone()),
            progress,
        }
    }
}

#[async_trait]
impl Backend for OllamaBackend {
    fn name(&self) -> &'static str {
        "ollama"
    }

    fn operations(&self) -> &'static [Operation] {
        OPERATIONS
    }

    fn requires_model(&self, operation: Operation) -> bool {
        matches!(
            operation,
            Operation::Chat | Operation::Generate | Operation::Embed | Operation::Show
        )
    }

    async fn ensure_model(&self, model: &str, context: &CallContext) -> Result<(), LlmError> {
        self.readiness.ensure(model, context).await.map(|_| ())
    }

    async fn handle(&self, request: ApiRequest, context: &CallContext) -> Result<ApiResponse, LlmError> {
        let progress = self.progress.as_ref();

        match request {
            ApiRequest::Chat(chat) => {
                let native = translate_request(chat);
                let response = invoke(context, progress, self.api.chat(&native)).await?;
                translate_response(response).map(ApiResponse::Chat)
            }
            ApiRequest::Generate(mut generate) => {
                generate.stream = Some(false);
                invoke(context, progress, self.api.generate(&generate))
                    .await
                    .map(ApiResponse::Generate)
            }
            ApiRequest::Embed(embed) => invoke(context, progress, self.api.embed(&embed))
                .await
                .map(ApiResponse::Embed),
            ApiRequest::Embedding(embedding) => invoke(context, progress, self.api.embeddings(&embedding))
                .await
                .map(ApiResponse::Embedding),
            ApiRequest::Show(show) => {
                let model = show.model.clone();
                let native = invoke(context, progress, self.api.show(&show_request(show))).await?;
                describe_model(&model, native).map(ApiResponse::Show)
            }
        }
    }
}
