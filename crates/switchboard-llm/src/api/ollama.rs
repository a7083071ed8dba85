//! Ollama HTTP client

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use serde::Serialize;
use url::Url;

use super::{check_status, decode, endpoint, send_error};
use crate::error::LlmError;
use crate::progress::ProgressReporter;
use crate::protocol::ollama::{
    OllamaChatRequest, OllamaChatResponse, OllamaErrorResponse, OllamaPullProgress, OllamaPullRequest,
    OllamaShowRequest, OllamaShowResponse, OllamaTagsResponse,
};
use crate::readiness::ModelStore;
use crate::types::{EmbedRequest, EmbedResponse, EmbeddingRequest, EmbeddingResponse, GenerateRequest, GenerateResponse};

/// Default Ollama address
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:11434";

const BACKEND: &str = "ollama";

/// Native Ollama operations
#[async_trait]
pub trait OllamaApi: Send + Sync {
    /// `POST /api/chat`
    async fn chat(&self, request: &OllamaChatRequest) -> Result<OllamaChatResponse, LlmError>;

    /// `POST /api/generate`
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, LlmError>;

    /// `POST /api/embed`
    async fn embed(&self, request: &EmbedRequest) -> Result<EmbedResponse, LlmError>;

    /// `POST /api/embeddings`
    async fn embeddings(&self, request: &EmbeddingRequest) -> Result<EmbeddingResponse, LlmError>;

    /// `POST /api/show`
    async fn show(&self, request: &OllamaShowRequest) -> Result<OllamaShowResponse, LlmError>;
}

/// Ollama API client over HTTP
#[derive(Debug, Clone)]
pub struct OllamaHttp {
    client: Client,
    base_url: Url,
}

impl OllamaHttp {
    /// Client for the server at `base_url`
    pub fn new(base_url: Url) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }

    /// Client sharing an existing connection pool
    pub const fn with_client(client: Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    /// Server address
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, LlmError>
    where
        B: Serialize + Sync,
        R: serde::de::DeserializeOwned,
    {
        let response = self
            .client
            .post(endpoint(&self.base_url, path))
            .json(body)
            .send()
            .await
            .map_err(|e| send_error(BACKEND, &e))?;

        let response = check_status(BACKEND, response, error_message).await?;
        decode(BACKEND, response).await
    }
}

fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<OllamaErrorResponse>(body).ok().map(|e| e.error)
}

#[async_trait]
impl OllamaApi for OllamaHttp {
    async fn chat(&self, request: &OllamaChatRequest) -> Result<OllamaChatResponse, LlmError> {
        tracing::debug!(model = %request.model, messages = request.messages.len(), "sending chat request");
        self.post("api/chat", request).await
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, LlmError> {
        self.post("api/generate", request).await
    }

    async fn embed(&self, request: &EmbedRequest) -> Result<EmbedResponse, LlmError> {
        self.post("api/embed", request).await
    }

    async fn embeddings(&self, request: &EmbeddingRequest) -> Result<EmbeddingResponse, LlmError> {
        self.post("api/embeddings", request).await
    }

    async fn show(&self, request: &OllamaShowRequest) -> Result<OllamaShowResponse, LlmError> {
        self.post("api/show", request).await
    }
}

#[async_trait]
impl ModelStore for OllamaHttp {
    async fn list_models(&self) -> Result<Vec<String>, LlmError> {
        let response = self
            .client
            .get(endpoint(&self.base_url, "api/tags"))
            .send()
            .await
            .map_err(|e| send_error(BACKEND, &e))?;

        let response = check_status(BACKEND, response, error_message).await?;
        let tags: OllamaTagsResponse = decode(BACKEND, response).await?;

        Ok(tags.models.iter().map(|m| m.identifier().to_owned()).collect())
    }

    async fn pull_model(&self, model: &str, progress: &dyn ProgressReporter) -> Result<(), LlmError> {
        let request = OllamaPullRequest {
            model: model.to_owned(),
            insecure: None,
            stream: true,
        };

        let response = self
            .client
            .post(endpoint(&self.base_url, "api/pull"))
            .json(&request)
            .send()
            .await
            .map_err(|e| send_error(BACKEND, &e))?;

        let response = check_status(BACKEND, response, error_message).await?;

        let mut stream = response.bytes_stream();
        let mut buffer = Vec::new();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| send_error(BACKEND, &e))?;
            buffer.extend_from_slice(&chunk);

            while let Some(newline) = buffer.iter().position(|&b| b == b'\n') {
                let line: Vec<u8> = buffer.drain(..=newline).collect();
                report_line(model, &line, progress)?;
            }
        }

        if !buffer.is_empty() {
            report_line(model, &buffer, progress)?;
        }

        Ok(())
    }
}

/// Forward one NDJSON progress line; an `error` line fails the pull
fn report_line(model: &str, line: &[u8], progress: &dyn ProgressReporter) -> Result<(), LlmError> {
    let line = line.trim_ascii();
    if line.is_empty() {
        return Ok(());
    }

    let update: OllamaPullProgress =
        serde_json::from_slice(line).map_err(|e| LlmError::Backend(format!("malformed pull progress: {e}")))?;

    if let Some(error) = update.error {
        return Err(LlmError::Backend(error));
    }

    if update.total != 0 {
        progress.update(model, &update.status, update.completed, update.total);
    } else {
        tracing::debug!(model, status = %update.status, "pull status");
    }

    Ok(())
}
