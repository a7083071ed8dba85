//! Gemini Generative Language API client

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use url::Url;

use super::{check_status, decode, endpoint, send_error};
use crate::convert::gemini::qualified_model;
use crate::error::LlmError;
use crate::protocol::gemini::{
    BatchEmbedContentsRequest, BatchEmbedContentsResponse, ErrorResponse, GenerateContentRequest,
    GenerateContentResponse, Model,
};

/// Default Gemini API base URL
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Header carrying the API key
const API_KEY_HEADER: &str = "x-goog-api-key";

const BACKEND: &str = "gemini";

/// Native Gemini operations
#[async_trait]
pub trait GeminiApi: Send + Sync {
    /// `POST models/{model}:generateContent`
    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, LlmError>;

    /// `POST models/{model}:batchEmbedContents`
    async fn batch_embed_contents(
        &self,
        model: &str,
        request: &BatchEmbedContentsRequest,
    ) -> Result<BatchEmbedContentsResponse, LlmError>;

    /// `GET models/{model}`
    async fn get_model(&self, model: &str) -> Result<Model, LlmError>;
}

/// Gemini API client over HTTP
pub struct GeminiHttp {
    client: Client,
    base_url: Url,
    api_key: SecretString,
}

impl GeminiHttp {
    /// Create a client; `base_url` defaults to the public v1beta endpoint
    pub fn new(api_key: SecretString, base_url: Option<Url>) -> Result<Self, LlmError> {
        let base_url = match base_url {
            Some(url) => url,
            None => Url::parse(DEFAULT_BASE_URL).map_err(|e| LlmError::Internal(e.into()))?,
        };

        Ok(Self {
            client: Client::new(),
            base_url,
            api_key,
        })
    }

    fn model_url(&self, model: &str, method: Option<&str>) -> String {
        let path = qualified_model(model);
        match method {
            Some(method) => endpoint(&self.base_url, &format!("{path}:{method}")),
            None => endpoint(&self.base_url, &path),
        }
    }

    async fn post<B, R>(&self, url: String, body: &B) -> Result<R, LlmError>
    where
        B: Serialize + Sync,
        R: serde::de::DeserializeOwned,
    {
        let response = self
            .client
            .post(url)
            .header(API_KEY_HEADER, self.api_key.expose_secret())
            .json(body)
            .send()
            .await
            .map_err(|e| send_error(BACKEND, &e))?;

        let response = check_status(BACKEND, response, error_message).await?;
        decode(BACKEND, response).await
    }
}

impl std::fmt::Debug for GeminiHttp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiHttp")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .map(|e| format!("{} ({})", e.error.message, e.error.status))
}

#[async_trait]
impl GeminiApi for GeminiHttp {
    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, LlmError> {
        tracing::debug!(model, contents = request.contents.len(), "sending generateContent request");
        self.post(self.model_url(model, Some("generateContent")), request).await
    }

    async fn batch_embed_contents(
        &self,
        model: &str,
        request: &BatchEmbedContentsRequest,
    ) -> Result<BatchEmbedContentsResponse, LlmError> {
        self.post(self.model_url(model, Some("batchEmbedContents")), request).await
    }

    async fn get_model(&self, model: &str) -> Result<Model, LlmError> {
        let response = self
            .client
            .get(self.model_url(model, None))
            .header(API_KEY_HEADER, self.api_key.expose_secret())
            .send()
            .await
            .map_err(|e| send_error(BACKEND, &e))?;

        let response = check_status(BACKEND, response, error_message).await?;
        decode(BACKEND, response).await
    }
}
