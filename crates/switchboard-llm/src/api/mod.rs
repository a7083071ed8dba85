//! HTTP capability handles for the native backend APIs
//!
//! Each handle is a thin `reqwest` client behind a trait, so adapters can be
//! driven by in-memory fakes in tests. Handles hold no per-call state and are
//! shared across concurrent requests through `Arc`.

pub mod gemini;
pub mod ollama;

use reqwest::Response;
use url::Url;

use crate::error::LlmError;

/// Join `path` onto `base`, keeping any path prefix the base already has
pub(crate) fn endpoint(base: &Url, path: &str) -> String {
    format!("{}/{}", base.as_str().trim_end_matches('/'), path.trim_start_matches('/'))
}

/// Turn a transport failure into a backend error
pub(crate) fn send_error(backend: &str, e: &reqwest::Error) -> LlmError {
    tracing::error!(backend, error = %e, "backend request failed");
    LlmError::Backend(format!("failed to reach {backend}: {e}"))
}

/// Pass successful responses through; read the body of failed ones
///
/// `extract` pulls the human-readable message out of the backend's error
/// body, falling back to the raw text.
pub(crate) async fn check_status(
    backend: &str,
    response: Response,
    extract: fn(&str) -> Option<String>,
) -> Result<Response, LlmError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = extract(&body).unwrap_or(body);

    tracing::error!(backend, status = %status, "backend API error: {message}");

    Err(LlmError::Backend(format!("{backend} returned {}: {message}", status.as_u16())))
}

/// Decode a JSON response body
pub(crate) async fn decode<T: serde::de::DeserializeOwned>(backend: &str, response: Response) -> Result<T, LlmError> {
    response.json().await.map_err(|e| {
        tracing::error!(backend, error = %e, "failed to parse backend response");
        LlmError::Backend(format!("malformed {backend} response: {e}"))
    })
}
