//! Mock Gemini Generative Language API for integration tests

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::{Json, Router, routing};
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

/// Key the mock accepts
pub const API_KEY: &str = "test-key";

type Response = (StatusCode, Json<Value>);

/// Mock Gemini backend
pub struct MockGemini {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockGeminiState>,
}

struct MockGeminiState {
    candidates: usize,
    requests: Mutex<Vec<(String, Value)>>,
}

impl MockGemini {
    /// Start a server answering with one candidate
    pub async fn start() -> anyhow::Result<Self> {
        Self::start_with_candidates(1).await
    }

    /// Start a server answering every generation with `candidates` candidates
    pub async fn start_with_candidates(candidates: usize) -> anyhow::Result<Self> {
        let state = Arc::new(MockGeminiState {
            candidates,
            requests: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route(
                "/v1beta/models/{target}",
                routing::get(handle_get_model).post(handle_action),
            )
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    /// Base URL, including the API version
    pub fn base_url(&self) -> url::Url {
        url::Url::parse(&format!("http://{}/v1beta", self.addr)).expect("valid mock address")
    }

    /// `(path target, body)` of every POST received
    pub fn requests(&self) -> Vec<(String, Value)> {
        self.state.requests.lock().unwrap().clone()
    }
}

impl Drop for MockGemini {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

fn rejected(headers: &HeaderMap) -> Option<Response> {
    let authorized = headers
        .get("x-goog-api-key")
        .is_some_and(|key| key.as_bytes() == API_KEY.as_bytes());

    (!authorized).then(|| {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": {"code": 400, "message": "API key not valid", "status": "INVALID_ARGUMENT"}})),
        )
    })
}

async fn handle_action(
    State(state): State<Arc<MockGeminiState>>,
    Path(target): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Some(rejection) = rejected(&headers) {
        return rejection;
    }

    state.requests.lock().unwrap().push((target.clone(), body.clone()));

    match target.split_once(':') {
        Some((_, "generateContent")) => generate_content(state.candidates, &body),
        Some((_, "batchEmbedContents")) => batch_embed(&body),
        _ => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": {"code": 404, "message": "unknown method", "status": "NOT_FOUND"}})),
        ),
    }
}

fn generate_content(candidates: usize, body: &Value) -> Response {
    let answered = body["contents"].as_array().is_some_and(|contents| {
        contents
            .iter()
            .flat_map(|c| c["parts"].as_array().into_iter().flatten())
            .any(|part| part.get("functionResponse").is_some())
    });

    let part = if answered {
        json!({"text": "It is 12:00."})
    } else {
        json!({"functionCall": {"name": "get_time", "args": {}}})
    };

    let candidate = json!({
        "content": {"role": "model", "parts": [part]},
        "finishReason": "STOP",
        "index": 0
    });

    (
        StatusCode::OK,
        Json(json!({
            "candidates": vec![candidate; candidates],
            "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 4, "totalTokenCount": 16},
            "modelVersion": "gemini-2.0-flash-001"
        })),
    )
}

fn batch_embed(body: &Value) -> Response {
    let count = body["requests"].as_array().map_or(0, Vec::len);
    let embeddings: Vec<Value> = (0..count).map(|_| json!({"values": [0.25, 0.5, 0.75]})).collect();

    (StatusCode::OK, Json(json!({ "embeddings": embeddings })))
}

async fn handle_get_model(Path(target): Path<String>, headers: HeaderMap) -> Response {
    if let Some(rejection) = rejected(&headers) {
        return rejection;
    }

    (
        StatusCode::OK,
        Json(json!({
            "name": format!("models/{target}"),
            "version": "001",
            "displayName": "Gemini 2.0 Flash",
            "description": "Fast multimodal model",
            "inputTokenLimit": 1_048_576,
            "outputTokenLimit": 8192,
            "supportedGenerationMethods": ["generateContent", "countTokens"]
        })),
    )
}
