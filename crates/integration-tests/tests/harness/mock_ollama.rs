//! Mock Ollama server for integration tests
//!
//! Serves the native `/api/*` routes with canned answers. Chat replies with a
//! `get_time` tool call until the conversation carries a tool result.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::{Json, Router, routing};
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

/// Mock Ollama backend
pub struct MockOllama {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockOllamaState>,
}

struct MockOllamaState {
    installed: Mutex<Vec<String>>,
    chats: Mutex<Vec<Value>>,
    pull_count: AtomicU32,
    pull_delay: Duration,
    pull_error: Option<String>,
}

impl MockOllama {
    /// Start a server with no models installed
    pub async fn start() -> anyhow::Result<Self> {
        Self::start_inner(Vec::new(), Duration::ZERO, None).await
    }

    /// Start a server with `models` already installed
    pub async fn start_with_models(models: &[&str]) -> anyhow::Result<Self> {
        Self::start_inner(models.iter().map(|m| (*m).to_owned()).collect(), Duration::ZERO, None).await
    }

    /// Start a server whose pulls take `delay`
    pub async fn start_with_slow_pull(delay: Duration) -> anyhow::Result<Self> {
        Self::start_inner(Vec::new(), delay, None).await
    }

    /// Start a server whose pulls stream an error line
    pub async fn start_with_pull_error(error: &str) -> anyhow::Result<Self> {
        Self::start_inner(Vec::new(), Duration::ZERO, Some(error.to_owned())).await
    }

    async fn start_inner(installed: Vec<String>, pull_delay: Duration, pull_error: Option<String>) -> anyhow::Result<Self> {
        let state = Arc::new(MockOllamaState {
            installed: Mutex::new(installed),
            chats: Mutex::new(Vec::new()),
            pull_count: AtomicU32::new(0),
            pull_delay,
            pull_error,
        });

        let app = Router::new()
            .route("/api/tags", routing::get(handle_tags))
            .route("/api/pull", routing::post(handle_pull))
            .route("/api/chat", routing::post(handle_chat))
            .route("/api/generate", routing::post(handle_generate))
            .route("/api/embed", routing::post(handle_embed))
            .route("/api/embeddings", routing::post(handle_embeddings))
            .route("/api/show", routing::post(handle_show))
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

    /// Base URL for pointing the Ollama client at the mock
    pub fn base_url(&self) -> url::Url {
        url::Url::parse(&format!("http://{}", self.addr)).expect("valid mock address")
    }

    /// Number of pulls received
    pub fn pull_count(&self) -> u32 {
        self.state.pull_count.load(Ordering::Relaxed)
    }

    /// Installed model identifiers
    pub fn installed(&self) -> Vec<String> {
        self.state.installed.lock().unwrap().clone()
    }

    /// Native chat bodies received, in order
    pub fn chats(&self) -> Vec<Value> {
        self.state.chats.lock().unwrap().clone()
    }
}

impl Drop for MockOllama {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn handle_tags(State(state): State<Arc<MockOllamaState>>) -> impl IntoResponse {
    let models: Vec<Value> = state
        .installed
        .lock()
        .unwrap()
        .iter()
        .map(|name| json!({"name": name, "model": name, "size": 4_661_224_676_u64, "digest": "sha256:abc"}))
        .collect();

    Json(json!({ "models": models }))
}

async fn handle_pull(State(state): State<Arc<MockOllamaState>>, Json(body): Json<Value>) -> impl IntoResponse {
    state.pull_count.fetch_add(1, Ordering::Relaxed);
    tokio::time::sleep(state.pull_delay).await;

    let model = body["model"].as_str().unwrap_or_default().to_owned();

    let mut lines = vec![
        json!({"status": "pulling manifest"}),
        json!({"status": "downloading", "digest": "sha256:abc", "total": 100, "completed": 50}),
        json!({"status": "downloading", "digest": "sha256:abc", "total": 100, "completed": 100}),
    ];

    match state.pull_error {
        Some(ref error) => lines.push(json!({ "error": error })),
        None => {
            lines.push(json!({"status": "success"}));
            state.installed.lock().unwrap().push(format!("{model}:latest"));
        }
    }

    let body: String = lines.iter().map(|line| format!("{line}\n")).collect();
    ([(header::CONTENT_TYPE, "application/x-ndjson")], body)
}

async fn handle_chat(State(state): State<Arc<MockOllamaState>>, Json(body): Json<Value>) -> impl IntoResponse {
    state.chats.lock().unwrap().push(body.clone());

    if body["stream"] != json!(false) {
        return (StatusCode::BAD_REQUEST, Json(json!({"error": "streaming not supported by mock"})));
    }

    let answered = body["messages"]
        .as_array()
        .is_some_and(|messages| messages.iter().any(|m| m["role"] == "tool"));

    let message = if answered {
        json!({"role": "assistant", "content": "It is 12:00."})
    } else {
        json!({
            "role": "assistant",
            "content": "",
            "tool_calls": [{"function": {"name": "get_time", "arguments": {}}}]
        })
    };

    (
        StatusCode::OK,
        Json(json!({
            "model": body["model"],
            "created_at": "2024-05-01T10:00:00.000000Z",
            "message": message,
            "done_reason": "stop",
            "done": true,
            "total_duration": 1_000_000,
            "eval_count": 7
        })),
    )
}

async fn handle_generate(Json(body): Json<Value>) -> impl IntoResponse {
    Json(json!({
        "model": body["model"],
        "created_at": "2024-05-01T10:00:00Z",
        "response": "Once upon a time.",
        "done": true,
        "done_reason": "stop"
    }))
}

async fn handle_embed(Json(body): Json<Value>) -> impl IntoResponse {
    let count = match &body["input"] {
        Value::Array(items) => items.len(),
        _ => 1,
    };

    Json(json!({
        "model": body["model"],
        "embeddings": vec![vec![0.1, 0.2, 0.3]; count]
    }))
}

async fn handle_embeddings() -> impl IntoResponse {
    Json(json!({ "embedding": [0.5, 0.25] }))
}

async fn handle_show(Json(body): Json<Value>) -> impl IntoResponse {
    if body["model"] == "missing" {
        return (StatusCode::NOT_FOUND, Json(json!({"error": "model 'missing' not found"})));
    }

    (
        StatusCode::OK,
        Json(json!({
            "modelfile": "FROM llama3",
            "parameters": "stop \"<|eot_id|>\"",
            "template": "{{ .Prompt }}",
            "details": {"format": "gguf", "family": "llama", "parameter_size": "8.0B", "quantization_level": "Q4_0"},
            "model_info": {"general.architecture": "llama", "llama.context_length": 8192},
            "capabilities": ["completion", "tools"]
        })),
    )
}
