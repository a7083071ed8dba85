//! Ollama HTTP API wire format types
//!
//! Generate and embedding payloads share the canonical shapes exactly and are
//! sent as-is; only the chat and show shapes need their own structs.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::{Metrics, ModelDetails, Tool, ToolCall};

// -- Chat --

/// `/api/chat` request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaChatRequest {
    /// Model identifier
    pub model: String,
    /// Conversation, oldest first
    pub messages: Vec<OllamaMessage>,
    /// Tool declarations
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Tool>,
    /// Always `false`
    pub stream: bool,
    /// Output format
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<Value>,
    /// Model options
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Map<String, Value>>,
    /// Keep-alive duration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keep_alive: Option<Value>,
    /// Reasoning toggle
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub think: Option<Value>,
}

/// Chat message as Ollama encodes it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaMessage {
    /// Role name
    pub role: String,
    /// Text content
    #[serde(default)]
    pub content: String,
    /// Reasoning text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thinking: Option<String>,
    /// Base64-encoded images
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
    /// Tool calls
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    /// Tool answered by this message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
}

/// `/api/chat` response with `stream: false`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaChatResponse {
    /// Model identifier
    #[serde(default)]
    pub model: String,
    /// RFC 3339 creation time
    #[serde(default)]
    pub created_at: Option<String>,
    /// Assistant message
    pub message: OllamaMessage,
    /// Finish reason
    #[serde(default)]
    pub done_reason: Option<String>,
    /// Completion flag as reported by Ollama
    #[serde(default)]
    pub done: bool,
    /// Counters
    #[serde(flatten)]
    pub metrics: Metrics,
}

// -- Show --

/// `/api/show` request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaShowRequest {
    /// Model identifier
    pub model: String,
    /// Include verbose tokenizer data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verbose: Option<bool>,
}

/// `/api/show` response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OllamaShowResponse {
    /// License text
    #[serde(default)]
    pub license: String,
    /// Modelfile source
    #[serde(default)]
    pub modelfile: String,
    /// Default parameters
    #[serde(default)]
    pub parameters: String,
    /// Prompt template
    #[serde(default)]
    pub template: String,
    /// Default system prompt
    #[serde(default)]
    pub system: String,
    /// Summary details
    #[serde(default)]
    pub details: ModelDetails,
    /// Architecture metadata
    #[serde(default)]
    pub model_info: Map<String, Value>,
    /// Capability identifiers
    #[serde(default)]
    pub capabilities: Vec<String>,
    /// RFC 3339 modification time
    #[serde(default)]
    pub modified_at: Option<String>,
}

// -- Model management --

/// `/api/tags` response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OllamaTagsResponse {
    /// Locally available models
    #[serde(default)]
    pub models: Vec<OllamaLocalModel>,
}

/// Entry in the local model list
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OllamaLocalModel {
    /// Display name (`family:tag`)
    #[serde(default)]
    pub name: String,
    /// Model identifier
    #[serde(default)]
    pub model: String,
    /// Size on disk in bytes
    #[serde(default)]
    pub size: u64,
    /// Content digest
    #[serde(default)]
    pub digest: String,
}

impl OllamaLocalModel {
    /// Identifier used for matching, preferring `model` over `name`
    pub fn identifier(&self) -> &str {
        if self.model.is_empty() { &self.name } else { &self.model }
    }
}

/// `/api/pull` request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaPullRequest {
    /// Model identifier
    pub model: String,
    /// Allow insecure registries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insecure: Option<bool>,
    /// Stream progress lines
    pub stream: bool,
}

/// One NDJSON progress line from `/api/pull`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OllamaPullProgress {
    /// Phase description
    #[serde(default)]
    pub status: String,
    /// Layer digest being fetched
    #[serde(default)]
    pub digest: Option<String>,
    /// Total bytes of the layer
    #[serde(default)]
    pub total: u64,
    /// Bytes fetched so far
    #[serde(default)]
    pub completed: u64,
    /// Failure reported mid-stream
    #[serde(default)]
    pub error: Option<String>,
}

/// Ollama error body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaErrorResponse {
    /// Error text
    pub error: String,
}
