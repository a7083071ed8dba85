use jiff::Timestamp;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{ImageData, Metrics, null_as_default, unix_epoch};

/// A single-prompt completion request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GenerateRequest {
    /// Model identifier
    #[serde(default)]
    pub model: String,
    /// Prompt text
    #[serde(default)]
    pub prompt: String,
    /// Text after the insertion point, for fill-in-the-middle models
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
    /// System prompt override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// Prompt template override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    /// Context returned by a previous call
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "null_as_default")]
    pub context: Vec<i64>,
    /// Attached images
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "null_as_default")]
    #[schemars(with = "Vec<String>")]
    pub images: Vec<ImageData>,
    /// Skip prompt templating
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<bool>,
    /// Output format
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<Value>,
    /// Backend-specific model options
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Map<String, Value>>,
    /// How long the backend keeps the model loaded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keep_alive: Option<Value>,
    /// Streaming flag; always forced off before dispatch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
}

/// A single-prompt completion response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GenerateResponse {
    /// Model that produced the response
    #[serde(default)]
    pub model: String,
    /// Creation time
    #[serde(default = "unix_epoch")]
    #[schemars(with = "String")]
    pub created_at: Timestamp,
    /// Generated text
    #[serde(default)]
    pub response: String,
    /// Model reasoning, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thinking: Option<String>,
    /// Whether generation stopped normally
    #[serde(default)]
    pub done: bool,
    /// Backend finish reason
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub done_reason: Option<String>,
    /// Context to pass to a follow-up request
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "null_as_default")]
    pub context: Vec<i64>,
    /// Counters
    #[serde(flatten)]
    pub metrics: Metrics,
}
