use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::null_as_default;

/// Text to embed: one string or a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum EmbedInput {
    /// A single input
    Single(String),
    /// Several inputs, embedded in order
    Multiple(Vec<String>),
}

impl Default for EmbedInput {
    fn default() -> Self {
        Self::Multiple(Vec::new())
    }
}

impl EmbedInput {
    /// Inputs in order
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            Self::Single(text) => vec![text.clone()],
            Self::Multiple(texts) => texts.clone(),
        }
    }
}

/// Batch embedding request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EmbedRequest {
    /// Model identifier
    #[serde(default)]
    pub model: String,
    /// Inputs to embed
    #[serde(default)]
    pub input: EmbedInput,
    /// Truncate inputs that exceed the context length
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub truncate: Option<bool>,
    /// Requested output dimensionality
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<u32>,
    /// Backend-specific model options
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Map<String, Value>>,
    /// How long the backend keeps the model loaded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keep_alive: Option<Value>,
}

/// Batch embedding response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EmbedResponse {
    /// Model that produced the vectors
    #[serde(default)]
    pub model: String,
    /// One vector per input, in input order
    #[serde(default, deserialize_with = "null_as_default")]
    pub embeddings: Vec<Vec<f32>>,
    /// Total time spent, in nanoseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_duration: Option<u64>,
    /// Time spent loading the model, in nanoseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_duration: Option<u64>,
    /// Input tokens evaluated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_eval_count: Option<u64>,
}

/// Legacy single-prompt embedding request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EmbeddingRequest {
    /// Model identifier
    #[serde(default)]
    pub model: String,
    /// Text to embed
    #[serde(default)]
    pub prompt: String,
    /// Backend-specific model options
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Map<String, Value>>,
    /// How long the backend keeps the model loaded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keep_alive: Option<Value>,
}

/// Legacy single-prompt embedding response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EmbeddingResponse {
    /// The embedding vector
    #[serde(default, deserialize_with = "null_as_default")]
    pub embedding: Vec<f64>,
}
