use jiff::Timestamp;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::null_as_default;

/// Request for a model descriptor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ShowRequest {
    /// Model identifier
    #[serde(default)]
    pub model: String,
    /// Include verbose tokenizer data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verbose: Option<bool>,
}

/// Summary details of a model
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ModelDetails {
    /// Parent model, if derived
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub parent_model: String,
    /// Weight file format
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub format: String,
    /// Model family
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub family: String,
    /// All families the model belongs to
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "null_as_default")]
    pub families: Vec<String>,
    /// Parameter count, human readable
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub parameter_size: String,
    /// Quantization level
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub quantization_level: String,
}

/// Model descriptor in the canonical schema
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ShowResponse {
    /// Model identifier, when the backend reports one
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub model: String,
    /// License text
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub license: String,
    /// Modelfile source
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub modelfile: String,
    /// Default parameters
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub parameters: String,
    /// Prompt template
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub template: String,
    /// Default system prompt
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub system: String,
    /// Summary details
    #[serde(default)]
    pub details: ModelDetails,
    /// Backend metadata, including `<family>.context_length`
    #[serde(default, deserialize_with = "null_as_default")]
    pub model_info: Map<String, Value>,
    /// Capability tags
    #[serde(default, deserialize_with = "null_as_default")]
    pub capabilities: Vec<String>,
    /// Last modification time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<String>")]
    pub modified_at: Option<Timestamp>,
}

impl ShowResponse {
    /// Context length advertised in `model_info`
    pub fn context_length(&self) -> Option<u64> {
        self.model_info
            .iter()
            .find(|(key, _)| key.ends_with(".context_length"))
            .and_then(|(_, value)| value.as_u64())
    }
}
