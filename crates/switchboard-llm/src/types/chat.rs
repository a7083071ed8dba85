use std::collections::HashSet;

use jiff::Timestamp;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{Message, Role, Tool, null_as_default, unix_epoch};
use crate::error::LlmError;

/// A chat request in the canonical schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ChatRequest {
    /// Model identifier
    #[serde(default)]
    pub model: String,
    /// Conversation so far, oldest first
    #[serde(default, deserialize_with = "null_as_default")]
    pub messages: Vec<Message>,
    /// Tools the model may call
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "null_as_default")]
    pub tools: Vec<Tool>,
    /// Streaming flag; always forced off before dispatch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
    /// Output format (`"json"` or a JSON schema)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<Value>,
    /// Backend-specific model options
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Map<String, Value>>,
    /// How long the backend keeps the model loaded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keep_alive: Option<Value>,
    /// Reasoning toggle or effort level
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub think: Option<Value>,
}

impl ChatRequest {
    /// Request for `model` over `messages`
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            tools: Vec::new(),
            stream: None,
            format: None,
            options: None,
            keep_alive: None,
            think: None,
        }
    }

    /// Attach tool declarations
    #[must_use]
    pub fn with_tools(mut self, tools: Vec<Tool>) -> Self {
        self.tools = tools;
        self
    }

    /// Check the canonical invariants
    ///
    /// Messages must be non-empty, the last one must come from `user` or
    /// `tool`, and tool names must be present and unique.
    pub fn validate(&self) -> Result<(), LlmError> {
        let Some(last) = self.messages.last() else {
            return Err(LlmError::InvalidRequest("messages must not be empty".to_owned()));
        };

        if !matches!(last.role, Role::User | Role::Tool) {
            return Err(LlmError::InvalidRequest(format!(
                "message role must be 'user' or 'tool' but was '{}'",
                last.role
            )));
        }

        let mut seen = HashSet::with_capacity(self.tools.len());
        for tool in &self.tools {
            let name = tool.function.name.as_str();
            if name.is_empty() {
                return Err(LlmError::InvalidRequest("tool declaration has an empty name".to_owned()));
            }
            if !seen.insert(name) {
                return Err(LlmError::InvalidRequest(format!("duplicate tool declaration '{name}'")));
            }
        }

        Ok(())
    }

    /// The honored system instruction (first system message), if any
    pub fn system_prompt(&self) -> Option<&Message> {
        self.messages.iter().find(|m| m.role == Role::System)
    }
}

/// Timing and token counters reported by the backend
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Metrics {
    /// Total time spent, in nanoseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_duration: Option<u64>,
    /// Time spent loading the model, in nanoseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_duration: Option<u64>,
    /// Prompt tokens evaluated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_eval_count: Option<u64>,
    /// Time spent on the prompt, in nanoseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_eval_duration: Option<u64>,
    /// Tokens generated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eval_count: Option<u64>,
    /// Time spent generating, in nanoseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eval_duration: Option<u64>,
}

/// A chat response in the canonical schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ChatResponse {
    /// Model that produced the response
    #[serde(default)]
    pub model: String,
    /// Creation time
    #[serde(default = "unix_epoch")]
    #[schemars(with = "String")]
    pub created_at: Timestamp,
    /// The generated assistant message
    pub message: Message,
    /// Backend finish reason, passed through unchanged
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub done_reason: Option<String>,
    /// Whether generation stopped normally
    #[serde(default)]
    pub done: bool,
    /// Counters
    #[serde(flatten)]
    pub metrics: Metrics,
}
