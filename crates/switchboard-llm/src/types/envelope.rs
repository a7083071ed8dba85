//! Operation-tagged request and response envelopes
//!
//! The router dispatches over [`Operation`]; the payload variants carry the
//! matching canonical type. Decoding and encoding happen only here.

use std::fmt;

use serde::Serialize;

use super::{
    ChatRequest, ChatResponse, EmbedRequest, EmbedResponse, EmbeddingRequest, EmbeddingResponse, GenerateRequest,
    GenerateResponse, ShowRequest, ShowResponse,
};
use crate::error::LlmError;

/// Operation served on the bus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Multi-turn chat
    Chat,
    /// Single-prompt completion
    Generate,
    /// Batch embedding
    Embed,
    /// Legacy single-prompt embedding
    Embedding,
    /// Model descriptor
    Show,
}

impl Operation {
    /// Every operation, in registration order
    pub const ALL: [Self; 5] = [Self::Chat, Self::Generate, Self::Embed, Self::Embedding, Self::Show];

    /// Subject suffix and endpoint name
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::Generate => "generate",
            Self::Embed => "embed",
            Self::Embedding => "embedding",
            Self::Show => "show",
        }
    }

    /// Full subject for this operation on `backend`
    pub fn subject(self, backend: &str) -> String {
        format!("{backend}.{}", self.as_str())
    }

    /// Whether requests of this kind carry a streaming flag
    pub const fn streams(self) -> bool {
        matches!(self, Self::Chat | Self::Generate)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical request for one operation
#[derive(Debug, Clone, PartialEq)]
pub enum ApiRequest {
    /// Chat request
    Chat(ChatRequest),
    /// Completion request
    Generate(GenerateRequest),
    /// Batch embedding request
    Embed(EmbedRequest),
    /// Legacy embedding request
    Embedding(EmbeddingRequest),
    /// Model descriptor request
    Show(ShowRequest),
}

impl ApiRequest {
    /// Decode `body` as the request type of `operation`
    pub fn decode(operation: Operation, body: &[u8]) -> Result<Self, LlmError> {
        let invalid = |e: serde_json::Error| LlmError::InvalidRequest(e.to_string());

        Ok(match operation {
            Operation::Chat => Self::Chat(serde_json::from_slice(body).map_err(invalid)?),
            Operation::Generate => Self::Generate(serde_json::from_slice(body).map_err(invalid)?),
            Operation::Embed => Self::Embed(serde_json::from_slice(body).map_err(invalid)?),
            Operation::Embedding => Self::Embedding(serde_json::from_slice(body).map_err(invalid)?),
            Operation::Show => Self::Show(serde_json::from_slice(body).map_err(invalid)?),
        })
    }

    /// Encode the payload as JSON
    pub fn encode(&self) -> Result<Vec<u8>, LlmError> {
        match self {
            Self::Chat(r) => encode(r),
            Self::Generate(r) => encode(r),
            Self::Embed(r) => encode(r),
            Self::Embedding(r) => encode(r),
            Self::Show(r) => encode(r),
        }
    }

    /// Operation this request belongs to
    pub const fn operation(&self) -> Operation {
        match self {
            Self::Chat(_) => Operation::Chat,
            Self::Generate(_) => Operation::Generate,
            Self::Embed(_) => Operation::Embed,
            Self::Embedding(_) => Operation::Embedding,
            Self::Show(_) => Operation::Show,
        }
    }

    /// Requested model identifier
    pub fn model(&self) -> &str {
        match self {
            Self::Chat(r) => &r.model,
            Self::Generate(r) => &r.model,
            Self::Embed(r) => &r.model,
            Self::Embedding(r) => &r.model,
            Self::Show(r) => &r.model,
        }
    }

    /// Bind the request to `model`
    pub fn set_model(&mut self, model: impl Into<String>) {
        let model = model.into();
        match self {
            Self::Chat(r) => r.model = model,
            Self::Generate(r) => r.model = model,
            Self::Embed(r) => r.model = model,
            Self::Embedding(r) => r.model = model,
            Self::Show(r) => r.model = model,
        }
    }

    /// Force single-response delivery on request types that can stream
    pub fn disable_streaming(&mut self) {
        match self {
            Self::Chat(r) => r.stream = Some(false),
            Self::Generate(r) => r.stream = Some(false),
            Self::Embed(_) | Self::Embedding(_) | Self::Show(_) => {}
        }
    }

    /// Check request invariants before any backend call
    ///
    /// A blank model name is rejected for every operation; readiness would
    /// otherwise match it against any listed model.
    pub fn validate(&self) -> Result<(), LlmError> {
        if self.model().trim().is_empty() {
            return Err(LlmError::InvalidRequest("model must not be empty".to_owned()));
        }

        match self {
            Self::Chat(r) => r.validate(),
            _ => Ok(()),
        }
    }
}

/// Canonical response for one operation
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    /// Chat response
    Chat(ChatResponse),
    /// Completion response
    Generate(GenerateResponse),
    /// Batch embedding response
    Embed(EmbedResponse),
    /// Legacy embedding response
    Embedding(EmbeddingResponse),
    /// Model descriptor
    Show(ShowResponse),
}

impl ApiResponse {
    /// Decode `body` as the response type of `operation`
    pub fn decode(operation: Operation, body: &[u8]) -> Result<Self, serde_json::Error> {
        Ok(match operation {
            Operation::Chat => Self::Chat(serde_json::from_slice(body)?),
            Operation::Generate => Self::Generate(serde_json::from_slice(body)?),
            Operation::Embed => Self::Embed(serde_json::from_slice(body)?),
            Operation::Embedding => Self::Embedding(serde_json::from_slice(body)?),
            Operation::Show => Self::Show(serde_json::from_slice(body)?),
        })
    }

    /// Encode the payload as JSON
    pub fn encode(&self) -> Result<Vec<u8>, LlmError> {
        match self {
            Self::Chat(r) => encode(r),
            Self::Generate(r) => encode(r),
            Self::Embed(r) => encode(r),
            Self::Embedding(r) => encode(r),
            Self::Show(r) => encode(r),
        }
    }

    /// Operation this response belongs to
    pub const fn operation(&self) -> Operation {
        match self {
            Self::Chat(_) => Operation::Chat,
            Self::Generate(_) => Operation::Generate,
            Self::Embed(_) => Operation::Embed,
            Self::Embedding(_) => Operation::Embedding,
            Self::Show(_) => Operation::Show,
        }
    }
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, LlmError> {
    serde_json::to_vec(value).map_err(|e| LlmError::Encode(e.to_string()))
}
