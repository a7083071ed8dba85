//! Canonical types spoken on the bus
//!
//! These types are backend-agnostic and mirror the field names of the Ollama
//! JSON API, so independently built clients and services interoperate. Every
//! backend adapter converts to and from them.

pub mod chat;
pub mod embed;
pub mod envelope;
pub mod generate;
pub mod message;
pub mod show;
pub mod tool;

use serde::{Deserialize, Deserializer};

pub use chat::{ChatRequest, ChatResponse, Metrics};
pub use embed::{EmbedInput, EmbedRequest, EmbedResponse, EmbeddingRequest, EmbeddingResponse};
pub use envelope::{ApiRequest, ApiResponse, Operation};
pub use generate::{GenerateRequest, GenerateResponse};
pub use message::{ImageData, Message, Role, ToolCall, ToolCallFunction};
pub use show::{ModelDetails, ShowRequest, ShowResponse};
pub use tool::{PropertyType, Tool, ToolFunction, ToolFunctionParameters, ToolProperty};

/// Deserialize a field that peers may send as `null` instead of omitting it
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Timestamp used when a peer omits `created_at`
pub(crate) const fn unix_epoch() -> jiff::Timestamp {
    jiff::Timestamp::UNIX_EPOCH
}
