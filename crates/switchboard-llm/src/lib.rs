//! Protocol adapter layer for Switchboard
//!
//! Provides the canonical chat schema spoken on the bus, translation to and
//! from the Ollama and Gemini native APIs, and the readiness step that pulls
//! missing Ollama models before a call proceeds.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod api;
pub mod convert;
pub mod error;
pub mod progress;
pub mod protocol;
pub mod provider;
pub mod readiness;
pub mod schema;
pub mod sniff;
pub mod types;

pub use api::{gemini::GeminiHttp, ollama::OllamaHttp};
pub use error::LlmError;
pub use progress::{ProgressReporter, TracingProgress};
pub use provider::{Backend, gemini::GeminiBackend, ollama::OllamaBackend};
pub use readiness::{ModelStore, ReadinessManager, ReadinessState};
pub use types::{ApiRequest, ApiResponse, ChatRequest, ChatResponse, Message, Operation, Role};
