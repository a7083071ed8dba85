#![allow(clippy::must_use_candidate)]

pub mod backends;
pub mod bus;
mod env;
mod loader;
pub mod service;
pub mod telemetry;

use serde::Deserialize;

pub use backends::*;
pub use bus::*;
pub use service::*;
pub use telemetry::TelemetryConfig;

/// Top-level Switchboard configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Message bus connection
    #[serde(default)]
    pub bus: BusConfig,
    /// Request handling
    #[serde(default)]
    pub service: ServiceConfig,
    /// Local Ollama backend
    #[serde(default)]
    pub ollama: Option<OllamaConfig>,
    /// Hosted Gemini backend
    #[serde(default)]
    pub gemini: Option<GeminiConfig>,
    /// Telemetry configuration
    #[serde(default)]
    pub telemetry: Option<TelemetryConfig>,
}
