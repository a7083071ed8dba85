use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

/// Local Ollama server
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OllamaConfig {
    /// Base URL override (defaults to `http://127.0.0.1:11434`)
    #[serde(default)]
    pub base_url: Option<Url>,
}

/// Hosted Gemini API
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeminiConfig {
    /// API key sent with every call
    pub api_key: SecretString,
    /// Base URL override (defaults to the public v1beta endpoint)
    #[serde(default)]
    pub base_url: Option<Url>,
}
