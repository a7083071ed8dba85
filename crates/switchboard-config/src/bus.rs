use serde::Deserialize;

/// NATS connection settings
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BusConfig {
    /// Server URL, e.g. `nats://127.0.0.1:4222`
    #[serde(default = "default_url")]
    pub url: String,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self { url: default_url() }
    }
}

fn default_url() -> String {
    "nats://127.0.0.1:4222".to_string()
}
