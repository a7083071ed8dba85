use std::time::Duration;

use serde::Deserialize;

/// Request handling settings
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Budget for each backend call, as a duration string (`"7m"`, `"90s"`)
    #[serde(default = "default_request_timeout")]
    pub request_timeout: String,
    /// Budget for making a model ready (listing plus any pull)
    #[serde(default = "default_readiness_timeout")]
    pub readiness_timeout: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            request_timeout: default_request_timeout(),
            readiness_timeout: default_readiness_timeout(),
        }
    }
}

impl ServiceConfig {
    /// Parsed backend call budget
    ///
    /// # Errors
    ///
    /// Returns an error if `request_timeout` is not a valid duration
    pub fn request_timeout(&self) -> anyhow::Result<Duration> {
        duration_str::parse(&self.request_timeout)
            .map_err(|e| anyhow::anyhow!("invalid service.request_timeout '{}': {e}", self.request_timeout))
    }

    /// Parsed readiness budget
    ///
    /// # Errors
    ///
    /// Returns an error if `readiness_timeout` is not a valid duration
    pub fn readiness_timeout(&self) -> anyhow::Result<Duration> {
        duration_str::parse(&self.readiness_timeout)
            .map_err(|e| anyhow::anyhow!("invalid service.readiness_timeout '{}': {e}", self.readiness_timeout))
    }
}

fn default_request_timeout() -> String {
    "7m".to_string()
}

fn default_readiness_timeout() -> String {
    "30m".to_string()
}
