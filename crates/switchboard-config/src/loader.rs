use std::path::Path;

use secrecy::ExposeSecret;

use crate::Config;

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, environment variable
    /// expansion fails, TOML parsing fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        Self::parse(&raw)
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if expansion, parsing, or validation fails
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let expanded =
            crate::env::expand_env(raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// Backend presence is checked separately by [`Config::require_backends`]
    /// because command-line overrides may still add one.
    ///
    /// # Errors
    ///
    /// Returns an error if a section holds an unusable value
    pub fn validate(&self) -> anyhow::Result<()> {
        self.service.request_timeout()?;
        self.service.readiness_timeout()?;
        self.validate_gemini()?;
        self.validate_telemetry()?;
        Ok(())
    }

    /// Ensure the backends a proxy mode needs are configured
    ///
    /// # Errors
    ///
    /// Returns an error naming the first missing backend, or when neither
    /// backend is wanted
    pub fn require_backends(&self, ollama: bool, gemini: bool) -> anyhow::Result<()> {
        if !ollama && !gemini {
            anyhow::bail!("at least one backend must be served");
        }

        if ollama && self.ollama.is_none() {
            anyhow::bail!("the ollama backend is not configured");
        }

        if gemini && self.gemini.is_none() {
            anyhow::bail!("the gemini backend is not configured (set gemini.api_key or --api-key)");
        }

        self.validate_gemini()
    }

    fn validate_gemini(&self) -> anyhow::Result<()> {
        if let Some(ref gemini) = self.gemini
            && gemini.api_key.expose_secret().trim().is_empty()
        {
            anyhow::bail!("gemini.api_key must not be empty");
        }

        Ok(())
    }

    fn validate_telemetry(&self) -> anyhow::Result<()> {
        if let Some(ref telemetry) = self.telemetry
            && let Some(ref tracing) = telemetry.tracing
            && !(0.0..=1.0).contains(&tracing.sampling_rate)
        {
            anyhow::bail!("telemetry.tracing.sampling_rate must be between 0.0 and 1.0");
        }

        Ok(())
    }
}
