use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use secrecy::SecretString;
use switchboard_config::{Config, GeminiConfig};
use url::Url;

/// Switchboard LLM proxy
#[derive(Debug, Parser)]
#[command(name = "switchboard", about = "Serve Ollama and Gemini behind NATS request/reply")]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, env = "SWITCHBOARD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the NATS server URL
    #[arg(long, env = "NATS_SERVER_URL", global = true)]
    pub nats_url: Option<String>,

    /// Override the Ollama base URL
    #[arg(long, env = "OLLAMA_URL", global = true)]
    pub ollama_url: Option<Url>,

    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", global = true, hide_env_values = true)]
    pub api_key: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve one or both backends on the bus
    Proxy {
        /// Backends to serve
        #[arg(value_enum)]
        target: ProxyTarget,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProxyTarget {
    Ollama,
    Gemini,
    All,
}

impl ProxyTarget {
    pub const fn ollama(self) -> bool {
        matches!(self, Self::Ollama | Self::All)
    }

    pub const fn gemini(self) -> bool {
        matches!(self, Self::Gemini | Self::All)
    }
}

impl Args {
    /// Fold command-line overrides into the file configuration
    pub fn apply(&self, config: &mut Config) {
        let Command::Proxy { target } = self.command;

        if let Some(ref url) = self.nats_url {
            config.bus.url.clone_from(url);
        }

        if target.ollama() || self.ollama_url.is_some() {
            let ollama = config.ollama.get_or_insert_default();
            if let Some(ref url) = self.ollama_url {
                ollama.base_url = Some(url.clone());
            }
        }

        if let Some(ref key) = self.api_key {
            let base_url = config.gemini.take().and_then(|g| g.base_url);
            config.gemini = Some(GeminiConfig {
                api_key: SecretString::from(key.clone()),
                base_url,
            });
        }
    }
}
