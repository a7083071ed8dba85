#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod args;

use std::sync::Arc;

use anyhow::Context;
use args::{Args, Command, ProxyTarget};
use clap::Parser;
use switchboard_config::Config;
use switchboard_llm::{GeminiBackend, GeminiHttp, OllamaBackend, OllamaHttp, ProgressReporter, TracingProgress};
use switchboard_service::{Router, Service};
use tokio_util::sync::CancellationToken;
use url::Url;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match args.config {
        Some(ref path) => Config::load(path)?,
        None => Config::default(),
    };
    args.apply(&mut config);

    let _telemetry_guard = switchboard_telemetry::init(config.telemetry.as_ref())?;

    let Command::Proxy { target } = args.command;
    config.require_backends(target.ollama(), target.gemini())?;

    let router = build_router(&config, target)?;

    tracing::info!(bus = %config.bus.url, ?target, "starting switchboard");

    let client = async_nats::connect(config.bus.url.as_str())
        .await
        .with_context(|| format!("failed to connect to NATS at {}", config.bus.url))?;

    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();

    tokio::spawn(async move {
        shutdown_signal().await;
        signal.cancel();
    });

    Service::new(client, router).serve(shutdown).await?;

    tracing::info!("switchboard stopped");
    Ok(())
}

/// Router serving the backends `target` selects
fn build_router(config: &Config, target: ProxyTarget) -> anyhow::Result<Router> {
    let progress: Arc<dyn ProgressReporter> = Arc::new(TracingProgress);
    let mut router = Router::new(Some(config.service.request_timeout()?))
        .with_readiness_timeout(Some(config.service.readiness_timeout()?));

    if target.ollama()
        && let Some(ref ollama) = config.ollama
    {
        let base_url = match ollama.base_url {
            Some(ref url) => url.clone(),
            None => Url::parse(switchboard_llm::api::ollama::DEFAULT_BASE_URL)?,
        };
        tracing::info!(%base_url, "serving ollama");

        let http = Arc::new(OllamaHttp::new(base_url));
        router = router.with_backend(Arc::new(OllamaBackend::new(http, progress.clone())));
    }

    if target.gemini()
        && let Some(ref gemini) = config.gemini
    {
        let http = GeminiHttp::new(gemini.api_key.clone(), gemini.base_url.clone())
            .context("failed to build gemini client")?;
        tracing::info!("serving gemini");

        router = router.with_backend(Arc::new(GeminiBackend::new(Arc::new(http), progress)));
    }

    Ok(router)
}

/// Wait for a shutdown signal (`SIGINT` or `SIGTERM`)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }

    tracing::info!("shutdown signal received");
}
