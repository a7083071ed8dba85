//! Model readiness for backends that need models loaded locally
//!
//! Before a call reaches such a backend, the requested model is looked up in
//! the local model list and pulled if absent. The check runs on every call;
//! nothing is cached. Concurrent calls for the same missing model share one
//! pull: later callers wait on a per-model lock and re-check once it is
//! released.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use switchboard_core::CallContext;
use tokio::sync::Mutex;

use crate::error::LlmError;
use crate::progress::ProgressReporter;

/// Local model inventory of a backend
#[async_trait]
pub trait ModelStore: Send + Sync {
    /// Identifiers of the models available locally
    async fn list_models(&self) -> Result<Vec<String>, LlmError>;

    /// Fetch `model`, reporting byte progress along the way
    async fn pull_model(&self, model: &str, progress: &dyn ProgressReporter) -> Result<(), LlmError>;
}

/// Readiness of one model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadinessState {
    /// Not yet checked
    Unknown,
    /// Listing local models
    Checking,
    /// Available locally
    Present,
    /// Not available locally
    Missing,
    /// Being pulled
    Fetching,
    /// Pull failed
    Failed,
}

impl fmt::Display for ReadinessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unknown => "unknown",
            Self::Checking => "checking",
            Self::Present => "present",
            Self::Missing => "missing",
            Self::Fetching => "fetching",
            Self::Failed => "failed",
        })
    }
}

/// Ensures models are present on a backend before use
pub struct ReadinessManager {
    store: Arc<dyn ModelStore>,
    progress: Arc<dyn ProgressReporter>,
    in_flight: DashMap<String, Arc<Mutex<()>>>,
}

impl ReadinessManager {
    /// Manager over `store`, reporting pulls to `progress`
    pub fn new(store: Arc<dyn ModelStore>, progress: Arc<dyn ProgressReporter>) -> Self {
        Self {
            store,
            progress,
            in_flight: DashMap::new(),
        }
    }

    /// Make sure `model` is available, pulling it if necessary
    ///
    /// Returns the terminal state, always [`ReadinessState::Present`] on
    /// success. Every blocking step races the deadline and cancellation in
    /// `ctx`. Failures are not retried.
    pub async fn ensure(&self, model: &str, ctx: &CallContext) -> Result<ReadinessState, LlmError> {
        let mut state = ReadinessState::Unknown;

        if self.check(model, ctx, &mut state).await? {
            return Ok(state);
        }

        let gate = self
            .in_flight
            .entry(model.to_owned())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        let result = self.fetch_once(model, ctx, gate, &mut state).await;

        self.in_flight
            .remove_if(model, |_, lock| Arc::strong_count(lock) == 1);

        result.map(|()| state)
    }

    async fn fetch_once(
        &self,
        model: &str,
        ctx: &CallContext,
        gate: Arc<Mutex<()>>,
        state: &mut ReadinessState,
    ) -> Result<(), LlmError> {
        let _guard = ctx.run(gate.lock_owned()).await?;

        // another caller may have pulled it while we waited
        if self.check(model, ctx, state).await? {
            return Ok(());
        }

        transition(model, state, ReadinessState::Fetching);
        self.progress.begin(&format!("pulling {model}"));
        let pulled = ctx.run(self.store.pull_model(model, self.progress.as_ref())).await;
        self.progress.finish();

        match pulled {
            Ok(Ok(())) => {
                transition(model, state, ReadinessState::Present);
                tracing::info!(model, "model pulled");
                Ok(())
            }
            Ok(Err(e)) => {
                transition(model, state, ReadinessState::Failed);
                tracing::warn!(model, error = %e, "model pull failed");
                Err(LlmError::provisioning(model, e))
            }
            Err(interrupted) => {
                transition(model, state, ReadinessState::Failed);
                Err(interrupted.into())
            }
        }
    }

    /// List local models; `true` if `model` is present
    async fn check(&self, model: &str, ctx: &CallContext, state: &mut ReadinessState) -> Result<bool, LlmError> {
        transition(model, state, ReadinessState::Checking);

        let listed = ctx
            .run(self.store.list_models())
            .await?
            .map_err(|e| LlmError::provisioning(model, e))?;

        let present = listed.iter().any(|name| name.starts_with(model));
        transition(
            model,
            state,
            if present { ReadinessState::Present } else { ReadinessState::Missing },
        );

        Ok(present)
    }
}

fn transition(model: &str, state: &mut ReadinessState, next: ReadinessState) {
    tracing::debug!(model, from = %state, to = %next, "readiness transition");
    *state = next;
}
