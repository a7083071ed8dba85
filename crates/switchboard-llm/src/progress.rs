/// Observer for long-running phases of a call
///
/// Called from the readiness step while a model is fetched and around each
/// backend call. Implementations must not block; reporting never affects the
/// outcome of a call.
pub trait ProgressReporter: Send + Sync {
    /// A phase started
    fn begin(&self, title: &str);

    /// Byte-level progress for `model`
    fn update(&self, model: &str, status: &str, completed: u64, total: u64);

    /// The current phase ended
    fn finish(&self);
}

/// Reporter that writes progress to the `tracing` log
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingProgress;

impl ProgressReporter for TracingProgress {
    fn begin(&self, title: &str) {
        tracing::debug!(phase = title, "phase started");
    }

    fn update(&self, model: &str, status: &str, completed: u64, total: u64) {
        let percent = if total == 0 {
            0.0
        } else {
            #[allow(clippy::cast_precision_loss)]
            let ratio = completed as f64 / total as f64;
            ratio * 100.0
        };
        tracing::info!(model, status, completed, total, percent = %format!("{percent:.1}"), "pull progress");
    }

    fn finish(&self) {
        tracing::debug!("phase finished");
    }
}
