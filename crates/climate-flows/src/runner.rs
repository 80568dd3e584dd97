use anyhow::Context;
use climate_store::{RunHandle, RunRecord, RunStatus};
use std::time::Instant;

/// Runs one flow step on the blocking pool so sibling branches proceed concurrently.
pub(crate) async fn run_step<T, F>(
    flow: &'static str,
    step: &'static str,
    work: F,
) -> anyhow::Result<T>
where
    F: FnOnce() -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tracing::info!(flow, step, "step started");
    let started = Instant::now();
    let result = tokio::task::spawn_blocking(work)
        .await
        .with_context(|| format!("step {step} did not complete"))?;
    let elapsed_ms = started.elapsed().as_millis() as u64;
    match &result {
        Ok(_) => tracing::info!(flow, step, elapsed_ms, "step finished"),
        Err(err) => tracing::warn!(flow, step, elapsed_ms, error = %err, "step failed"),
    }
    result.with_context(|| format!("step {step} failed"))
}

pub(crate) fn finish_run(
    flow: &str,
    run: RunHandle,
    result: anyhow::Result<()>,
) -> anyhow::Result<RunRecord> {
    match result {
        Ok(()) => run.finish(RunStatus::Succeeded),
        Err(err) => {
            let run_id = run.run_id().to_string();
            if let Err(finish_err) = run.finish(RunStatus::Failed) {
                tracing::warn!(flow, run_id = %run_id, error = %finish_err, "failed to mark run as failed");
            }
            tracing::error!(flow, run_id = %run_id, error = %err, "run failed");
            Err(err.context(format!("{flow} run {run_id} failed")))
        }
    }
}
