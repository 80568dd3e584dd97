mod cli;
mod refresh;
mod runner;
mod training;

use crate::cli::{Args, FlowCommand};
use crate::refresh::{load_regions, run_refresh, run_refresh_schedule};
use crate::training::{run_training, TrainingParams};
use anyhow::Context;
use clap::Parser;
use climate_store::RunStore;
use climate_utils::path::expand_tilde;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.log_to_stderr)?;

    let artifact_root = expand_tilde(&args.artifact_root);
    let store = RunStore::open(&artifact_root)
        .with_context(|| format!("failed to open run store {}", artifact_root.display()))?;
    info!(artifact_root = %artifact_root.display(), "run store ready");

    match args.command {
        FlowCommand::Train {
            region,
            lookback_years,
        } => {
            let params = TrainingParams {
                region,
                lookback_years,
            };
            let record = run_training(&store, params).await?;
            info!(run_id = %record.run_id, "training run stored");
        }
        FlowCommand::Refresh { regions, every } => {
            let regions = load_regions(regions.as_deref())?;
            match every {
                Some(every) => {
                    let shutdown = CancellationToken::new();
                    tokio::spawn(wait_for_shutdown(shutdown.clone()));
                    info!(every = %humantime::format_duration(every), "refresh schedule started");
                    run_refresh_schedule(&store, regions, every, shutdown).await;
                }
                None => {
                    let record = run_refresh(&store, regions).await?;
                    info!(run_id = %record.run_id, "refresh run stored");
                }
            }
        }
    }
    Ok(())
}

fn init_tracing(log_to_stderr: bool) -> anyhow::Result<()> {
    let builder = tracing_subscriber::fmt().with_env_filter(
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
    );
    if log_to_stderr {
        builder.with_writer(std::io::stderr).init();
    } else {
        builder.init();
    }
    Ok(())
}

async fn wait_for_shutdown(shutdown: CancellationToken) {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown signal received");
    shutdown.cancel();
}
