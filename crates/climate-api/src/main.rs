mod cli;
mod config;
mod cors;
mod error;
mod mock;
mod pages;
mod registry;
mod routes;

use crate::cli::Args;
use crate::config::load_api_config;
use crate::cors::CorsPolicy;
use crate::routes::{router, AppState};
use anyhow::Context;
use axum::body::Body;
use axum::http::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use clap::Parser;
use climate_store::RunStore;
use climate_utils::path::expand_tilde;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.log_to_stderr)?;

    info!(
        listen_addr = %args.listen_addr,
        config = ?args.config,
        "climate api starting"
    );
    let config = load_api_config(args.config.as_deref())?;
    let artifact_root = args
        .artifact_root
        .as_deref()
        .map(expand_tilde)
        .unwrap_or_else(|| expand_tilde(&config.artifact_root));
    let store = RunStore::open(&artifact_root)
        .with_context(|| format!("failed to open run store {}", artifact_root.display()))?;
    let state = AppState::new(store);
    state.reload().await?;
    {
        let registry = state.registry.read().await;
        if registry.is_ready() {
            info!(
                training_run_id = ?registry.training_run_id,
                refresh_run_id = ?registry.refresh_run_id,
                models = registry.models.as_ref().map_or(0, |models| models.len()),
                metrics = registry.metrics.as_ref().map_or(0, |metrics| metrics.len()),
                regions = registry.available_regions().len(),
                "loaded artifacts"
            );
        } else {
            warn!("artifacts not loaded - serving mock data");
        }
    }

    let cors = CorsPolicy::new(&config.cors.allow_origins);
    let app = router(state, cors).layer(middleware::from_fn(log_http_request));

    let shutdown = CancellationToken::new();
    let listener = TcpListener::bind(&args.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", args.listen_addr))?;
    info!(addr = %args.listen_addr, "climate api listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown(shutdown.clone()))
        .await?;
    info!("climate api shutting down");
    shutdown.cancel();
    Ok(())
}

async fn log_http_request(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let response = next.run(req).await;
    let status = response.status();
    tracing::info!(
        method = %method,
        uri = %uri,
        status = %status,
        "http request"
    );
    response
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
