use crate::client::ApiClient;
use crate::snapshot::fetch_snapshot;
use crate::ui::UiEvent;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum FetchCommand {
    Select(String),
    Refresh,
}

/// Fetches on start, on every command and on each `refresh_every` tick.
pub(crate) fn spawn_fetch_worker(
    client: ApiClient,
    initial_region: Option<String>,
    refresh_every: Duration,
    mut cmd_rx: mpsc::Receiver<FetchCommand>,
    ui_tx: mpsc::Sender<UiEvent>,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut region = initial_region;
        let mut ticker = tokio::time::interval(refresh_every.max(Duration::from_secs(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                command = cmd_rx.recv() => match command {
                    Some(FetchCommand::Select(selected)) => region = Some(selected),
                    Some(FetchCommand::Refresh) => {}
                    None => break,
                },
                _ = ticker.tick() => {}
            }
            if ui_tx.send(UiEvent::FetchStarted).await.is_err() {
                break;
            }
            let snapshot = tokio::select! {
                _ = shutdown.cancelled() => break,
                snapshot = fetch_snapshot(&client, region.as_deref()) => snapshot,
            };
            if !snapshot.region.is_empty() {
                region = Some(snapshot.region.clone());
            }
            if ui_tx.send(UiEvent::Snapshot(Box::new(snapshot))).await.is_err() {
                break;
            }
        }
        tracing::debug!("fetch worker stopped");
    })
}
