mod cli;
mod client;
mod logging;
mod plain;
mod snapshot;
mod ui;
mod worker;

use crate::cli::Args;
use crate::client::ApiClient;
use crate::logging::init_tracing;
use crate::plain::render_report;
use crate::snapshot::fetch_snapshot;
use crate::ui::terminal::DashboardTerminal;
use crate::ui::{draw_ui, handle_key_event, restore_terminal, setup_terminal, AppState, UiEvent};
use crate::worker::{spawn_fetch_worker, FetchCommand};
use clap::Parser;
use crossterm::event::{self, Event};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let _file_guard = init_tracing(&args.log_dir, args.log_to_stderr)?;
    let client = ApiClient::new(&args.api_url)?;
    info!(
        api_url = %client.base_url(),
        refresh_every = %humantime::format_duration(args.refresh_every),
        plain = args.plain,
        "dashboard starting"
    );

    if args.plain {
        let snapshot = fetch_snapshot(&client, args.region.as_deref()).await;
        print!("{}", render_report(&snapshot));
        return Ok(());
    }

    let (ui_tx, mut ui_rx) = mpsc::channel::<UiEvent>(32);
    let (cmd_tx, cmd_rx) = mpsc::channel::<FetchCommand>(32);
    let shutdown = CancellationToken::new();
    let worker = spawn_fetch_worker(
        client,
        args.region.clone(),
        args.refresh_every,
        cmd_rx,
        ui_tx,
        shutdown.clone(),
    );

    let mut terminal = setup_terminal()?;
    let mut app = AppState::new(args.api_url.clone(), args.region.clone());
    let result = run_ui(&mut terminal, &mut app, &mut ui_rx, &cmd_tx);
    restore_terminal(&mut terminal)?;

    drop(ui_rx);
    shutdown.cancel();
    let _ = worker.await;
    info!("dashboard stopped");
    result
}

fn run_ui(
    terminal: &mut DashboardTerminal,
    app: &mut AppState,
    ui_rx: &mut mpsc::Receiver<UiEvent>,
    cmd_tx: &mpsc::Sender<FetchCommand>,
) -> anyhow::Result<()> {
    let tick_rate = Duration::from_millis(100);
    loop {
        while let Ok(event) = ui_rx.try_recv() {
            app.handle_event(event);
        }

        terminal.draw(|frame| draw_ui(frame, app))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                if handle_key_event(key, app, cmd_tx) {
                    return Ok(());
                }
            }
        }
    }
}
