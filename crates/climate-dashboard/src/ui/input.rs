use crate::worker::FetchCommand;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use tokio::sync::mpsc;

use super::app::AppState;

/// Returns true when the dashboard should exit.
pub(crate) fn handle_key_event(
    key: KeyEvent,
    app: &mut AppState,
    cmd_tx: &mpsc::Sender<FetchCommand>,
) -> bool {
    if key.kind == KeyEventKind::Release {
        return false;
    }
    if app.confirm_quit {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => return true,
            KeyCode::Esc => {
                app.confirm_quit = false;
                return false;
            }
            _ => {
                app.confirm_quit = false;
            }
        }
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') => app.confirm_quit = true,
        KeyCode::Down | KeyCode::Char('j') => {
            if let Some(region) = app.select_next() {
                request(app, cmd_tx, FetchCommand::Select(region));
            }
        }
        KeyCode::Up | KeyCode::Char('k') => {
            if let Some(region) = app.select_prev() {
                request(app, cmd_tx, FetchCommand::Select(region));
            }
        }
        KeyCode::Char('r') | KeyCode::Char('R') => request(app, cmd_tx, FetchCommand::Refresh),
        _ => {}
    }
    false
}

fn request(app: &mut AppState, cmd_tx: &mpsc::Sender<FetchCommand>, command: FetchCommand) {
    match cmd_tx.try_send(command) {
        Ok(()) => app.loading = true,
        Err(err) => tracing::warn!(error = %err, "fetch request dropped"),
    }
}
