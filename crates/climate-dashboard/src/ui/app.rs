use crate::snapshot::{AlertsView, ApiStatus, DashboardSnapshot, PredictionsView};
use chrono::{DateTime, Local};
use ratatui::widgets::ListState;

pub(crate) enum UiEvent {
    FetchStarted,
    Snapshot(Box<DashboardSnapshot>),
}

pub(crate) struct AppState {
    pub(crate) api_url: String,
    pub(crate) regions: Vec<String>,
    pub(crate) selected: usize,
    pub(crate) list_state: ListState,
    pub(crate) api_status: ApiStatus,
    /// Region the predictions panel belongs to; may lag the selection while loading.
    pub(crate) shown_region: Option<String>,
    pub(crate) predictions: Option<PredictionsView>,
    pub(crate) alerts: Option<AlertsView>,
    pub(crate) fetched_at: Option<DateTime<Local>>,
    pub(crate) loading: bool,
    pub(crate) confirm_quit: bool,
    preferred: Option<String>,
}

impl AppState {
    pub(crate) fn new(api_url: impl Into<String>, preferred: Option<String>) -> Self {
        Self {
            api_url: api_url.into(),
            regions: Vec::new(),
            selected: 0,
            list_state: ListState::default(),
            api_status: ApiStatus::Connecting,
            shown_region: None,
            predictions: None,
            alerts: None,
            fetched_at: None,
            loading: true,
            confirm_quit: false,
            preferred,
        }
    }

    pub(crate) fn handle_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::FetchStarted => self.loading = true,
            UiEvent::Snapshot(snapshot) => self.apply_snapshot(*snapshot),
        }
    }

    fn apply_snapshot(&mut self, snapshot: DashboardSnapshot) {
        let wanted = self
            .selected_region()
            .map(str::to_string)
            .or_else(|| self.preferred.clone())
            .unwrap_or_else(|| snapshot.region.clone());
        self.regions = snapshot.regions;
        self.selected = self
            .regions
            .iter()
            .position(|region| region.eq_ignore_ascii_case(&wanted))
            .unwrap_or(0);
        self.api_status = snapshot.api_status;
        self.shown_region = Some(snapshot.region);
        self.predictions = Some(snapshot.predictions);
        self.alerts = Some(snapshot.alerts);
        self.fetched_at = Some(snapshot.fetched_at);
        self.loading = false;
        self.sync_selection();
    }

    pub(crate) fn selected_region(&self) -> Option<&str> {
        self.regions.get(self.selected).map(String::as_str)
    }

    /// Returns the newly selected region so the caller can fetch it.
    pub(crate) fn select_next(&mut self) -> Option<String> {
        if self.regions.is_empty() {
            return None;
        }
        self.selected = (self.selected + 1) % self.regions.len();
        self.sync_selection();
        self.selected_region().map(str::to_string)
    }

    pub(crate) fn select_prev(&mut self) -> Option<String> {
        if self.regions.is_empty() {
            return None;
        }
        if self.selected == 0 {
            self.selected = self.regions.len() - 1;
        } else {
            self.selected -= 1;
        }
        self.sync_selection();
        self.selected_region().map(str::to_string)
    }

    fn sync_selection(&mut self) {
        if self.regions.is_empty() {
            self.list_state.select(None);
        } else {
            self.list_state.select(Some(self.selected));
        }
    }
}
