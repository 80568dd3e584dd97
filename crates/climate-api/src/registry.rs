use anyhow::Context;
use chrono::{DateTime, Utc};
use climate_store::RunStore;
use climate_types::artifacts::{
    Anomaly, ModelDescriptor, ModelKind, ModelMetrics, RefreshArtifacts, RegionForecast,
    TrainingArtifacts,
};
use climate_types::config::{REFRESH_FLOW, TRAINING_FLOW};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{error, info, warn};

/// Artifacts of the latest successful training and refresh runs.
#[derive(Debug, Clone, Default)]
pub(crate) struct ModelRegistry {
    pub(crate) models: Option<BTreeMap<ModelKind, ModelDescriptor>>,
    pub(crate) metrics: Option<BTreeMap<ModelKind, ModelMetrics>>,
    pub(crate) training_run_id: Option<String>,
    pub(crate) predictions: Option<BTreeMap<String, RegionForecast>>,
    pub(crate) anomalies: Option<Vec<Anomaly>>,
    pub(crate) refresh_run_id: Option<String>,
    pub(crate) last_updated: Option<DateTime<Utc>>,
}

impl ModelRegistry {
    /// Never fails: store errors leave the registry serving mock data.
    pub(crate) fn load_latest_artifacts(&mut self, store: &RunStore) {
        if let Err(err) = self.try_load(store) {
            error!(error = %format!("{err:#}"), "error loading artifacts");
            warn!("run store unavailable - API will serve mock data");
        }
    }

    fn try_load(&mut self, store: &RunStore) -> anyhow::Result<()> {
        info!(flow = TRAINING_FLOW, "loading latest run");
        match store.latest_successful_run(TRAINING_FLOW)? {
            Some(run) => {
                let artifacts: TrainingArtifacts = store
                    .load_artifacts(TRAINING_FLOW, &run.run_id)
                    .with_context(|| format!("failed to load training run {}", run.run_id))?;
                self.apply_training(run.run_id, artifacts);
                info!(run_id = ?self.training_run_id, "loaded models from training run");
            }
            None => warn!(flow = TRAINING_FLOW, "no successful runs found"),
        }

        info!(flow = REFRESH_FLOW, "loading latest run");
        match store.latest_successful_run(REFRESH_FLOW)? {
            Some(run) => {
                let artifacts: RefreshArtifacts = store
                    .load_artifacts(REFRESH_FLOW, &run.run_id)
                    .with_context(|| format!("failed to load refresh run {}", run.run_id))?;
                self.apply_refresh(run.run_id, artifacts);
                info!(run_id = ?self.refresh_run_id, "loaded predictions from refresh run");
            }
            None => warn!(flow = REFRESH_FLOW, "no successful runs found"),
        }
        Ok(())
    }

    pub(crate) fn apply_training(&mut self, run_id: String, artifacts: TrainingArtifacts) {
        self.models = Some(artifacts.models);
        self.metrics = Some(artifacts.metrics);
        self.training_run_id = Some(run_id);
    }

    pub(crate) fn apply_refresh(&mut self, run_id: String, artifacts: RefreshArtifacts) {
        self.predictions = Some(artifacts.all_predictions);
        self.anomalies = Some(artifacts.all_anomalies);
        self.last_updated = Some(artifacts.fetch_timestamp);
        self.refresh_run_id = Some(run_id);
    }

    pub(crate) fn is_ready(&self) -> bool {
        self.models.is_some() && self.predictions.is_some()
    }

    pub(crate) fn last_updated_label(&self) -> Option<String> {
        self.last_updated.map(|ts| ts.to_rfc3339())
    }

    pub(crate) fn available_regions(&self) -> Vec<String> {
        self.predictions
            .as_ref()
            .map(|predictions| predictions.keys().cloned().collect())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RegionNotFound {
    pub(crate) requested: String,
    pub(crate) available: Vec<String>,
}

impl fmt::Display for RegionNotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let quoted: Vec<String> = self
            .available
            .iter()
            .map(|name| format!("'{name}'"))
            .collect();
        write!(
            f,
            "Region '{}' not found. Available regions: [{}]",
            self.requested,
            quoted.join(", ")
        )
    }
}

impl std::error::Error for RegionNotFound {}

/// Exact key first, then the first case-insensitive match.
pub(crate) fn resolve_region<'a>(
    predictions: &'a BTreeMap<String, RegionForecast>,
    requested: &str,
) -> Result<(&'a str, &'a RegionForecast), RegionNotFound> {
    if let Some((name, forecast)) = predictions.get_key_value(requested) {
        return Ok((name.as_str(), forecast));
    }
    let lowered = requested.to_lowercase();
    predictions
        .iter()
        .find(|(name, _)| name.to_lowercase() == lowered)
        .map(|(name, forecast)| (name.as_str(), forecast))
        .ok_or_else(|| RegionNotFound {
            requested: requested.to_string(),
            available: predictions.keys().cloned().collect(),
        })
}
