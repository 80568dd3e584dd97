use crate::runner::{finish_run, run_step};
use anyhow::Context;
use chrono::{DateTime, Utc};
use climate_store::{RunRecord, RunStore};
use climate_types::artifacts::{Anomaly, RefreshArtifacts, RegionForecast, RegionSpec};
use climate_types::config::{default_regions, REFRESH_FLOW};
use climate_types::{ExtremeEvent, ExtremeEventProbabilities, HorizonChange};
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

const FLOW: &str = REFRESH_FLOW;
pub(crate) const HEATWAVE_ALERT_THRESHOLD: f64 = 0.20;
const MIN_SCHEDULE_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Deserialize)]
struct RegionsFile {
    regions: Vec<RegionSpec>,
}

pub(crate) fn load_regions(path: Option<&Path>) -> anyhow::Result<Vec<RegionSpec>> {
    let Some(path) = path else {
        return Ok(default_regions());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read regions {}", path.display()))?;
    let file: RegionsFile = toml::from_str(&raw)
        .with_context(|| format!("failed to parse regions {}", path.display()))?;
    validate_regions(&file.regions)?;
    Ok(file.regions)
}

fn validate_regions(regions: &[RegionSpec]) -> anyhow::Result<()> {
    if regions.is_empty() {
        anyhow::bail!("regions file must include at least one region");
    }
    let mut seen = HashSet::new();
    for region in regions {
        if region.name.trim().is_empty() {
            anyhow::bail!("region name cannot be empty");
        }
        if !seen.insert(region.name.as_str()) {
            anyhow::bail!("duplicate region name: {}", region.name);
        }
        if !(-90.0..=90.0).contains(&region.lat) || !(-180.0..=180.0).contains(&region.lon) {
            anyhow::bail!("region {} coordinates out of range", region.name);
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct CurrentObservations {
    pub(crate) temperature: f64,
    pub(crate) precipitation: f64,
    pub(crate) wind_speed: f64,
    pub(crate) land_surface_temp: f64,
    pub(crate) ndvi: f64,
    pub(crate) surface_pressure: f64,
    pub(crate) solar_radiation: f64,
}

struct RegionOutcome {
    index: usize,
    region: RegionSpec,
    forecast: RegionForecast,
    anomalies: Vec<Anomaly>,
}

// TODO: pull live readings through climate_utils::fetchers once they hit real endpoints.
fn fetch_current_observations(region: &RegionSpec) -> CurrentObservations {
    tracing::info!(flow = FLOW, step = "fetch_current_observations", region = %region.name, "fetching data for region");
    CurrentObservations {
        temperature: 25.5,
        precipitation: 0.0,
        wind_speed: 12.3,
        land_surface_temp: 28.2,
        ndvi: 0.65,
        surface_pressure: 1013.2,
        solar_radiation: 450.0,
    }
}

pub(crate) fn process_observations(
    region: &RegionSpec,
    observations: &CurrentObservations,
) -> (RegionForecast, Vec<Anomaly>) {
    tracing::info!(
        flow = FLOW,
        step = "process_observations",
        region = %region.name,
        temperature = observations.temperature,
        precipitation = observations.precipitation,
        wind_speed = observations.wind_speed,
        land_surface_temp = observations.land_surface_temp,
        ndvi = observations.ndvi,
        surface_pressure = observations.surface_pressure,
        solar_radiation = observations.solar_radiation,
        "generating predictions for region"
    );
    let forecast = RegionForecast {
        temperature: HorizonChange::new(26.2, 27.8, 29.1),
        precipitation: HorizonChange::new(850.0, 820.0, 790.0),
        extreme_events: ExtremeEventProbabilities::new(0.15, 0.12, 0.08, 0.05),
    };
    let anomalies = detect_anomalies(&region.name, &forecast);
    (forecast, anomalies)
}

pub(crate) fn detect_anomalies(region: &str, forecast: &RegionForecast) -> Vec<Anomaly> {
    let heatwave = forecast.extreme_events.heatwave;
    if heatwave > HEATWAVE_ALERT_THRESHOLD {
        vec![Anomaly {
            event: ExtremeEvent::Heatwave,
            probability: heatwave,
            region: region.to_string(),
        }]
    } else {
        Vec::new()
    }
}

pub(crate) async fn run_refresh(
    store: &RunStore,
    regions: Vec<RegionSpec>,
) -> anyhow::Result<RunRecord> {
    let parameters = BTreeMap::from([(
        "regions".to_string(),
        regions
            .iter()
            .map(|region| region.name.as_str())
            .collect::<Vec<_>>()
            .join("; "),
    )]);
    let run = store.start_run(FLOW, parameters)?;
    let run_id = run.run_id().to_string();
    let result = refresh(regions)
        .await
        .and_then(|artifacts| {
            update_feature_store(&artifacts);
            run.save_artifacts(&artifacts)?;
            Ok(artifacts)
        })
        .map(|artifacts| check_alerts(&artifacts.all_anomalies));
    let record = finish_run(FLOW, run, result)?;
    tracing::info!(flow = FLOW, step = "end", run_id = %run_id, "data refresh complete");
    Ok(record)
}

async fn refresh(regions: Vec<RegionSpec>) -> anyhow::Result<RefreshArtifacts> {
    let fetch_timestamp = Utc::now();
    tracing::info!(flow = FLOW, step = "start", regions = regions.len(), "data refresh triggered");

    let mut tasks = JoinSet::new();
    for (index, region) in regions.into_iter().enumerate() {
        tasks.spawn(run_step(FLOW, "process_region", move || {
            let observations = fetch_current_observations(&region);
            let (forecast, anomalies) = process_observations(&region, &observations);
            Ok(RegionOutcome {
                index,
                region,
                forecast,
                anomalies,
            })
        }));
    }
    let mut outcomes = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        outcomes.push(joined.context("region task did not complete")??);
    }
    Ok(join_regions(fetch_timestamp, outcomes))
}

fn join_regions(fetch_timestamp: DateTime<Utc>, mut outcomes: Vec<RegionOutcome>) -> RefreshArtifacts {
    outcomes.sort_by_key(|outcome| outcome.index);
    let mut all_predictions = BTreeMap::new();
    let mut all_anomalies = Vec::new();
    for outcome in outcomes {
        all_predictions.insert(outcome.region.name, outcome.forecast);
        all_anomalies.extend(outcome.anomalies);
    }
    tracing::info!(
        flow = FLOW,
        step = "join_regions",
        regions = all_predictions.len(),
        anomalies = all_anomalies.len(),
        "aggregated predictions"
    );
    RefreshArtifacts {
        fetch_timestamp,
        all_predictions,
        all_anomalies,
    }
}

fn update_feature_store(artifacts: &RefreshArtifacts) {
    tracing::info!(
        flow = FLOW,
        step = "update_feature_store",
        regions = artifacts.all_predictions.len(),
        timestamp = %artifacts.fetch_timestamp.to_rfc3339(),
        "storing predictions"
    );
}

fn check_alerts(anomalies: &[Anomaly]) {
    if anomalies.is_empty() {
        tracing::info!(flow = FLOW, step = "check_alerts", "no significant anomalies detected");
        return;
    }
    tracing::warn!(flow = FLOW, step = "check_alerts", count = anomalies.len(), "climate alerts found");
    for anomaly in anomalies {
        tracing::warn!(
            flow = FLOW,
            step = "check_alerts",
            "{} in {}: {:.2}% probability",
            anomaly.event,
            anomaly.region,
            anomaly.probability * 100.0
        );
    }
}

/// Repeats the refresh flow on `every` until `shutdown` fires.
pub(crate) async fn run_refresh_schedule(
    store: &RunStore,
    regions: Vec<RegionSpec>,
    every: Duration,
    shutdown: CancellationToken,
) {
    let every = every.max(MIN_SCHEDULE_INTERVAL);
    let mut interval = tokio::time::interval(every);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            _ = interval.tick() => {
                if let Err(err) = run_refresh(store, regions.clone()).await {
                    tracing::warn!(flow = FLOW, error = %err, "scheduled refresh failed");
                }
                tracing::info!(
                    flow = FLOW,
                    next_in = %humantime::format_duration(every),
                    "next refresh scheduled"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use climate_store::RunStatus;

    #[test]
    fn heatwave_anomaly_requires_probability_above_threshold() {
        let mut forecast = RegionForecast {
            temperature: HorizonChange::new(0.0, 0.0, 0.0),
            precipitation: HorizonChange::new(0.0, 0.0, 0.0),
            extreme_events: ExtremeEventProbabilities::new(0.20, 0.0, 0.0, 0.0),
        };
        assert!(detect_anomalies("Austin, TX", &forecast).is_empty());
        forecast.extreme_events.heatwave = 0.21;
        let anomalies = detect_anomalies("Austin, TX", &forecast);
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].event, ExtremeEvent::Heatwave);
        assert_eq!(anomalies[0].region, "Austin, TX");
    }

    #[test]
    fn stub_forecast_raises_no_anomaly() {
        let region = RegionSpec::new("Miami, FL", 25.7617, -80.1918);
        let observations = fetch_current_observations(&region);
        let (forecast, anomalies) = process_observations(&region, &observations);
        assert_eq!(forecast.temperature, HorizonChange::new(26.2, 27.8, 29.1));
        assert!(anomalies.is_empty());
    }

    #[test]
    fn regions_default_when_no_file() {
        let regions = load_regions(None).expect("regions");
        assert_eq!(regions.len(), 4);
        assert_eq!(regions[0].name, "Austin, TX");
    }

    #[test]
    fn regions_file_is_validated() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let path = dir.path().join("regions.toml");
        std::fs::write(
            &path,
            r#"
[[regions]]
name = "Denver, CO"
lat = 39.7392
lon = -104.9903
"#,
        )
        .expect("write");
        let regions = load_regions(Some(path.as_path())).expect("regions");
        assert_eq!(regions, vec![RegionSpec::new("Denver, CO", 39.7392, -104.9903)]);

        std::fs::write(
            &path,
            r#"
[[regions]]
name = "Denver, CO"
lat = 39.7
lon = -104.9

[[regions]]
name = "Denver, CO"
lat = 39.7
lon = -104.9
"#,
        )
        .expect("write");
        let err = load_regions(Some(path.as_path())).unwrap_err().to_string();
        assert!(err.contains("duplicate region name"));

        std::fs::write(&path, "regions = []").expect("write");
        assert!(load_regions(Some(path.as_path())).is_err());
    }

    #[tokio::test]
    async fn refresh_run_persists_predictions_for_every_region() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let store = RunStore::open(dir.path()).expect("store");
        let record = run_refresh(&store, default_regions()).await.expect("run");
        assert_eq!(record.status, RunStatus::Succeeded);

        let artifacts: RefreshArtifacts = store
            .load_artifacts(REFRESH_FLOW, &record.run_id)
            .expect("artifacts");
        let names: Vec<_> = artifacts.all_predictions.keys().cloned().collect();
        assert_eq!(
            names,
            vec!["Austin, TX", "Miami, FL", "Phoenix, AZ", "Seattle, WA"]
        );
        assert!(artifacts.all_anomalies.is_empty());
        assert_eq!(
            artifacts.all_predictions["Phoenix, AZ"].extreme_events.heatwave,
            0.15
        );
    }

    #[tokio::test]
    async fn schedule_stops_when_cancelled() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let store = RunStore::open(dir.path()).expect("store");
        let shutdown = CancellationToken::new();
        shutdown.cancel();
        run_refresh_schedule(
            &store,
            default_regions(),
            Duration::from_secs(3600),
            shutdown,
        )
        .await;
        assert!(store.list_runs(REFRESH_FLOW).expect("list").is_empty());
    }

    #[tokio::test]
    async fn zero_interval_schedule_is_clamped() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let store = RunStore::open(dir.path()).expect("store");
        let shutdown = CancellationToken::new();
        shutdown.cancel();
        run_refresh_schedule(&store, default_regions(), Duration::ZERO, shutdown).await;
        assert!(store.list_runs(REFRESH_FLOW).expect("list").is_empty());
    }
}
