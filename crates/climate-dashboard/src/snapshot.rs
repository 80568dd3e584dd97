use crate::client::{ApiClient, Fetched};
use climate_types::config::default_region_names;
use climate_types::{Alert, AlertsResponse, RegionImpact, StatusResponse};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ApiStatus {
    Connecting,
    Connected,
    UsingDefaults,
    Error(String),
}

impl ApiStatus {
    pub(crate) fn label(&self) -> String {
        match self {
            ApiStatus::Connecting => "Connecting...".to_string(),
            ApiStatus::Connected => "Connected".to_string(),
            ApiStatus::UsingDefaults => "Using defaults".to_string(),
            ApiStatus::Error(err) => format!("Error: {err}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PredictionsView {
    Loaded(RegionImpact),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum AlertsView {
    Loaded(Vec<Alert>),
    Failed(String),
}

/// Everything one refresh of the dashboard shows.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DashboardSnapshot {
    pub(crate) regions: Vec<String>,
    pub(crate) api_status: ApiStatus,
    pub(crate) region: String,
    pub(crate) predictions: PredictionsView,
    pub(crate) alerts: AlertsView,
    pub(crate) fetched_at: chrono::DateTime<chrono::Local>,
}

pub(crate) async fn fetch_snapshot(client: &ApiClient, preferred: Option<&str>) -> DashboardSnapshot {
    let (regions, api_status) = resolve_regions(client.status().await);
    let region = pick_region(&regions, preferred);
    let (predictions, alerts) = tokio::join!(client.predictions(&region), client.alerts());
    let snapshot = DashboardSnapshot {
        regions,
        api_status,
        predictions: predictions_view(predictions),
        alerts: alerts_view(alerts),
        region,
        fetched_at: chrono::Local::now(),
    };
    tracing::info!(
        region = %snapshot.region,
        api_status = %snapshot.api_status.label(),
        regions = snapshot.regions.len(),
        "dashboard refreshed"
    );
    snapshot
}

pub(crate) fn resolve_regions(
    status: anyhow::Result<Fetched<StatusResponse>>,
) -> (Vec<String>, ApiStatus) {
    match status {
        Ok(Fetched::Ok(status)) if !status.available_regions.is_empty() => {
            (status.available_regions, ApiStatus::Connected)
        }
        Ok(Fetched::Ok(_)) => (default_region_names(), ApiStatus::Connected),
        Ok(Fetched::Status(_)) => (default_region_names(), ApiStatus::UsingDefaults),
        Err(err) => {
            tracing::warn!(error = %format!("{err:#}"), "status request failed");
            (default_region_names(), ApiStatus::Error(err.to_string()))
        }
    }
}

/// Keeps the preferred region when the API still knows it, else the first one.
pub(crate) fn pick_region(regions: &[String], preferred: Option<&str>) -> String {
    preferred
        .and_then(|wanted| {
            regions
                .iter()
                .find(|region| region.eq_ignore_ascii_case(wanted))
        })
        .or_else(|| regions.first())
        .cloned()
        .unwrap_or_default()
}

fn predictions_view(result: anyhow::Result<Fetched<RegionImpact>>) -> PredictionsView {
    match result {
        Ok(Fetched::Ok(impact)) => PredictionsView::Loaded(impact),
        Ok(Fetched::Status(code)) => {
            PredictionsView::Failed(format!("Failed to fetch predictions: {code}"))
        }
        Err(err) => PredictionsView::Failed(format!("Error connecting to API: {err}")),
    }
}

fn alerts_view(result: anyhow::Result<Fetched<AlertsResponse>>) -> AlertsView {
    match result {
        Ok(Fetched::Ok(response)) => AlertsView::Loaded(response.alerts),
        Ok(Fetched::Status(_)) => AlertsView::Failed("Could not fetch alerts".to_string()),
        Err(err) => AlertsView::Failed(format!("Could not fetch alerts: {err}")),
    }
}

pub(crate) fn format_alert(alert: &Alert) -> String {
    format!(
        "{} in {} - {:.1}% probability",
        alert.event.as_str().to_uppercase(),
        alert.region,
        alert.probability * 100.0
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use climate_types::{ExtremeEvent, Severity};

    fn status_with(regions: &[&str]) -> StatusResponse {
        StatusResponse {
            status: "running".to_string(),
            models_loaded: true,
            predictions_loaded: true,
            training_run_id: None,
            refresh_run_id: None,
            last_updated: None,
            available_regions: regions.iter().map(|name| name.to_string()).collect(),
        }
    }

    #[test]
    fn connected_status_uses_api_regions() {
        let (regions, status) = resolve_regions(Ok(Fetched::Ok(status_with(&["Oslo"]))));
        assert_eq!(regions, vec!["Oslo"]);
        assert_eq!(status, ApiStatus::Connected);
    }

    #[test]
    fn empty_region_list_falls_back_to_defaults() {
        let (regions, status) = resolve_regions(Ok(Fetched::Ok(status_with(&[]))));
        assert_eq!(regions, default_region_names());
        assert_eq!(status, ApiStatus::Connected);
    }

    #[test]
    fn error_status_and_transport_errors_use_defaults() {
        let (regions, status) = resolve_regions(Ok(Fetched::Status(503)));
        assert_eq!(regions.len(), 4);
        assert_eq!(status.label(), "Using defaults");

        let (regions, status) = resolve_regions(Err(anyhow::anyhow!("connection refused")));
        assert_eq!(regions[0], "Austin, TX");
        assert_eq!(status.label(), "Error: connection refused");
    }

    #[test]
    fn picks_preferred_region_case_insensitively() {
        let regions = default_region_names();
        assert_eq!(pick_region(&regions, Some("miami, fl")), "Miami, FL");
        assert_eq!(pick_region(&regions, Some("Atlantis")), "Austin, TX");
        assert_eq!(pick_region(&regions, None), "Austin, TX");
        assert_eq!(pick_region(&[], Some("Austin, TX")), "");
    }

    #[test]
    fn failed_prediction_reports_status_code() {
        assert_eq!(
            predictions_view(Ok(Fetched::Status(404))),
            PredictionsView::Failed("Failed to fetch predictions: 404".to_string())
        );
        assert_eq!(
            alerts_view(Ok(Fetched::Status(500))),
            AlertsView::Failed("Could not fetch alerts".to_string())
        );
    }

    #[test]
    fn alert_line_matches_dashboard_wording() {
        let alert = Alert {
            event: ExtremeEvent::ColdSnap,
            region: "Seattle, WA".to_string(),
            probability: 0.3,
            severity: Severity::High,
            issued_at: "unknown".to_string(),
        };
        assert_eq!(format_alert(&alert), "COLD_SNAP in Seattle, WA - 30.0% probability");
    }

    #[test]
    fn region_impact_parses_api_payload() {
        let payload = serde_json::json!({
            "region_name": "Austin, TX",
            "current_temp": 25.5,
            "predicted_temp_change": {"1_year": 0.3, "5_year": 1.8, "10_year": 3.2},
            "precipitation_change": {"1_year": -2.0, "5_year": -8.5, "10_year": -15.0},
            "extreme_event_probabilities": {"heatwave": 0.15, "drought": 0.12, "flood": 0.08, "cold_snap": 0.05},
            "confidence_intervals": {
                "temperature": {"lower": -0.5, "upper": 0.8},
                "precipitation": {"lower": -3.0, "upper": -1.0}
            },
            "last_updated": "mock-data"
        });
        let impact: RegionImpact = serde_json::from_value(payload).expect("parse");
        assert_eq!(impact.precipitation_change.ten_year, -15.0);
    }
}
