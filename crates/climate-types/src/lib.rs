use serde::{Deserialize, Serialize};
use std::fmt;

pub mod artifacts;
pub mod config;

/// Change of a quantity at the three published prediction horizons.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct HorizonChange {
    #[serde(rename = "1_year")]
    pub one_year: f64,
    #[serde(rename = "5_year")]
    pub five_year: f64,
    #[serde(rename = "10_year")]
    pub ten_year: f64,
}

impl HorizonChange {
    pub const fn new(one_year: f64, five_year: f64, ten_year: f64) -> Self {
        Self {
            one_year,
            five_year,
            ten_year,
        }
    }

    /// Values paired with their display label, shortest horizon first.
    pub fn labelled(&self) -> [(&'static str, f64); 3] {
        [
            ("1 Year", self.one_year),
            ("5 Years", self.five_year),
            ("10 Years", self.ten_year),
        ]
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ExtremeEvent {
    Heatwave,
    Drought,
    Flood,
    ColdSnap,
}

impl ExtremeEvent {
    pub const ALL: [ExtremeEvent; 4] = [
        ExtremeEvent::Heatwave,
        ExtremeEvent::Drought,
        ExtremeEvent::Flood,
        ExtremeEvent::ColdSnap,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExtremeEvent::Heatwave => "heatwave",
            ExtremeEvent::Drought => "drought",
            ExtremeEvent::Flood => "flood",
            ExtremeEvent::ColdSnap => "cold_snap",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ExtremeEvent::Heatwave => "Heatwave",
            ExtremeEvent::Drought => "Drought",
            ExtremeEvent::Flood => "Flood",
            ExtremeEvent::ColdSnap => "Cold Snap",
        }
    }
}

impl fmt::Display for ExtremeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ExtremeEventProbabilities {
    pub heatwave: f64,
    pub drought: f64,
    pub flood: f64,
    pub cold_snap: f64,
}

impl ExtremeEventProbabilities {
    pub const fn new(heatwave: f64, drought: f64, flood: f64, cold_snap: f64) -> Self {
        Self {
            heatwave,
            drought,
            flood,
            cold_snap,
        }
    }

    pub fn get(&self, event: ExtremeEvent) -> f64 {
        match event {
            ExtremeEvent::Heatwave => self.heatwave,
            ExtremeEvent::Drought => self.drought,
            ExtremeEvent::Flood => self.flood,
            ExtremeEvent::ColdSnap => self.cold_snap,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (ExtremeEvent, f64)> + '_ {
        ExtremeEvent::ALL
            .into_iter()
            .map(move |event| (event, self.get(event)))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Interval {
    pub lower: f64,
    pub upper: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ConfidenceIntervals {
    pub temperature: Interval,
    pub precipitation: Interval,
}

/// Climate outlook for one region as served by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegionImpact {
    pub region_name: String,
    pub current_temp: f64,
    pub predicted_temp_change: HorizonChange,
    pub precipitation_change: HorizonChange,
    pub extreme_event_probabilities: ExtremeEventProbabilities,
    pub confidence_intervals: ConfidenceIntervals,
    pub last_updated: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn from_probability(probability: f64) -> Self {
        if probability > 0.25 {
            Severity::High
        } else if probability > 0.15 {
            Severity::Medium
        } else {
            Severity::Low
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Alert {
    #[serde(rename = "type")]
    pub event: ExtremeEvent,
    pub region: String,
    pub probability: f64,
    pub severity: Severity,
    pub issued_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlertsResponse {
    pub alerts: Vec<Alert>,
    pub count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

fn default_horizon_years() -> u32 {
    5
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredictionRequest {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default = "default_horizon_years")]
    pub horizon_years: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidRequest {
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for InvalidRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for InvalidRequest {}

impl PredictionRequest {
    pub fn validate(&self) -> Result<(), InvalidRequest> {
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(InvalidRequest {
                field: "latitude",
                message: format!("{} must be between -90 and 90", self.latitude),
            });
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(InvalidRequest {
                field: "longitude",
                message: format!("{} must be between -180 and 180", self.longitude),
            });
        }
        if !(1..=50).contains(&self.horizon_years) {
            return Err(InvalidRequest {
                field: "horizon_years",
                message: format!("{} must be between 1 and 50", self.horizon_years),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EndpointMap {
    pub predictions: String,
    pub custom_predict: String,
    pub map: String,
    pub dashboard: String,
    pub alerts: String,
    pub compare: String,
    pub status: String,
}

impl Default for EndpointMap {
    fn default() -> Self {
        Self {
            predictions: "/predictions/{region_name}".to_string(),
            custom_predict: "/predict".to_string(),
            map: "/map".to_string(),
            dashboard: "/dashboard/{region_name}".to_string(),
            alerts: "/alerts".to_string(),
            compare: "/compare".to_string(),
            status: "/status".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoadedRuns {
    pub training: Option<String>,
    pub refresh: Option<String>,
    pub last_updated: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RootInfo {
    pub message: String,
    pub documentation: String,
    pub endpoints: EndpointMap,
    pub loaded_runs: LoadedRuns,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusResponse {
    pub status: String,
    pub models_loaded: bool,
    pub predictions_loaded: bool,
    pub training_run_id: Option<String>,
    pub refresh_run_id: Option<String>,
    pub last_updated: Option<String>,
    #[serde(default)]
    pub available_regions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RefreshResponse {
    pub status: String,
    pub training_run_id: Option<String>,
    pub refresh_run_id: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Comparison {
    pub temperature_change_diff: f64,
    pub precipitation_change_diff: f64,
    pub higher_risk_region: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComparisonResponse {
    pub region1: String,
    pub region2: String,
    pub comparison: Comparison,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub detail: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_regions: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn horizon_change_uses_year_keys() {
        let value = serde_json::to_value(HorizonChange::new(0.3, 1.8, 3.2)).expect("serialize");
        assert_eq!(value["1_year"], 0.3);
        assert_eq!(value["5_year"], 1.8);
        assert_eq!(value["10_year"], 3.2);
    }

    #[test]
    fn severity_thresholds() {
        assert_eq!(Severity::from_probability(0.30), Severity::High);
        assert_eq!(Severity::from_probability(0.25), Severity::Medium);
        assert_eq!(Severity::from_probability(0.16), Severity::Medium);
        assert_eq!(Severity::from_probability(0.15), Severity::Low);
        assert_eq!(Severity::from_probability(0.0), Severity::Low);
    }

    #[test]
    fn alert_serializes_event_as_type() {
        let alert = Alert {
            event: ExtremeEvent::ColdSnap,
            region: "Seattle, WA".to_string(),
            probability: 0.3,
            severity: Severity::High,
            issued_at: "unknown".to_string(),
        };
        let value = serde_json::to_value(&alert).expect("serialize");
        assert_eq!(value["type"], "cold_snap");
        assert_eq!(value["severity"], "high");
    }

    #[test]
    fn alerts_response_omits_absent_fields() {
        let response = AlertsResponse {
            alerts: Vec::new(),
            count: 0,
            last_updated: None,
            message: Some("No anomaly data loaded yet".to_string()),
        };
        let value = serde_json::to_value(&response).expect("serialize");
        assert!(value.get("last_updated").is_none());
        assert_eq!(value["message"], "No anomaly data loaded yet");
    }

    #[test]
    fn prediction_request_defaults_horizon() {
        let request: PredictionRequest =
            serde_json::from_str(r#"{"latitude": 30.0, "longitude": -97.0}"#).expect("parse");
        assert_eq!(request.horizon_years, 5);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn prediction_request_rejects_out_of_range_fields() {
        let mut request = PredictionRequest {
            latitude: 91.0,
            longitude: 0.0,
            horizon_years: 5,
        };
        assert_eq!(request.validate().unwrap_err().field, "latitude");
        request.latitude = -90.0;
        request.longitude = 180.5;
        assert_eq!(request.validate().unwrap_err().field, "longitude");
        request.longitude = 180.0;
        request.horizon_years = 0;
        assert_eq!(request.validate().unwrap_err().field, "horizon_years");
        request.horizon_years = 50;
        assert!(request.validate().is_ok());
    }

    #[test]
    fn extreme_events_iterate_in_display_order() {
        let events = ExtremeEventProbabilities::new(0.15, 0.12, 0.08, 0.05);
        let labels: Vec<_> = events.iter().map(|(event, _)| event.label()).collect();
        assert_eq!(labels, vec!["Heatwave", "Drought", "Flood", "Cold Snap"]);
    }
}
