//! Records produced by the training and refresh flows and read back by the API.

use crate::{ExtremeEvent, ExtremeEventProbabilities, HorizonChange};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegionSpec {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

impl RegionSpec {
    pub fn new(name: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            name: name.into(),
            lat,
            lon,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RegionForecast {
    pub temperature: HorizonChange,
    pub precipitation: HorizonChange,
    pub extreme_events: ExtremeEventProbabilities,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Anomaly {
    #[serde(rename = "type")]
    pub event: ExtremeEvent,
    pub probability: f64,
    pub region: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    Temperature,
    Precipitation,
    ExtremeEvents,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModelDescriptor {
    pub model_type: String,
    pub status: String,
}

impl ModelDescriptor {
    pub fn trained(model_type: impl Into<String>) -> Self {
        Self {
            model_type: model_type.into(),
            status: "trained".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ModelMetrics {
    Regression {
        mae: f64,
        rmse: f64,
        r2: f64,
    },
    Classification {
        accuracy: f64,
        precision: f64,
        recall: f64,
        f1: f64,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrainingArtifacts {
    pub lat: f64,
    pub lon: f64,
    pub radius_km: f64,
    pub lookback_years: u32,
    pub models: BTreeMap<ModelKind, ModelDescriptor>,
    pub metrics: BTreeMap<ModelKind, ModelMetrics>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RefreshArtifacts {
    pub fetch_timestamp: DateTime<Utc>,
    pub all_predictions: BTreeMap<String, RegionForecast>,
    #[serde(default)]
    pub all_anomalies: Vec<Anomaly>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_deserialize_by_shape() {
        let regression: ModelMetrics =
            serde_json::from_str(r#"{"mae": 0.85, "rmse": 1.12, "r2": 0.94}"#).expect("parse");
        assert!(matches!(regression, ModelMetrics::Regression { .. }));
        let classification: ModelMetrics = serde_json::from_str(
            r#"{"accuracy": 0.92, "precision": 0.89, "recall": 0.91, "f1": 0.9}"#,
        )
        .expect("parse");
        assert!(matches!(classification, ModelMetrics::Classification { .. }));
    }

    #[test]
    fn training_artifacts_key_models_by_kind() {
        let artifacts = TrainingArtifacts {
            lat: 30.2672,
            lon: -97.7431,
            radius_km: 50.0,
            lookback_years: 30,
            models: BTreeMap::from([(
                ModelKind::ExtremeEvents,
                ModelDescriptor::trained("xgboost"),
            )]),
            metrics: BTreeMap::new(),
        };
        let value = serde_json::to_value(&artifacts).expect("serialize");
        assert_eq!(value["models"]["extreme_events"]["model_type"], "xgboost");
        assert_eq!(value["models"]["extreme_events"]["status"], "trained");
    }
}
