use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const ROLLING_WINDOW: usize = 7;
const MONTH_DAYS: usize = 30;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TemperatureFeatures {
    pub rolling_mean_7d: Vec<f64>,
    pub rolling_std_7d: Vec<f64>,
    pub seasonal_decomposition: BTreeMap<String, Vec<f64>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PrecipitationFeatures {
    pub cumulative_monthly: Vec<f64>,
    pub dry_spell_length: Vec<usize>,
    pub intensity: Vec<f64>,
}

/// Trailing 7-day statistics over daily temperatures.
pub fn create_temperature_features(daily: &[f64]) -> TemperatureFeatures {
    let mut features = TemperatureFeatures::default();
    for window in daily.windows(ROLLING_WINDOW) {
        let mean = window.iter().sum::<f64>() / ROLLING_WINDOW as f64;
        let variance =
            window.iter().map(|value| (value - mean).powi(2)).sum::<f64>() / ROLLING_WINDOW as f64;
        features.rolling_mean_7d.push(mean);
        features.rolling_std_7d.push(variance.sqrt());
    }
    features
}

pub fn create_precipitation_features(daily: &[f64]) -> PrecipitationFeatures {
    let cumulative_monthly = daily
        .chunks(MONTH_DAYS)
        .map(|month| month.iter().sum())
        .collect();

    let mut dry_spell_length = Vec::new();
    let mut run = 0usize;
    for value in daily {
        if *value <= 0.0 {
            run += 1;
        } else if run > 0 {
            dry_spell_length.push(run);
            run = 0;
        }
    }
    if run > 0 {
        dry_spell_length.push(run);
    }

    let intensity = daily.iter().copied().filter(|value| *value > 0.0).collect();

    PrecipitationFeatures {
        cumulative_monthly,
        dry_spell_length,
        intensity,
    }
}
