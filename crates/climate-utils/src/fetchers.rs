//! Fetchers for the external climate datasets used by the flows.
//!
//! None of the upstream services are contacted yet: every fetcher returns a
//! record with empty series, whatever the window, so downstream steps can be
//! wired against the final shape.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const DEFAULT_NOAA_RADIUS_KM: f64 = 50.0;
pub const DEFAULT_MODIS_PRODUCTS: [&str; 3] = ["LST", "NDVI", "Albedo"];
pub const DEFAULT_ERA5_VARIABLES: [&str; 4] = [
    "2m_temperature",
    "total_precipitation",
    "surface_pressure",
    "surface_solar_radiation",
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FetchWindow {
    pub latitude: f64,
    pub longitude: f64,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl FetchWindow {
    pub fn new(latitude: f64, longitude: f64, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            latitude,
            longitude,
            start,
            end,
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !(-90.0..=90.0).contains(&self.latitude) {
            anyhow::bail!("latitude {} out of range", self.latitude);
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            anyhow::bail!("longitude {} out of range", self.longitude);
        }
        if self.start > self.end {
            anyhow::bail!("start {} is after end {}", self.start, self.end);
        }
        Ok(())
    }
}

/// Weather station observations around a point.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NoaaObservations {
    pub temperature: Vec<f64>,
    pub precipitation: Vec<f64>,
    pub wind_speed: Vec<f64>,
    pub timestamps: Vec<String>,
    pub station_ids: Vec<String>,
}

/// Satellite composites for a point.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ModisComposite {
    pub land_surface_temp: Vec<f64>,
    pub ndvi: Vec<f64>,
    pub albedo: Vec<f64>,
    pub timestamps: Vec<String>,
    pub quality_flags: Vec<u16>,
}

/// Reanalysis series for a point.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Era5Reanalysis {
    pub temperature_2m: Vec<f64>,
    pub total_precipitation: Vec<f64>,
    pub surface_pressure: Vec<f64>,
    pub solar_radiation: Vec<f64>,
    pub timestamps: Vec<String>,
}

fn warn_invalid(source: &'static str, window: &FetchWindow) {
    if let Err(err) = window.validate() {
        tracing::warn!(source, error = %err, "fetch window is invalid");
    }
}

// TODO: query the NOAA Climate Data Online v2 stations and data endpoints.
pub fn fetch_noaa_data(window: &FetchWindow, radius_km: f64) -> NoaaObservations {
    warn_invalid("noaa", window);
    if radius_km <= 0.0 {
        tracing::warn!(source = "noaa", radius_km, "search radius is not positive");
    }
    tracing::debug!(
        source = "noaa",
        latitude = window.latitude,
        longitude = window.longitude,
        start = %window.start,
        end = %window.end,
        radius_km,
        "fetching station observations"
    );
    NoaaObservations::default()
}

pub fn fetch_modis_data(window: &FetchWindow, products: &[&str]) -> ModisComposite {
    warn_invalid("modis", window);
    let products = if products.is_empty() {
        &DEFAULT_MODIS_PRODUCTS[..]
    } else {
        products
    };
    tracing::debug!(
        source = "modis",
        latitude = window.latitude,
        longitude = window.longitude,
        products = ?products,
        "fetching satellite composites"
    );
    ModisComposite::default()
}

pub fn fetch_era5_data(window: &FetchWindow, variables: &[&str]) -> Era5Reanalysis {
    warn_invalid("era5", window);
    let variables = if variables.is_empty() {
        &DEFAULT_ERA5_VARIABLES[..]
    } else {
        variables
    };
    tracing::debug!(
        source = "era5",
        latitude = window.latitude,
        longitude = window.longitude,
        variables = ?variables,
        "fetching reanalysis series"
    );
    Era5Reanalysis::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn austin_2020() -> FetchWindow {
        FetchWindow::new(
            30.2672,
            -97.7431,
            NaiveDate::from_ymd_opt(2020, 1, 1).expect("date"),
            NaiveDate::from_ymd_opt(2020, 12, 31).expect("date"),
        )
    }

    fn keys(value: serde_json::Value) -> Vec<String> {
        value
            .as_object()
            .expect("object")
            .keys()
            .cloned()
            .collect()
    }

    #[test]
    fn noaa_result_has_documented_keys() {
        let result = fetch_noaa_data(&austin_2020(), DEFAULT_NOAA_RADIUS_KM);
        let keys = keys(serde_json::to_value(&result).expect("serialize"));
        for key in ["temperature", "precipitation", "wind_speed", "timestamps", "station_ids"] {
            assert!(keys.iter().any(|k| k == key), "missing {key}");
        }
    }

    #[test]
    fn modis_result_has_documented_keys() {
        let result = fetch_modis_data(&austin_2020(), &[]);
        let keys = keys(serde_json::to_value(&result).expect("serialize"));
        for key in ["land_surface_temp", "ndvi", "albedo", "timestamps", "quality_flags"] {
            assert!(keys.iter().any(|k| k == key), "missing {key}");
        }
    }

    #[test]
    fn era5_result_has_documented_keys_for_custom_variables() {
        let result = fetch_era5_data(&austin_2020(), &["2m_temperature"]);
        let keys = keys(serde_json::to_value(&result).expect("serialize"));
        for key in [
            "temperature_2m",
            "total_precipitation",
            "surface_pressure",
            "solar_radiation",
            "timestamps",
        ] {
            assert!(keys.iter().any(|k| k == key), "missing {key}");
        }
    }

    #[test]
    fn window_validation_flags_bad_input() {
        assert!(austin_2020().validate().is_ok());
        let mut window = austin_2020();
        std::mem::swap(&mut window.start, &mut window.end);
        assert!(window.validate().is_err());
        window = austin_2020();
        window.longitude = 200.0;
        assert!(window.validate().is_err());
    }

    #[test]
    fn invalid_input_still_yields_every_key() {
        let window = FetchWindow::new(
            120.0,
            -97.7,
            NaiveDate::from_ymd_opt(2020, 12, 31).expect("date"),
            NaiveDate::from_ymd_opt(2020, 1, 1).expect("date"),
        );
        let noaa = keys(serde_json::to_value(fetch_noaa_data(&window, 0.0)).expect("serialize"));
        assert_eq!(noaa.len(), 5);
        assert!(noaa.iter().any(|k| k == "station_ids"));
        let modis = keys(serde_json::to_value(fetch_modis_data(&window, &[])).expect("serialize"));
        assert_eq!(modis.len(), 5);
        assert!(modis.iter().any(|k| k == "quality_flags"));
        let era5 = keys(serde_json::to_value(fetch_era5_data(&window, &["bogus"])).expect("serialize"));
        assert_eq!(era5.len(), 5);
        assert!(era5.iter().any(|k| k == "solar_radiation"));
    }
}
