use climate_types::artifacts::RegionForecast;
use climate_types::{
    ConfidenceIntervals, ExtremeEventProbabilities, HorizonChange, Interval, PredictionRequest,
    RegionImpact,
};

const OBSERVED_TEMP_C: f64 = 25.5;
const MOCK_LAST_UPDATED: &str = "mock-data";
const CUSTOM_LAST_UPDATED: &str = "2024-12-15T10:00:00Z";

const REGION_INTERVALS: ConfidenceIntervals = ConfidenceIntervals {
    temperature: Interval {
        lower: -0.5,
        upper: 0.8,
    },
    precipitation: Interval {
        lower: -3.0,
        upper: -1.0,
    },
};

pub(crate) const COMPARISON_TEMPERATURE_DIFF: f64 = 0.5;
pub(crate) const COMPARISON_PRECIPITATION_DIFF: f64 = -3.0;

/// Record served for a named region when no refresh run is loaded.
pub(crate) fn mock_region_impact(region_name: &str) -> RegionImpact {
    RegionImpact {
        region_name: region_name.to_string(),
        current_temp: OBSERVED_TEMP_C,
        predicted_temp_change: HorizonChange::new(0.3, 1.8, 3.2),
        precipitation_change: HorizonChange::new(-2.0, -8.5, -15.0),
        extreme_event_probabilities: ExtremeEventProbabilities::new(0.15, 0.12, 0.08, 0.05),
        confidence_intervals: REGION_INTERVALS,
        last_updated: MOCK_LAST_UPDATED.to_string(),
    }
}

pub(crate) fn forecast_impact(
    region_name: &str,
    forecast: &RegionForecast,
    last_updated: Option<String>,
) -> RegionImpact {
    RegionImpact {
        region_name: region_name.to_string(),
        current_temp: OBSERVED_TEMP_C,
        predicted_temp_change: forecast.temperature,
        precipitation_change: forecast.precipitation,
        extreme_event_probabilities: forecast.extreme_events,
        confidence_intervals: REGION_INTERVALS,
        last_updated: last_updated.unwrap_or_else(|| "unknown".to_string()),
    }
}

/// Fixed outlook for an arbitrary coordinate. `request` must already be validated.
pub(crate) fn custom_location_impact(request: &PredictionRequest) -> RegionImpact {
    RegionImpact {
        region_name: format!("Custom ({:?}, {:?})", request.latitude, request.longitude),
        current_temp: 22.0,
        predicted_temp_change: HorizonChange::new(0.2, 1.5, 2.8),
        precipitation_change: HorizonChange::new(-1.0, -5.0, -10.0),
        extreme_event_probabilities: ExtremeEventProbabilities::new(0.10, 0.08, 0.06, 0.04),
        confidence_intervals: ConfidenceIntervals {
            temperature: Interval {
                lower: -0.3,
                upper: 0.5,
            },
            precipitation: Interval {
                lower: -2.0,
                upper: -0.5,
            },
        },
        last_updated: CUSTOM_LAST_UPDATED.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_name_keeps_decimal_point() {
        let request = PredictionRequest {
            latitude: 30.0,
            longitude: -97.7431,
            horizon_years: 5,
        };
        let impact = custom_location_impact(&request);
        assert_eq!(impact.region_name, "Custom (30.0, -97.7431)");
        assert_eq!(impact.last_updated, CUSTOM_LAST_UPDATED);
    }

    #[test]
    fn forecast_without_timestamp_is_unknown() {
        let forecast = RegionForecast {
            temperature: HorizonChange::new(0.1, 0.2, 0.3),
            precipitation: HorizonChange::new(1.0, 2.0, 3.0),
            extreme_events: ExtremeEventProbabilities::new(0.1, 0.1, 0.1, 0.1),
        };
        let impact = forecast_impact("Austin, TX", &forecast, None);
        assert_eq!(impact.last_updated, "unknown");
        assert_eq!(impact.predicted_temp_change.ten_year, 0.3);
        assert_eq!(impact.confidence_intervals, REGION_INTERVALS);
    }
}
