use crate::snapshot::{format_alert, AlertsView, DashboardSnapshot, PredictionsView};
use climate_types::{HorizonChange, Severity};
use std::fmt::Write;

pub(crate) fn render_report(snapshot: &DashboardSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Climate Change Impact Predictor");
    let _ = writeln!(out, "API status: {}", snapshot.api_status.label());
    let _ = writeln!(out, "Regions: {}", snapshot.regions.join(", "));
    let _ = writeln!(out);

    match &snapshot.predictions {
        PredictionsView::Loaded(impact) => {
            let _ = writeln!(out, "Region: {}", impact.region_name);
            write_horizons(
                &mut out,
                "Temperature Change (°C)",
                &impact.predicted_temp_change,
            );
            write_horizons(
                &mut out,
                "Precipitation Change (mm)",
                &impact.precipitation_change,
            );
            let _ = writeln!(out, "Extreme Event Probabilities");
            for (event, probability) in impact.extreme_event_probabilities.iter() {
                let _ = writeln!(out, "  {:<10} {:>5.1}%", event.label(), probability * 100.0);
            }
            let _ = writeln!(out, "Last updated: {}", impact.last_updated);
        }
        PredictionsView::Failed(message) => {
            let _ = writeln!(out, "Region: {}", snapshot.region);
            let _ = writeln!(out, "{message}");
        }
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "Active Climate Alerts");
    match &snapshot.alerts {
        AlertsView::Loaded(alerts) if alerts.is_empty() => {
            let _ = writeln!(out, "  No active climate alerts");
        }
        AlertsView::Loaded(alerts) => {
            for alert in alerts {
                let marker = if alert.severity == Severity::High { "[HIGH]" } else { "[WARN]" };
                let _ = writeln!(out, "  {marker} {}", format_alert(alert));
            }
        }
        AlertsView::Failed(message) => {
            let _ = writeln!(out, "  {message}");
        }
    }
    out
}

fn write_horizons(out: &mut String, title: &str, change: &HorizonChange) {
    let _ = writeln!(out, "{title}");
    for (label, value) in change.labelled() {
        let _ = writeln!(out, "  {label:<8} {value:>+7.1}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::ApiStatus;
    use climate_types::config::default_region_names;
    use climate_types::{
        Alert, ConfidenceIntervals, ExtremeEvent, ExtremeEventProbabilities, Interval,
        RegionImpact,
    };

    fn snapshot(predictions: PredictionsView, alerts: AlertsView) -> DashboardSnapshot {
        DashboardSnapshot {
            regions: default_region_names(),
            api_status: ApiStatus::Connected,
            region: "Miami, FL".to_string(),
            predictions,
            alerts,
            fetched_at: chrono::Local::now(),
        }
    }

    #[test]
    fn report_lists_horizons_events_and_alerts() {
        let impact = RegionImpact {
            region_name: "Miami, FL".to_string(),
            current_temp: 25.5,
            predicted_temp_change: HorizonChange::new(0.3, 1.8, 3.2),
            precipitation_change: HorizonChange::new(-2.0, -8.5, -15.0),
            extreme_event_probabilities: ExtremeEventProbabilities::new(0.15, 0.12, 0.08, 0.05),
            confidence_intervals: ConfidenceIntervals {
                temperature: Interval {
                    lower: -0.5,
                    upper: 0.8,
                },
                precipitation: Interval {
                    lower: -3.0,
                    upper: -1.0,
                },
            },
            last_updated: "mock-data".to_string(),
        };
        let alert = Alert {
            event: ExtremeEvent::Flood,
            region: "Miami, FL".to_string(),
            probability: 0.18,
            severity: Severity::Medium,
            issued_at: "unknown".to_string(),
        };
        let report = render_report(&snapshot(
            PredictionsView::Loaded(impact),
            AlertsView::Loaded(vec![alert]),
        ));
        assert!(report.contains("API status: Connected"));
        assert!(report.contains("  10 Years    +3.2"));
        assert!(report.contains("  5 Years     -8.5"));
        assert!(report.contains("  Cold Snap    5.0%"));
        assert!(report.contains("[WARN] FLOOD in Miami, FL - 18.0% probability"));
    }

    #[test]
    fn report_shows_failures() {
        let report = render_report(&snapshot(
            PredictionsView::Failed("Failed to fetch predictions: 500".to_string()),
            AlertsView::Loaded(Vec::new()),
        ));
        assert!(report.contains("Region: Miami, FL\nFailed to fetch predictions: 500"));
        assert!(report.contains("No active climate alerts"));
    }
}
