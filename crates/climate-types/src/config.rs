use crate::artifacts::RegionSpec;

pub const TRAINING_FLOW: &str = "ClimateTrainingFlow";
pub const REFRESH_FLOW: &str = "ClimateDataRefreshFlow";

pub const DEFAULT_API_ADDR: &str = "0.0.0.0:8000";
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_ARTIFACT_ROOT: &str = "~/.climate-impact/runs";

/// Regions monitored when no explicit list is configured.
pub fn default_regions() -> Vec<RegionSpec> {
    vec![
        RegionSpec::new("Austin, TX", 30.2672, -97.7431),
        RegionSpec::new("Miami, FL", 25.7617, -80.1918),
        RegionSpec::new("Phoenix, AZ", 33.4484, -112.0740),
        RegionSpec::new("Seattle, WA", 47.6062, -122.3321),
    ]
}

pub fn default_region_names() -> Vec<String> {
    default_regions()
        .into_iter()
        .map(|region| region.name)
        .collect()
}
