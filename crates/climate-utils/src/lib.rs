pub mod features;
pub mod fetchers;
pub mod models;
pub mod path;

pub use features::{create_precipitation_features, create_temperature_features};
pub use fetchers::{fetch_era5_data, fetch_modis_data, fetch_noaa_data, FetchWindow};
pub use models::{evaluate_model, load_model, save_model};
