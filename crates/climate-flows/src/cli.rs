use clap::{Parser, Subcommand};
use climate_types::config::DEFAULT_ARTIFACT_ROOT;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "climate-flow",
    version,
    about = "Runs the climate training and data refresh flows"
)]
pub(crate) struct Args {
    #[arg(long, default_value = DEFAULT_ARTIFACT_ROOT)]
    pub(crate) artifact_root: String,
    #[arg(long, default_value_t = false)]
    pub(crate) log_to_stderr: bool,
    #[command(subcommand)]
    pub(crate) command: FlowCommand,
}

#[derive(Subcommand, Debug)]
pub(crate) enum FlowCommand {
    /// Train the temperature, precipitation and extreme event models.
    Train {
        /// Region to analyze as `lat,lon,radius_km`.
        #[arg(long, default_value = "30.2672,-97.7431,50")]
        region: String,
        /// Years of historical data to use.
        #[arg(long, default_value_t = 30)]
        lookback_years: u32,
    },
    /// Fetch current observations and refresh predictions for monitored regions.
    Refresh {
        /// TOML file with `[[regions]]` entries; defaults to the built-in regions.
        #[arg(long)]
        regions: Option<PathBuf>,
        /// Repeat on this interval (e.g. `12h`) until interrupted.
        #[arg(long, value_parser = parse_interval)]
        every: Option<std::time::Duration>,
    },
}

fn parse_interval(raw: &str) -> Result<std::time::Duration, String> {
    let every = humantime::parse_duration(raw).map_err(|err| err.to_string())?;
    if every.is_zero() {
        return Err("refresh interval must be greater than zero".to_string());
    }
    Ok(every)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn refresh_interval_uses_humantime() {
        let args = Args::try_parse_from(["climate-flow", "refresh", "--every", "12h"]).expect("parse");
        match args.command {
            FlowCommand::Refresh { every, .. } => {
                assert_eq!(every, Some(Duration::from_secs(12 * 3600)));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn zero_refresh_interval_is_rejected() {
        assert!(Args::try_parse_from(["climate-flow", "refresh", "--every", "0s"]).is_err());
        assert!(parse_interval("soon").is_err());
    }
}
