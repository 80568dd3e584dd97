use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(
    name = "climate-dashboard",
    version,
    about = "Terminal dashboard for climate impact predictions"
)]
pub(crate) struct Args {
    #[arg(long, default_value = climate_types::config::DEFAULT_API_URL)]
    pub(crate) api_url: String,
    #[arg(long, default_value = "30s", value_parser = humantime::parse_duration)]
    pub(crate) refresh_every: Duration,
    /// Print one text report and exit instead of starting the TUI.
    #[arg(long)]
    pub(crate) plain: bool,
    #[arg(long)]
    pub(crate) region: Option<String>,
    #[arg(long, default_value = "logs")]
    pub(crate) log_dir: PathBuf,
    #[arg(long, default_value_t = false)]
    pub(crate) log_to_stderr: bool,
}
