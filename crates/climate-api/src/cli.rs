use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "climate-api", version, about = "Climate impact prediction API")]
pub(crate) struct Args {
    #[arg(long, default_value = climate_types::config::DEFAULT_API_ADDR)]
    pub(crate) listen_addr: String,
    #[arg(long)]
    pub(crate) config: Option<PathBuf>,
    /// Overrides `artifact_root` from the config file.
    #[arg(long)]
    pub(crate) artifact_root: Option<String>,
    #[arg(long, default_value_t = false)]
    pub(crate) log_to_stderr: bool,
}
