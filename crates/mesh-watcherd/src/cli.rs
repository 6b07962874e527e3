use std::path::PathBuf;

use clap::Parser;

/// Reconciles mesh dependencies from database change notifications.
#[derive(Debug, Parser)]
#[command(name = "mesh-watcherd", version)]
pub struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long, env = "MESHWATCH_CONFIG", default_value = "meshwatch.toml")]
    pub config: PathBuf,

    /// Load and validate the configuration, then exit.
    #[arg(long)]
    pub check: bool,
}
