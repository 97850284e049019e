//! Config command
//!
//! Usage: calltrail config [--config <FILE>]

use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// TOML configuration file (default: built-in defaults)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Execute config command
pub fn execute(args: ConfigArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(args.config.as_deref())?;
    print!("{}", config.to_toml_string()?);
    Ok(())
}
