//! calltrail CLI
//!
//! Emit records through a configured logger and inspect configuration

use calltrail_logging::{init, Profile};
use clap::{Parser, Subcommand};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "calltrail")]
#[command(about = "calltrail - Logging facade with caller context", long_about = None)]
struct Cli {
    /// Print the facade's own operational events
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Emit one record through a logger
    Log(commands::log::LogArgs),
    /// Print the effective logger configuration
    Config(commands::config::ConfigArgs),
}

fn main() {
    let cli = Cli::parse();

    init(if cli.verbose {
        Profile::Development
    } else {
        Profile::Production
    });

    let result = match cli.command {
        Commands::Log(args) => commands::log::execute(args),
        Commands::Config(args) => commands::config::execute(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
