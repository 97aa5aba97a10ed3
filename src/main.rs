//! Main entry point for tabrecon CLI

use clap::Parser;
use tabrecon::cli::Cli;
use tabrecon::commands::{execute_command, GlobalOptions};

fn main() {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging; --verbose raises the level to Debug
    env_logger::Builder::from_default_env()
        .filter_level(cli.log_level())
        .init();

    let options = GlobalOptions {
        config: cli.config,
        no_progress: cli.no_progress,
    };

    // Execute the command
    if let Err(e) = execute_command(cli.command, &options) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
