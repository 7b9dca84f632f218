//! Test case harness
//!
//! Runs shell commands as scored test cases, bounded by a deadline, and
//! reports the results.

use clap::Parser;
use harness::cli;
use harness::commands::Commands;
use harness::common::config::Config;
use harness::common::logging;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "harness", about = "Bounded test case execution harness")]
#[command(version, long_about = None)]
struct Cli {
    /// Enable debug logging (including captured output)
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Also log to <results dir>/harness.log
    #[arg(long, global = true)]
    log_file: bool,

    /// Configuration file (default: platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    // Initialize logging
    let guard = if cli.log_file {
        logging::init_with_file(&config.results_dir(), cli.verbose)
    } else {
        logging::init_cli(cli.verbose);
        None
    };

    let code = match cli::dispatch(cli.command, &config).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            1
        }
    };

    // Flush the file writer before exiting
    drop(guard);
    std::process::exit(code);
}
