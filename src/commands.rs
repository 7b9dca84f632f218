//! CLI command definitions
//!
//! Defines the clap commands for the harness CLI.

use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Run a single test case
    Run {
        /// Case name; names the result directory and the log file
        case_name: String,

        /// Shell command to execute
        #[arg(long)]
        cmd: Option<String>,

        /// Project the case belongs to
        #[arg(long, default_value = "harness")]
        project: String,

        /// Result directory (default: <results dir>/<case_name>)
        #[arg(long)]
        res_dir: Option<PathBuf>,

        /// Echo captured output to stdout
        #[arg(long)]
        console: bool,

        /// Kill the command after this many seconds
        #[arg(long)]
        max_duration: Option<String>,

        /// Test case kind (see 'harness kinds')
        #[arg(long, default_value = "bash")]
        kind: String,

        /// Print the result record as JSON
        #[arg(long, conflicts_with = "console")]
        json: bool,
    },

    /// Run every case of a YAML suite file in order
    Suite {
        /// Path to the suite file
        path: PathBuf,

        /// Write all result records to <results dir>/results.json
        #[arg(long)]
        report: bool,
    },

    /// Score a JSON list of step results
    #[command(name = "parse-results")]
    ParseResults {
        /// Path to the JSON file
        path: PathBuf,
    },

    /// List available test case kinds
    Kinds,
}
