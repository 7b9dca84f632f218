//! CLI command handling
//!
//! Dispatches CLI commands and formats output. Every handler returns the
//! process exit code.

use crate::commands::Commands;
use crate::common::config::Config;
use crate::common::{paths, Result};
use crate::exec::{load_results, registry, Params, TestCase};
use crate::suite;

/// Dispatch a CLI command
pub async fn dispatch(command: Commands, config: &Config) -> Result<i32> {
    match command {
        Commands::Run {
            case_name,
            cmd,
            project,
            res_dir,
            console,
            max_duration,
            kind,
            json,
        } => {
            let res_dir =
                res_dir.unwrap_or_else(|| paths::case_res_dir(&config.results_dir(), &case_name));
            let case = TestCase::new(project, case_name).with_res_dir(res_dir);
            let mut feature = registry::create(&kind, case, &config.timeouts)
                .ok_or_else(|| registry::unknown_kind(&kind))?;

            let mut params = Params::new().with("console", console);
            if let Some(cmd) = cmd {
                params.insert("cmd", cmd);
            }
            if let Some(max_duration) = max_duration {
                params.insert("max_duration", max_duration);
            }

            let status = feature.run(&params).await;
            let record = feature.case().record();

            if json {
                println!("{}", serde_json::to_string_pretty(&record)?);
            } else {
                println!(
                    "{} {} ({}) result={}",
                    record.case_name, status, record.duration, record.result
                );
            }

            Ok(status.code())
        }

        Commands::Suite { path, report } => {
            let report = suite::run_suite(&path, config, report).await?;
            Ok(if report.passed() { 0 } else { 1 })
        }

        Commands::ParseResults { path } => {
            let summary = load_results(&path)?;
            println!("result: {}", summary.result);
            println!("{}", serde_json::to_string_pretty(&summary.details())?);
            Ok(0)
        }

        Commands::Kinds => {
            for kind in registry::all_kinds() {
                println!("{:<10} {}", kind.id, kind.description);
            }
            Ok(0)
        }
    }
}
