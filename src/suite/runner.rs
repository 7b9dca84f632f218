//! Suite runner implementation
//!
//! Runs the cases of a suite one after the other and prints a summary.

use colored::Colorize;
use std::path::{Path, PathBuf};

use crate::common::config::Config;
use crate::common::{paths, Error, Result};
use crate::exec::{registry, ExitStatus, ResultRecord, TestCase};

use super::config::Suite;

/// File written next to the case directories when a report is requested
pub const REPORT_FILE_NAME: &str = "results.json";

/// Outcome of one case in a suite
#[derive(Debug)]
pub struct CaseOutcome {
    pub status: ExitStatus,
    pub record: ResultRecord,
}

/// Result of a suite run
#[derive(Debug)]
pub struct SuiteReport {
    pub project_name: String,
    pub results_dir: PathBuf,
    pub outcomes: Vec<CaseOutcome>,
    /// Names of disabled cases
    pub skipped: Vec<String>,
}

impl SuiteReport {
    /// True when every executed case returned `OK`
    pub fn passed(&self) -> bool {
        self.outcomes.iter().all(|o| o.status.is_ok())
    }

    pub fn records(&self) -> Vec<&ResultRecord> {
        self.outcomes.iter().map(|o| &o.record).collect()
    }
}

/// Load a suite from a YAML file
pub fn load_suite(path: &Path) -> Result<Suite> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!(
            "Failed to read suite '{}': {}",
            path.display(),
            e
        ))
    })?;

    serde_yaml::from_str(&content)
        .map_err(|e| Error::Config(format!("Failed to parse suite: {}", e)))
}

/// Run a suite from a YAML file
pub async fn run_suite(path: &Path, config: &Config, write_report: bool) -> Result<SuiteReport> {
    let suite = load_suite(path)?;

    // Reject unknown kinds before anything runs
    if let Some(case) = suite
        .cases
        .iter()
        .find(|c| !registry::all_kinds().iter().any(|k| k.id == c.kind))
    {
        return Err(registry::unknown_kind(&case.kind));
    }

    let suite_dir = path.parent().unwrap_or(Path::new("."));
    let results_dir = match &suite.results_dir {
        Some(dir) if dir.is_relative() => suite_dir.join(dir),
        Some(dir) => dir.clone(),
        None => config.results_dir(),
    };

    println!(
        "\n{} {}",
        "Running Suite:".blue().bold(),
        suite.project_name.white().bold()
    );
    if let Some(desc) = &suite.description {
        println!("  {}", desc.dimmed());
    }
    println!();

    let mut outcomes = Vec::new();
    let mut skipped = Vec::new();

    for case_config in &suite.cases {
        if !case_config.enabled {
            println!("  {} {}", "-".yellow(), case_config.case_name.dimmed());
            skipped.push(case_config.case_name.clone());
            continue;
        }

        let case = TestCase::new(&suite.project_name, &case_config.case_name)
            .with_res_dir(paths::case_res_dir(&results_dir, &case_config.case_name));
        let mut feature = registry::create(&case_config.kind, case, &config.timeouts)
            .ok_or_else(|| registry::unknown_kind(&case_config.kind))?;

        let status = feature.run(&case_config.args).await;
        let record = feature.case().record();

        let mark = if status.is_ok() {
            "PASS".green().bold()
        } else {
            "FAIL".red().bold()
        };
        println!(
            "  {} {} {} {}",
            mark,
            record.case_name.white(),
            format!("({})", record.duration).dimmed(),
            format!("result={}", record.result).dimmed()
        );

        outcomes.push(CaseOutcome { status, record });
    }

    let report = SuiteReport {
        project_name: suite.project_name,
        results_dir,
        outcomes,
        skipped,
    };

    print_summary(&report);

    if write_report {
        let path = write_records(&report)?;
        println!("  Report: {}\n", path.display().to_string().dimmed());
    }

    Ok(report)
}

fn print_summary(report: &SuiteReport) {
    let failed = report.outcomes.iter().filter(|o| !o.status.is_ok()).count();
    let passed = report.outcomes.len() - failed;

    let line = format!(
        "{} passed, {} failed, {} skipped",
        passed,
        failed,
        report.skipped.len()
    );
    if report.passed() {
        println!("\n{} {}\n", "✓".green().bold(), line.green().bold());
    } else {
        println!("\n{} {}\n", "✗".red().bold(), line.red().bold());
    }
}

/// Write all records to `{results_dir}/results.json`
pub fn write_records(report: &SuiteReport) -> Result<PathBuf> {
    paths::ensure_dir(&report.results_dir)
        .map_err(|e| Error::create_dir(&report.results_dir, e))?;
    let path = report.results_dir.join(REPORT_FILE_NAME);
    let json = serde_json::to_string_pretty(&report.records())?;
    std::fs::write(&path, json).map_err(|e| Error::result_file(&path, e))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_suite(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("suite.yaml");
        std::fs::write(&path, body).unwrap();
        path
    }

    #[tokio::test]
    async fn test_run_suite_mixed() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_suite(
            tmp.path(),
            r#"
project_name: demo
results_dir: out
cases:
  - case_name: ok
    args: { cmd: "exit 0" }
  - case_name: ko
    args: { cmd: "exit 3" }
  - case_name: off
    enabled: false
    args: { cmd: "exit 0" }
"#,
        );

        let report = run_suite(&path, &Config::default(), true).await.unwrap();

        assert!(!report.passed());
        assert_eq!(report.outcomes.len(), 2);
        assert_eq!(report.skipped, vec!["off".to_string()]);
        assert_eq!(report.outcomes[0].status, ExitStatus::Ok);
        assert_eq!(report.outcomes[0].record.result, 100);
        assert_eq!(report.outcomes[1].status, ExitStatus::RunError);
        assert_eq!(report.outcomes[1].record.result, 0);

        let out = tmp.path().join("out");
        assert!(out.join("ok").join("ok.log").is_file());
        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(out.join(REPORT_FILE_NAME)).unwrap())
                .unwrap();
        assert_eq!(written.as_array().unwrap().len(), 2);
        assert_eq!(written[0]["project_name"], "demo");
    }

    #[tokio::test]
    async fn test_unknown_kind_runs_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_suite(
            tmp.path(),
            r#"
project_name: demo
results_dir: out
cases:
  - case_name: first
    args: { cmd: "exit 0" }
  - case_name: second
    kind: tempest
"#,
        );

        let err = run_suite(&path, &Config::default(), false).await.unwrap_err();
        assert!(matches!(err, Error::UnknownKind { kind, .. } if kind == "tempest"));
        assert!(!tmp.path().join("out").exists());
    }

    #[test]
    fn test_load_suite_errors() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_suite(&tmp.path().join("missing.yaml")),
            Err(Error::Config(_))
        ));

        let path = write_suite(tmp.path(), "cases: [");
        assert!(matches!(load_suite(&path), Err(Error::Config(_))));
    }
}
