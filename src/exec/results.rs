//! Structured test results
//!
//! Some runners report per-step outcomes as a JSON list of objects carrying a
//! `status` field. [`parse_results`] turns such a list into a percentage and a
//! breakdown; [`ResultsFeature`] runs a command that writes the list and scores
//! the case from it.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::Span;

use super::bash::BashFeature;
use super::feature::{Execution, Feature};
use super::params::Params;
use super::testcase::TestCase;
use crate::common::config::Timeouts;
use crate::common::{Error, Result};

/// Environment variable telling the command where to write its JSON results
pub const OUTPUT_ENV: &str = "HARNESS_OUTPUT";

const OUTPUT_FILE_NAME: &str = "output.json";

/// Score and counts derived from a results list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultsSummary {
    /// `round(passed / total * 100)`
    #[serde(skip)]
    pub result: u8,
    pub pass_tests: usize,
    pub fail_tests: usize,
    pub skip_tests: usize,
    pub total_tests: usize,
}

impl ResultsSummary {
    /// Counts as a JSON mapping, suitable for `TestCase::details`
    pub fn details(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Score a list of `{"status": ...}` entries
///
/// Statuses other than `passed`, `failed` and `skipped` only count towards the
/// total. An empty list cannot be scored and an entry without `status` is an
/// error; neither is silently ignored.
pub fn parse_results(steps: &[Value]) -> Result<ResultsSummary> {
    let mut summary = ResultsSummary {
        result: 0,
        pass_tests: 0,
        fail_tests: 0,
        skip_tests: 0,
        total_tests: steps.len(),
    };

    for (index, step) in steps.iter().enumerate() {
        let status = step
            .get("status")
            .ok_or(Error::MissingStatus { index })?;
        match status.as_str() {
            Some("passed") => summary.pass_tests += 1,
            Some("failed") => summary.fail_tests += 1,
            Some("skipped") => summary.skip_tests += 1,
            _ => {}
        }
    }

    if summary.total_tests == 0 {
        return Err(Error::EmptyResults);
    }

    let ratio = summary.pass_tests as f64 / summary.total_tests as f64 * 100.0;
    summary.result = ratio.round_ties_even() as u8;
    Ok(summary)
}

/// Read a JSON results file and score it
pub fn load_results(path: &Path) -> Result<ResultsSummary> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::file_read(path, e))?;
    let value: Value = serde_json::from_str(&content)?;
    match value {
        Value::Array(steps) => parse_results(&steps),
        other => Err(Error::NotAList(json_kind(&other).to_string())),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Test case scored from the JSON results its command writes
///
/// The command runs with the same bounds as [`BashFeature`] and finds the
/// path to write to in `$HARNESS_OUTPUT` (`{res_dir}/output.json`).
pub struct ResultsFeature {
    inner: BashFeature,
    output_file: PathBuf,
}

impl ResultsFeature {
    pub fn new(case: TestCase) -> Self {
        let output_file = case.res_dir().join(OUTPUT_FILE_NAME);
        let inner = BashFeature::new(case).with_env(OUTPUT_ENV, output_file.display().to_string());
        Self { inner, output_file }
    }

    pub fn with_timeouts(mut self, timeouts: &Timeouts) -> Self {
        self.inner = self.inner.with_timeouts(timeouts);
        self
    }

    /// Where the command is expected to write its results
    pub fn output_file(&self) -> &Path {
        &self.output_file
    }

    /// Log file of the wrapped command
    pub fn result_file(&self) -> &Path {
        self.inner.result_file()
    }
}

#[async_trait]
impl Feature for ResultsFeature {
    fn case(&self) -> &TestCase {
        self.inner.case()
    }

    fn case_mut(&mut self) -> &mut TestCase {
        self.inner.case_mut()
    }

    fn span(&self) -> &Span {
        self.inner.span()
    }

    async fn execute(&mut self, params: &Params) -> Result<Execution> {
        // Never score a previous run's file
        if let Err(e) = tokio::fs::remove_file(&self.output_file).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                return Err(e.into());
            }
        }

        let execution = self.inner.execute(params).await?;
        if !execution.is_success() {
            return Ok(execution);
        }

        let summary = load_results(&self.output_file)?;
        tracing::info!(
            "{}/{} passed, {} failed, {} skipped",
            summary.pass_tests,
            summary.total_tests,
            summary.fail_tests,
            summary.skip_tests
        );

        let case = self.case_mut();
        case.result = summary.result;
        case.details = summary.details();
        Ok(Execution::Success)
    }

    /// The score was already derived from the results file
    fn score_success(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::testcase::ExitStatus;
    use serde_json::json;

    fn steps(statuses: &[&str]) -> Vec<Value> {
        statuses.iter().map(|s| json!({ "status": s })).collect()
    }

    #[test]
    fn test_half_success() {
        let summary = parse_results(&steps(&["passed", "failed"])).unwrap();
        assert_eq!(summary.result, 50);
        assert_eq!(
            summary.details(),
            json!({"pass_tests": 1, "fail_tests": 1, "skip_tests": 0, "total_tests": 2})
        );
    }

    #[test]
    fn test_success() {
        let summary = parse_results(&steps(&["passed", "passed"])).unwrap();
        assert_eq!(summary.result, 100);
    }

    #[test]
    fn test_null_passed() {
        let summary = parse_results(&steps(&["dummy"])).unwrap();
        assert_eq!(summary.result, 0);
        assert_eq!(summary.total_tests, 1);
    }

    #[test]
    fn test_count() {
        let summary = parse_results(&steps(&["passed", "failed", "skipped"])).unwrap();
        assert_eq!(summary.pass_tests, 1);
        assert_eq!(summary.fail_tests, 1);
        assert_eq!(summary.skip_tests, 1);
        assert_eq!(summary.total_tests, 3);
        assert_eq!(summary.result, 33);
    }

    #[test]
    fn test_rounding() {
        // 1/8 = 12.5 rounds to even
        let mut statuses = vec!["failed"; 7];
        statuses.push("passed");
        assert_eq!(parse_results(&steps(&statuses)).unwrap().result, 12);

        // 2/3 = 66.67
        let summary = parse_results(&steps(&["passed", "passed", "failed"])).unwrap();
        assert_eq!(summary.result, 67);
    }

    #[test]
    fn test_empty_is_error() {
        assert!(matches!(parse_results(&[]), Err(Error::EmptyResults)));
    }

    #[test]
    fn test_missing_status_is_error() {
        let data = vec![json!({"status": "passed"}), json!({"foo": "bar"})];
        assert!(matches!(
            parse_results(&data),
            Err(Error::MissingStatus { index: 1 })
        ));
    }

    #[test]
    fn test_load_results_not_a_list() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("out.json");
        std::fs::write(&path, r#"{"status": "passed"}"#).unwrap();
        assert!(matches!(load_results(&path), Err(Error::NotAList(_))));
    }

    #[test]
    fn test_load_results_missing_file() {
        let err = load_results(Path::new("/nonexistent/output.json")).unwrap_err();
        assert!(matches!(err, Error::FileRead { .. }));
    }

    fn feature(dir: &Path) -> ResultsFeature {
        ResultsFeature::new(TestCase::new("bar", "behave").with_res_dir(dir.join("behave")))
    }

    #[tokio::test]
    async fn test_run_scores_from_output() {
        let tmp = tempfile::tempdir().unwrap();
        let mut feature = feature(tmp.path());

        let cmd = r#"echo '[{"status":"passed"},{"status":"failed"}]' > "$HARNESS_OUTPUT""#;
        let status = feature.run(&Params::new().with("cmd", cmd)).await;

        assert_eq!(status, ExitStatus::Ok);
        assert_eq!(feature.case().result, 50);
        assert_eq!(feature.case().details["total_tests"], 2);
    }

    #[tokio::test]
    async fn test_run_empty_results_is_run_error() {
        let tmp = tempfile::tempdir().unwrap();
        let mut feature = feature(tmp.path());

        let cmd = r#"echo '[]' > "$HARNESS_OUTPUT""#;
        let status = feature.run(&Params::new().with("cmd", cmd)).await;

        assert_eq!(status, ExitStatus::RunError);
        assert_eq!(feature.case().result, 0);
    }

    #[tokio::test]
    async fn test_run_without_output_is_run_error() {
        let tmp = tempfile::tempdir().unwrap();
        let mut feature = feature(tmp.path());

        let status = feature.run(&Params::new().with("cmd", "exit 0")).await;
        assert_eq!(status, ExitStatus::RunError);
        assert_eq!(feature.case().result, 0);
    }

    #[tokio::test]
    async fn test_failed_command_is_not_parsed() {
        let tmp = tempfile::tempdir().unwrap();
        let mut feature = feature(tmp.path());

        let cmd = r#"echo '[{"status":"passed"}]' > "$HARNESS_OUTPUT"; exit 4"#;
        let execution = feature.execute(&Params::new().with("cmd", cmd)).await.unwrap();
        assert_eq!(execution, Execution::Exited(4));
        assert!(feature.case().details.is_null());
    }
}
