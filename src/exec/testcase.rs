//! Test case identity and result bookkeeping
//!
//! A [`TestCase`] carries what a reporting backend needs about one unit of
//! test logic: who it is, where its artifacts live, its score and when it ran.
//! Features write into it; nothing here talks to a database.

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::common::paths;

/// Outcome of one [`run`](crate::exec::Feature::run)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExitStatus {
    /// `execute` reported success
    Ok,
    /// `execute` failed, timed out, was misconfigured or errored
    RunError,
}

impl ExitStatus {
    /// Process exit code for the CLI
    pub fn code(self) -> i32 {
        match self {
            ExitStatus::Ok => 0,
            ExitStatus::RunError => 1,
        }
    }

    /// True when the case passed
    pub fn is_ok(self) -> bool {
        self == ExitStatus::Ok
    }
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitStatus::Ok => write!(f, "OK"),
            ExitStatus::RunError => write!(f, "RUN_ERROR"),
        }
    }
}

/// Identity and mutable result state of a test case
#[derive(Debug, Clone)]
pub struct TestCase {
    project_name: String,
    case_name: String,
    res_dir: PathBuf,
    /// Score in `[0, 100]`
    pub result: u8,
    /// Seconds since the Unix epoch, set on entry to `run`
    pub start_time: Option<f64>,
    /// Seconds since the Unix epoch, set on exit from `run`
    pub stop_time: Option<f64>,
    /// Variant-specific details (e.g. test counts)
    pub details: serde_json::Value,
}

impl TestCase {
    /// Create a case whose artifacts go to `{default results dir}/{case_name}`
    pub fn new(project_name: impl Into<String>, case_name: impl Into<String>) -> Self {
        let case_name = case_name.into();
        let res_dir = paths::case_res_dir(&paths::default_results_dir(), &case_name);
        Self {
            project_name: project_name.into(),
            case_name,
            res_dir,
            result: 0,
            start_time: None,
            stop_time: None,
            details: serde_json::Value::Null,
        }
    }

    /// Override the artifacts directory
    pub fn with_res_dir(mut self, res_dir: impl Into<PathBuf>) -> Self {
        self.res_dir = res_dir.into();
        self
    }

    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    pub fn case_name(&self) -> &str {
        &self.case_name
    }

    pub fn res_dir(&self) -> &Path {
        &self.res_dir
    }

    /// Elapsed time as `MM:SS`, or `XX:XX` if the case has not completed a run
    pub fn duration(&self) -> String {
        match (self.start_time, self.stop_time) {
            (Some(start), Some(stop)) => {
                let secs = (stop - start).max(0.0) as u64;
                format!("{:02}:{:02}", secs / 60, secs % 60)
            }
            _ => "XX:XX".to_string(),
        }
    }

    /// Snapshot for a reporting backend
    pub fn record(&self) -> ResultRecord {
        ResultRecord {
            project_name: self.project_name.clone(),
            case_name: self.case_name.clone(),
            result: self.result,
            start_time: self.start_time,
            stop_time: self.stop_time,
            duration: self.duration(),
            details: self.details.clone(),
        }
    }
}

/// Serializable result of a case, as handed to a reporting path
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRecord {
    pub project_name: String,
    pub case_name: String,
    pub result: u8,
    pub start_time: Option<f64>,
    pub stop_time: Option<f64>,
    pub duration: String,
    #[serde(skip_serializing_if = "serde_json::Value::is_null")]
    pub details: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_case_defaults() {
        let case = TestCase::new("bar", "foo");
        assert_eq!(case.project_name(), "bar");
        assert_eq!(case.case_name(), "foo");
        assert!(case.res_dir().ends_with("foo"));
        assert_eq!(case.result, 0);
        assert!(case.start_time.is_none());
        assert!(case.stop_time.is_none());
    }

    #[test]
    fn test_duration() {
        let mut case = TestCase::new("bar", "foo");
        assert_eq!(case.duration(), "XX:XX");

        case.start_time = Some(1.0);
        assert_eq!(case.duration(), "XX:XX");

        case.stop_time = Some(126.5);
        assert_eq!(case.duration(), "02:05");
    }

    #[test]
    fn test_record_serializes() {
        let mut case = TestCase::new("bar", "foo").with_res_dir("/tmp/foo");
        case.result = 100;
        case.start_time = Some(1.0);
        case.stop_time = Some(2.0);

        let value = serde_json::to_value(case.record()).unwrap();
        assert_eq!(value["project_name"], "bar");
        assert_eq!(value["case_name"], "foo");
        assert_eq!(value["result"], 100);
        assert_eq!(value["duration"], "00:01");
        assert!(value.get("details").is_none());
    }

    #[test]
    fn test_exit_status_display() {
        assert_eq!(ExitStatus::Ok.to_string(), "OK");
        assert_eq!(ExitStatus::RunError.to_string(), "RUN_ERROR");
        assert_eq!(ExitStatus::Ok.code(), 0);
        assert_ne!(ExitStatus::RunError.code(), 0);
    }
}
