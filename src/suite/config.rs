//! Suite file configuration types
//!
//! Defines the data structures for deserializing YAML suite files.

use serde::Deserialize;
use std::path::PathBuf;

use crate::exec::Params;

/// A set of test cases loaded from a YAML file
#[derive(Deserialize, Debug)]
pub struct Suite {
    /// Project every case in the suite belongs to
    pub project_name: String,
    /// Optional description of what the suite covers
    pub description: Option<String>,
    /// Results root; relative paths are resolved against the suite file
    pub results_dir: Option<PathBuf>,
    /// Cases, run in order
    pub cases: Vec<CaseConfig>,
}

/// A single test case entry
#[derive(Deserialize, Debug)]
pub struct CaseConfig {
    /// Case name; also names the result directory and log file
    pub case_name: String,
    /// Optional description
    pub description: Option<String>,
    /// Registry kind (default: "bash")
    #[serde(default = "default_kind")]
    pub kind: String,
    /// Disabled cases are reported as skipped
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Keyword parameters forwarded to `run`
    #[serde(default)]
    pub args: Params,
}

fn default_kind() -> String {
    "bash".to_string()
}

fn default_enabled() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_suite() {
        let suite: Suite = serde_yaml::from_str(
            r#"
project_name: demo
results_dir: out
cases:
  - case_name: hello
    args:
      cmd: echo hello
      console: true
      max_duration: 5
  - case_name: behave
    kind: results
    enabled: false
    args:
      cmd: ./run.sh
"#,
        )
        .unwrap();

        assert_eq!(suite.project_name, "demo");
        assert_eq!(suite.results_dir, Some(PathBuf::from("out")));
        assert_eq!(suite.cases.len(), 2);

        let hello = &suite.cases[0];
        assert_eq!(hello.kind, "bash");
        assert!(hello.enabled);
        assert_eq!(hello.args.get_str("cmd"), Some("echo hello"));
        assert!(hello.args.flag("console"));

        let behave = &suite.cases[1];
        assert_eq!(behave.kind, "results");
        assert!(!behave.enabled);
    }

    #[test]
    fn test_case_without_args() {
        let suite: Suite =
            serde_yaml::from_str("project_name: demo\ncases:\n  - case_name: empty\n").unwrap();
        assert!(suite.cases[0].args.is_empty());
    }
}
