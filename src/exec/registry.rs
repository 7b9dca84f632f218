//! Test case kinds and their constructors

use super::bash::BashFeature;
use super::feature::Feature;
use super::results::ResultsFeature;
use super::testcase::TestCase;
use crate::common::config::Timeouts;
use crate::common::Error;

/// Information about a test case kind
#[derive(Debug, Clone)]
pub struct KindInfo {
    /// Name used in suite files (e.g., "bash")
    pub id: &'static str,
    /// Brief description
    pub description: &'static str,
}

/// All available kinds
static KINDS: &[KindInfo] = &[
    KindInfo {
        id: "bash",
        description: "Run a shell command; exit code 0 scores 100",
    },
    KindInfo {
        id: "results",
        description: "Run a shell command writing JSON step results to $HARNESS_OUTPUT; score is the pass rate",
    },
];

/// Get all registered kinds
pub fn all_kinds() -> &'static [KindInfo] {
    KINDS
}

/// Error for a kind missing from the registry
pub fn unknown_kind(kind: &str) -> Error {
    let known: Vec<&str> = KINDS.iter().map(|k| k.id).collect();
    Error::UnknownKind {
        kind: kind.to_string(),
        known: known.join(", "),
    }
}

/// Build a feature of the given kind
pub fn create(kind: &str, case: TestCase, timeouts: &Timeouts) -> Option<Box<dyn Feature>> {
    match kind {
        "bash" => Some(Box::new(BashFeature::new(case).with_timeouts(timeouts))),
        "results" => Some(Box::new(ResultsFeature::new(case).with_timeouts(timeouts))),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::params::Params;
    use crate::exec::testcase::ExitStatus;

    #[test]
    fn test_all_kinds_are_constructible() {
        for kind in all_kinds() {
            let case = TestCase::new("bar", "foo");
            assert!(create(kind.id, case, &Timeouts::default()).is_some(), "{}", kind.id);
        }
    }

    #[test]
    fn test_unknown_kind() {
        let case = TestCase::new("bar", "foo");
        assert!(create("robotframework", case, &Timeouts::default()).is_none());
    }

    #[test]
    fn test_unknown_kind_lists_registered_kinds() {
        let message = unknown_kind("robotframework").to_string();
        assert!(message.contains("'robotframework'"));
        for kind in all_kinds() {
            assert!(message.contains(kind.id), "{}", message);
        }
    }

    #[tokio::test]
    async fn test_created_feature_runs() {
        let tmp = tempfile::tempdir().unwrap();
        let case = TestCase::new("bar", "foo").with_res_dir(tmp.path().join("foo"));
        let mut feature = create("bash", case, &Timeouts::default()).unwrap();

        let status = feature.run(&Params::new().with("cmd", "exit 0")).await;
        assert_eq!(status, ExitStatus::Ok);
        assert_eq!(feature.case().result, 100);
    }
}
