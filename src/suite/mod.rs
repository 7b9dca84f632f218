//! Suite runner
//!
//! Reads a YAML list of test cases and runs them sequentially through the
//! registry, collecting one result record per case.

mod config;
mod runner;

pub use config::*;
pub use runner::{load_suite, run_suite, write_records, CaseOutcome, SuiteReport, REPORT_FILE_NAME};
