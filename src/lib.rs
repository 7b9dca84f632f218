//! Test case harness - bounded execution and scoring of test cases
//!
//! This library runs units of test logic (usually shell commands) under a
//! deadline, captures their output and turns the outcome into a uniform
//! result record.

pub mod cli;
pub mod commands;
pub mod common;
pub mod exec;
pub mod suite;

// Re-export commonly used types for tests
pub use common::{Error, Result};
pub use exec::{BashFeature, Execution, ExitStatus, Feature, Params, ResultsFeature, TestCase};
