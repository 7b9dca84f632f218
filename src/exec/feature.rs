//! Execution lifecycle shared by every test case variant
//!
//! A [`Feature`] only has to say how to [`execute`](Feature::execute). The
//! provided [`run`](Feature::run) times the attempt, scores it and folds every
//! failure mode (non-zero outcome, error, panic) into [`ExitStatus::RunError`].

use async_trait::async_trait;
use futures_util::FutureExt;
use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;
use tracing::{Instrument, Span};

use super::params::Params;
use super::testcase::{ExitStatus, TestCase};
use crate::common::{now_secs, Error, Result};

/// What `execute` observed
///
/// Codes follow the classic convention: 0 is success, anything else is a
/// failure, with -1 and -2 reserved for a missing command and a timeout kill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Execution {
    /// Finished and reported success
    Success,
    /// Finished with this non-zero status
    Exited(i32),
    /// Required `cmd` parameter was not supplied; nothing was spawned
    MissingCommand,
    /// Deadline expired and the child was killed
    TimedOut { after: Duration },
}

impl Execution {
    /// Map a raw status code to an outcome
    pub fn from_code(code: i32) -> Self {
        if code == 0 {
            Execution::Success
        } else {
            Execution::Exited(code)
        }
    }

    /// Integer form of the outcome
    pub fn code(&self) -> i32 {
        match self {
            Execution::Success => 0,
            Execution::Exited(code) => *code,
            Execution::MissingCommand => -1,
            Execution::TimedOut { .. } => -2,
        }
    }

    /// True for a zero exit
    pub fn is_success(&self) -> bool {
        self.code() == 0
    }
}

impl fmt::Display for Execution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Execution::Success => write!(f, "success"),
            Execution::Exited(code) => write!(f, "exited with code {}", code),
            Execution::MissingCommand => write!(f, "no cmd given"),
            Execution::TimedOut { after } => write!(f, "killed after {}s", after.as_secs()),
        }
    }
}

/// A unit of test logic that can be executed and scored
#[async_trait]
pub trait Feature: Send {
    /// Identity and result state
    fn case(&self) -> &TestCase;

    fn case_mut(&mut self) -> &mut TestCase;

    /// Logging handle owned by this instance
    fn span(&self) -> &Span;

    /// Do the actual work
    ///
    /// Resource failures are returned as `Err`; everything else is an
    /// [`Execution`] outcome.
    async fn execute(&mut self, params: &Params) -> Result<Execution>;

    /// Score a successful execution; full marks unless the variant knows better
    fn score_success(&mut self) {
        self.case_mut().result = 100;
    }

    /// Execute and score the case
    ///
    /// Sets `start_time`, `result` and `stop_time` on every path, including
    /// when `execute` errors or panics. Never fails.
    async fn run(&mut self, params: &Params) -> ExitStatus {
        let span = self.span().clone();
        async move {
            begin(self.case_mut());

            let status = match guarded(self.execute(params)).await {
                Ok(execution) if execution.is_success() => {
                    self.score_success();
                    ExitStatus::Ok
                }
                Ok(execution) => {
                    tracing::info!(
                        code = execution.code(),
                        "{} FAILED: {}",
                        self.case().project_name(),
                        execution
                    );
                    ExitStatus::RunError
                }
                Err(e) => {
                    tracing::error!("{} FAILED, Error: {}", self.case().project_name(), e);
                    ExitStatus::RunError
                }
            };

            finish(self.case_mut());
            status
        }
        .instrument(span)
        .await
    }
}

/// Span carrying the identity of a case
pub fn case_span(case: &TestCase) -> Span {
    tracing::info_span!("case", project = %case.project_name(), case = %case.case_name())
}

/// Stamp the start of a run and reset the score
fn begin(case: &mut TestCase) {
    case.start_time = Some(now_secs());
    case.result = 0;
}

/// Stamp the end of a run; never earlier than the start
fn finish(case: &mut TestCase) {
    let now = now_secs();
    case.stop_time = Some(match case.start_time {
        Some(start) => now.max(start),
        None => now,
    });
}

/// Await an `execute` future, turning a panic into an error
async fn guarded<F>(fut: F) -> Result<Execution>
where
    F: Future<Output = Result<Execution>> + Send,
{
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(result) => result,
        Err(payload) => Err(Error::Panicked(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
