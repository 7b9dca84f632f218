//! Execution and result lifecycle
//!
//! [`Feature`] is the contract every test case variant satisfies;
//! [`BashFeature`] and [`ResultsFeature`] are the concrete variants and
//! [`registry`] picks one by name.

pub mod bash;
pub mod feature;
pub mod params;
pub mod registry;
pub mod results;
pub mod testcase;

pub use bash::{BashFeature, Deadline, DEFAULT_TIMEOUT};
pub use feature::{Execution, Feature};
pub use params::Params;
pub use results::{load_results, parse_results, ResultsFeature, ResultsSummary};
pub use testcase::{ExitStatus, ResultRecord, TestCase};
