pub mod domain;
pub mod invariants;
pub mod runner;
pub mod verification;

pub use runner::{run_suite, SuiteReport, SuiteStatus};
pub use verification::{ConstraintFrame, Verdict, VerificationContext};
