//! sexp-testkit - Conformance testing utilities.
//!
//! Describes native values declaratively, runs the exposed `Is*`/`As*`
//! surface against them, and compares the outcome with an expectation.
//!
//! # Key Types
//!
//! - [`Fixture`]: A native value described in TOML/JSON, built into a [`MemoryRuntime`]
//! - [`MatrixSnapshot`] / [`VectorSnapshot`]: Owned captures of reified views
//! - [`Op`] / [`Outcome`]: One operation of the exposed surface and its result
//! - [`Scenario`]: Fixture + operation + expected outcome
//! - [`SnapshotDiff`]: Mismatches between an outcome and an expectation
//!
//! # Example
//!
//! ```
//! use sexp_testkit::{Fixture, Op, Scenario};
//!
//! let scenario = Scenario::builder("square")
//!     .description("3x3 integer matrix as numeric")
//!     .fixture(Fixture::integer_matrix((1..=9).collect(), 3, 3))
//!     .op(Op::AsNumericMatrix)
//!     .expect_shape(3, 3)
//!     .expect_truncated(false)
//!     .build();
//!
//! let result = scenario.run().unwrap();
//! assert!(result.passed(), "{}", result.diff.report());
//! ```
//!
//! [`MemoryRuntime`]: sexp_core::MemoryRuntime

mod diff;
mod fixture;
mod runner;
mod scenario;
mod snapshot;

pub use diff::{Mismatch, SnapshotDiff};
pub use fixture::Fixture;
pub use runner::{run_op, Op, Outcome};
pub use scenario::standard as scenario_standard;
pub use scenario::{load_dir, Expectation, Scenario, ScenarioBuilder, ScenarioResult};
pub use snapshot::{CellDisplay, MatrixSnapshot, VectorSnapshot};

/// Re-export sexp_core for convenience in tests.
pub use sexp_core;

/// Install `env_logger` in test mode. Safe to call more than once.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
