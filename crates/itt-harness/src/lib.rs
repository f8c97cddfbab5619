//! ITT Harness - test framework for the ITT instrumentation API
//!
//! This library provides everything an ITT API test executable needs:
//! - Non-fatal check macros over a per-thread assertion context
//! - Test registration with optional fixtures and skip markers
//! - A sequential runner with panic isolation and console reporting
//! - Reference collector log discovery and content checks
//! - A reusable thread barrier for concurrency tests
//!
//! A test executable registers its suites and hands control to [`run_tests`]:
//!
//! ```no_run
//! use itt_harness::{check, run_tests, TestRegistrar, TestRegistry};
//!
//! let mut registry = TestRegistry::new();
//! TestRegistrar::new(&mut registry).test("Domain", "Create", || {
//!     check!(!"itt.domain".is_empty());
//! });
//! std::process::exit(run_tests(std::env::args_os(), &registry));
//! ```

/// Harness version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod assertions;
pub mod barrier;
pub mod cli;
pub mod config;
pub mod error;
pub mod log_verifier;
pub mod registry;
pub mod reporter;
pub mod runner;
pub mod utils;

pub use assertions::{AssertionContext, Nullable};
pub use barrier::ThreadBarrier;
pub use cli::run_tests;
pub use config::{HarnessConfig, RunnerOptions};
pub use error::{HarnessError, HarnessResult};
pub use log_verifier::{wait_for_log_content, LogVerifier, DEFAULT_WAIT_TIMEOUT};
pub use registry::{Fixture, TestCase, TestFn, TestRegistrar, TestRegistry};
pub use reporter::Reporter;
pub use runner::{RunSummary, TestResult, TestRunner, TestStatus};
pub use utils::{cpu_workload, timed_workload, unique_name, ScopedEnvVar};
