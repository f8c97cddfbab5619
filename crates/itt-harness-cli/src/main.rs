//! `itt-harness` - runs the built-in ITT harness suites
//!
//! Diagnostic output goes to stderr and is controlled by `ITT_HARNESS_LOG`
//! (an `EnvFilter` directive, default `warn`). Test results go to stdout.

use itt_harness::{run_tests, TestRegistrar, TestRegistry};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod suites;

const LOG_FILTER_ENV: &str = "ITT_HARNESS_LOG";

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();

    let mut registry = TestRegistry::new();
    suites::register_all(&mut TestRegistrar::new(&mut registry));
    debug!(tests = registry.len(), "registered built-in suites");

    std::process::exit(run_tests(std::env::args_os(), &registry));
}
