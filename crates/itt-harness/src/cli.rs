//! Command-line front end shared by test executables
//!
//! Unrecognized arguments are dropped before parsing so that wrappers can pass
//! their own flags through without breaking the run.

use crate::config::{HarnessConfig, RunnerOptions};
use crate::registry::TestRegistry;
use crate::runner::TestRunner;
use clap::Parser;
use std::ffi::OsString;
use tracing::debug;

const KNOWN_FLAGS: &[&str] = &["--no-color", "--verbose", "-v", "--quiet", "-q", "--help", "-h"];

/// Run the registered ITT API tests.
///
/// ENVIRONMENT VARIABLES:
///     INTEL_LIBITTNOTIFY_LOG_DIR  Directory scanned for collector logs
///     NO_COLOR                    Disable colored output
///     ITT_HARNESS_LOG             Diagnostic log filter (e.g. debug)
#[derive(Debug, Parser)]
#[command(name = "itt-harness")]
#[command(disable_version_flag = true)]
#[command(args_override_self = true)]
pub struct Cli {
    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
    /// Run only tests whose SUITE.NAME contains SUBSTRING
    #[arg(long, value_name = "SUBSTRING")]
    pub filter: Option<String>,
    /// Show failure details beneath failed tests (default)
    #[arg(long, short = 'v', overrides_with = "quiet")]
    pub verbose: bool,
    /// Hide failure details beneath failed tests
    #[arg(long, short = 'q', overrides_with = "verbose")]
    pub quiet: bool,
}

impl Cli {
    /// Merge parsed flags over environment-derived defaults
    pub fn into_options(self, config: &HarnessConfig) -> RunnerOptions {
        let mut options = config.runner_options();
        if self.no_color {
            options.color = false;
        }
        options.filter = self.filter;
        options.verbose = !self.quiet;
        options
    }
}

/// Keep the program name and recognized options, drop everything else.
///
/// `--filter VALUE` is rewritten to `--filter=VALUE` so a value that starts with
/// a dash is still taken literally; a trailing `--filter` without value is dropped.
pub fn retain_known_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut args = args.into_iter().map(Into::into);
    let mut kept: Vec<OsString> = args.next().into_iter().collect();

    while let Some(arg) = args.next() {
        let text = arg.to_string_lossy().into_owned();
        if KNOWN_FLAGS.contains(&text.as_str()) || text.starts_with("--filter=") {
            kept.push(arg);
        } else if text == "--filter" {
            match args.next() {
                Some(value) => {
                    let mut joined = OsString::from("--filter=");
                    joined.push(value);
                    kept.push(joined);
                }
                None => debug!("ignoring --filter without a value"),
            }
        } else {
            debug!(argument = %text, "ignoring unrecognized argument");
        }
    }
    kept
}

/// Parse `args`, run `registry` and return the process exit code
pub fn run_tests<I, T>(args: I, registry: &TestRegistry) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let cli = match Cli::try_parse_from(retain_known_args(args)) {
        Ok(cli) => cli,
        Err(e) => {
            // --help lands here with exit code 0
            let _ = e.print();
            return e.exit_code();
        }
    };

    let options = cli.into_options(&HarnessConfig::from_env());
    TestRunner::new(options).run(registry).exit_code()
}
