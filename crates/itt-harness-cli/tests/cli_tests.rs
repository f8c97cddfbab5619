//! End-to-end tests for the `itt-harness` executable
//!
//! Tests the complete command-line experience including:
//! - Help output
//! - Exit status of the built-in suites
//! - Filtering and verbosity flags
//! - Tolerance of unrecognized arguments
//! - Color control

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

fn harness_cmd() -> Command {
    let mut cmd = Command::cargo_bin("itt-harness").unwrap();
    cmd.env_remove("NO_COLOR").env_remove("ITT_HARNESS_LOG");
    cmd
}

// ══════════════════════════════════════════════════════════════════════════════
// HELP
// ══════════════════════════════════════════════════════════════════════════════

mod help {
    use super::*;

    #[test]
    fn test_help_lists_options_and_exits_zero() {
        harness_cmd()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Usage"))
            .stdout(predicate::str::contains("--filter"))
            .stdout(predicate::str::contains("--no-color"))
            .stdout(predicate::str::contains("INTEL_LIBITTNOTIFY_LOG_DIR"));
    }

    #[test]
    fn test_short_help_runs_no_tests() {
        harness_cmd()
            .arg("-h")
            .assert()
            .success()
            .stdout(predicate::str::contains("Summary:").not());
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// RUNS
// ══════════════════════════════════════════════════════════════════════════════

mod runs {
    use super::*;

    #[test]
    fn test_builtin_suites_pass() {
        harness_cmd()
            .arg("--no-color")
            .assert()
            .success()
            .stdout(predicate::str::contains("ITT API Test Suite"))
            .stdout(predicate::str::contains("✓ PASS  ThreadBarrier.NoPartialRelease"))
            .stdout(predicate::str::contains("○ SKIP  Assertions.LiveCollector"))
            .stdout(predicate::str::contains("Reason: requires a reference collector library"))
            .stdout(predicate::str::contains("0 failed, 1 skipped"))
            .stdout(predicate::str::contains("✓ All tests passed!"));
    }

    #[test]
    fn test_filter_restricts_selection() {
        harness_cmd()
            .args(["--no-color", "--filter", "ThreadBarrier."])
            .assert()
            .success()
            .stdout(predicate::str::contains("ThreadBarrier.OneLeaderPerRound"))
            .stdout(predicate::str::contains("CollectorLog.").not())
            .stdout(predicate::str::contains("Summary: 3 passed, 0 failed, 0 skipped"));
    }

    #[test]
    fn test_filter_equals_form() {
        harness_cmd()
            .args(["--no-color", "--filter=CollectorLog.ContentChecks"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Summary: 1 passed, 0 failed, 0 skipped"));
    }

    #[test]
    fn test_filter_matching_nothing_still_succeeds() {
        harness_cmd()
            .args(["--no-color", "--filter", "NoSuchSuite"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Summary: 0 passed, 0 failed, 0 skipped"));
    }

    #[test]
    fn test_unknown_arguments_are_ignored() {
        harness_cmd()
            .args(["--gtest_output=xml", "--no-color", "positional", "-z", "-q"])
            .assert()
            .success()
            .stdout(predicate::str::contains("All tests passed"));
    }

    #[test]
    fn test_trailing_filter_without_value_runs_everything() {
        harness_cmd()
            .args(["--no-color", "--filter"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Assertions.BasicChecks"))
            .stdout(predicate::str::contains("CollectorLog.DirectoryFromEnvironment"));
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// COLOR
// ══════════════════════════════════════════════════════════════════════════════

mod color {
    use super::*;

    #[test]
    fn test_color_is_on_by_default_when_piped() {
        harness_cmd()
            .assert()
            .success()
            .stdout(predicate::str::contains("\u{1b}["))
            .stdout(predicate::str::contains("ITT API Test Suite"));
    }

    #[test]
    fn test_no_color_flag_strips_escape_codes() {
        harness_cmd()
            .arg("--no-color")
            .assert()
            .success()
            .stdout(predicate::str::contains("\u{1b}[").not());
    }

    #[test]
    fn test_no_color_env_strips_escape_codes() {
        harness_cmd()
            .env("NO_COLOR", "1")
            .assert()
            .success()
            .stdout(predicate::str::contains("\u{1b}[").not());
    }
}
