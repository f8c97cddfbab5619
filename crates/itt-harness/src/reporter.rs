//! Console reporter - display test results

use crate::runner::{RunSummary, TestResult, TestStatus};
use colored::{ColoredString, Colorize};
use std::io::{self, Write};

const BANNER_RULE: &str = "═══════════════════════════════════════════════════════════════";
const SUMMARY_RULE: &str = "───────────────────────────────────────────────────────────────";
const DETAIL_INDENT: &str = "       ";

/// Test reporter with output configuration
#[derive(Debug, Clone, Copy)]
pub struct Reporter {
    /// Show failure messages beneath each failed test
    verbose: bool,
    /// Emit ANSI colors
    color: bool,
}

impl Reporter {
    pub fn new(verbose: bool, color: bool) -> Self {
        if color {
            // colored strips escapes when stdout is not a terminal
            colored::control::set_override(true);
        }
        Self { verbose, color }
    }

    /// Apply `style` only when color output is enabled
    fn paint(&self, text: &str, style: fn(&str) -> ColoredString) -> String {
        if self.color {
            style(text).to_string()
        } else {
            text.to_string()
        }
    }

    pub fn print_header(&self, out: &mut impl Write) -> io::Result<()> {
        writeln!(out)?;
        writeln!(out, "{}", self.paint(BANNER_RULE, |s| s.cyan().bold()))?;
        writeln!(
            out,
            "{}",
            self.paint("                    ITT API Test Suite", |s| s.cyan().bold())
        )?;
        writeln!(out, "{}", self.paint(BANNER_RULE, |s| s.cyan().bold()))?;
        writeln!(out)
    }

    /// Print a single test result
    pub fn print_result(&self, out: &mut impl Write, result: &TestResult) -> io::Result<()> {
        let glyph = match result.status {
            TestStatus::Passed => self.paint("✓ PASS", |s| s.green().bold()),
            TestStatus::Failed => self.paint("✗ FAIL", |s| s.red().bold()),
            TestStatus::Skipped => self.paint("○ SKIP", |s| s.yellow().bold()),
        };
        let duration = format!(" ({:.2} ms)", result.duration_ms());
        writeln!(
            out,
            "  {}  {}{}",
            glyph,
            result.name,
            self.paint(&duration, |s| s.blue().bold())
        )?;

        if result.status == TestStatus::Failed && self.verbose {
            for failure in &result.failures {
                writeln!(out, "{}{}", DETAIL_INDENT, self.paint(failure, |s| s.red().bold()))?;
            }
        }

        if result.status == TestStatus::Skipped {
            if let Some(reason) = result.message.as_deref().filter(|r| !r.is_empty()) {
                let line = format!("Reason: {}", reason);
                writeln!(out, "{}{}", DETAIL_INDENT, self.paint(&line, |s| s.yellow().bold()))?;
            }
        }
        Ok(())
    }

    /// Print counts, the failing-test listing and the closing verdict
    pub fn print_summary(&self, out: &mut impl Write, summary: &RunSummary) -> io::Result<()> {
        writeln!(out)?;
        writeln!(out, "{}", self.paint(SUMMARY_RULE, |s| s.cyan().bold()))?;
        writeln!(
            out,
            "  Summary: {}, {}, {}",
            self.paint(&format!("{} passed", summary.passed), |s| s.green().bold()),
            self.paint(&format!("{} failed", summary.failed), |s| s.red().bold()),
            self.paint(&format!("{} skipped", summary.skipped), |s| s.yellow().bold())
        )?;

        if summary.failed > 0 {
            writeln!(out)?;
            writeln!(out, "  {}", self.paint("Failed tests:", |s| s.red().bold()))?;
            for result in summary.failed_results() {
                writeln!(out, "    • {}", result.name)?;
                for failure in &result.failures {
                    writeln!(out, "      {}", self.paint(failure, |s| s.red().bold()))?;
                }
            }
        }

        writeln!(out)?;
        if summary.failed == 0 {
            writeln!(out, "{}", self.paint("  ✓ All tests passed!", |s| s.green().bold()))?;
        } else {
            writeln!(out, "{}", self.paint("  ✗ Some tests failed!", |s| s.red().bold()))?;
        }
        writeln!(out)
    }
}
