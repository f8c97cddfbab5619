//! Test runner - execute registered tests sequentially

use crate::assertions;
use crate::config::RunnerOptions;
use crate::error::HarnessError;
use crate::registry::{TestCase, TestRegistry};
use crate::reporter::Reporter;
use std::any::Any;
use std::cell::Cell;
use std::io::{self, Write};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};

/// Terminal state of a test that was selected by the filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestStatus {
    Passed,
    Failed,
    Skipped,
}

/// Outcome of one test
#[derive(Debug, Clone, PartialEq)]
pub struct TestResult {
    /// `suite.name`
    pub name: String,
    pub status: TestStatus,
    /// Skip reason, when skipped
    pub message: Option<String>,
    pub duration: Duration,
    /// Failures captured from the assertion context after the test returned
    pub failures: Vec<String>,
}

impl TestResult {
    fn skipped(name: String, reason: &str) -> Self {
        Self {
            name,
            status: TestStatus::Skipped,
            message: Some(reason.to_string()),
            duration: Duration::ZERO,
            failures: Vec::new(),
        }
    }

    pub fn duration_ms(&self) -> f64 {
        self.duration.as_secs_f64() * 1000.0
    }

    pub fn is_pass(&self) -> bool {
        self.status == TestStatus::Passed
    }

    pub fn is_fail(&self) -> bool {
        self.status == TestStatus::Failed
    }
}

/// Aggregated results of one run, in execution order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub results: Vec<TestResult>,
}

impl RunSummary {
    /// Count and keep a result
    pub fn record(&mut self, result: TestResult) {
        match result.status {
            TestStatus::Passed => self.passed += 1,
            TestStatus::Failed => self.failed += 1,
            TestStatus::Skipped => self.skipped += 1,
        }
        self.results.push(result);
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn failed_results(&self) -> impl Iterator<Item = &TestResult> {
        self.results.iter().filter(|r| r.is_fail())
    }

    /// Process exit status: 1 if anything failed, 0 otherwise
    pub fn exit_code(&self) -> i32 {
        if self.failed > 0 {
            1
        } else {
            0
        }
    }
}

/// Sequential test runner
#[derive(Debug, Clone, Default)]
pub struct TestRunner {
    options: RunnerOptions,
}

impl TestRunner {
    pub fn new(options: RunnerOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RunnerOptions {
        &self.options
    }

    /// Run every registered test matching the filter, reporting to stdout
    pub fn run(&self, registry: &TestRegistry) -> RunSummary {
        // Unlocked: tests may join worker threads that print
        let mut out = io::stdout();
        self.run_with_output(registry, &mut out)
    }

    /// Run every registered test matching the filter, reporting to `out`
    pub fn run_with_output(&self, registry: &TestRegistry, out: &mut impl Write) -> RunSummary {
        let reporter = Reporter::new(self.options.verbose, self.options.color);
        let mut summary = RunSummary::default();

        info!(
            registered = registry.len(),
            filter = self.options.filter.as_deref().unwrap_or(""),
            "starting test run"
        );
        report(reporter.print_header(out));

        with_quiet_panics(|| {
            for case in registry.tests() {
                if !self.options.matches(&case.full_name()) {
                    trace!(test = %case.full_name(), "filtered out");
                    continue;
                }

                let result = self.run_test(case);
                report(reporter.print_result(out, &result));
                summary.record(result);
            }
        });

        report(reporter.print_summary(out, &summary));
        report(out.flush());
        info!(
            passed = summary.passed,
            failed = summary.failed,
            skipped = summary.skipped,
            "test run finished"
        );
        summary
    }

    /// Execute one test on the current thread
    ///
    /// Setup, body and teardown share one panic boundary; a panic from any of
    /// them becomes one trailing failure and the remaining callables are skipped.
    pub fn run_test(&self, case: &TestCase) -> TestResult {
        let name = case.full_name();

        if case.skip {
            debug!(test = %name, reason = %case.skip_reason, "skipped");
            return TestResult::skipped(name, &case.skip_reason);
        }

        debug!(test = %name, "running");
        assertions::reset();
        let start = Instant::now();

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            if let Some(setup) = &case.setup {
                setup();
            }
            if let Some(body) = &case.body {
                body();
            }
            if let Some(teardown) = &case.teardown {
                teardown();
            }
        }));

        if let Err(payload) = outcome {
            let message = describe_panic(&*payload);
            debug!(test = %name, %message, "caught panic");
            assertions::add_failure(message);
        }

        let duration = start.elapsed();
        let status = if assertions::failed() {
            TestStatus::Failed
        } else {
            TestStatus::Passed
        };
        debug!(test = %name, ?status, ?duration, "finished");

        TestResult {
            name,
            status,
            message: None,
            duration,
            failures: assertions::failures(),
        }
    }
}

/// Failure text for a panic payload escaping a test
pub fn describe_panic(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("Exception: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("Exception: {}", s)
    } else if let Some(err) = payload.downcast_ref::<HarnessError>() {
        format!("Exception: {}", err)
    } else {
        "Unknown exception".to_string()
    }
}

fn report(result: io::Result<()>) {
    if let Err(e) = result {
        warn!(error = %e, "failed to write test report");
    }
}

thread_local! {
    static QUIET_PANICS: Cell<bool> = const { Cell::new(false) };
}

static INSTALL_HOOK: Once = Once::new();

/// Run `f` with panic messages raised on this thread routed to `tracing`
/// instead of stderr.
///
/// The hook is installed once per process and chains to the previous hook for
/// every thread that is not inside a run.
fn with_quiet_panics<R>(f: impl FnOnce() -> R) -> R {
    INSTALL_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if !quiet_panics_active() {
                return previous(info);
            }
            let location = info
                .location()
                .map(|l| format!("{}:{}", l.file(), l.line()))
                .unwrap_or_default();
            debug!(%location, message = %describe_panic(info.payload()), "panic in test");
        }));
    });

    let outer = QUIET_PANICS.with(|quiet| quiet.replace(true));
    let result = f();
    QUIET_PANICS.with(|quiet| quiet.set(outer));
    result
}

fn quiet_panics_active() -> bool {
    QUIET_PANICS.with(Cell::get)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::TestRegistrar;
    use crate::{check, check_eq};
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn quiet_runner() -> TestRunner {
        TestRunner::new(RunnerOptions {
            color: false,
            ..RunnerOptions::default()
        })
    }

    #[test]
    fn test_passing_test() {
        let case = TestCase::new("Domain", "Create", || {
            check!(true);
        });
        let result = quiet_runner().run_test(&case);
        assert_eq!(result.status, TestStatus::Passed);
        assert!(result.failures.is_empty());
    }

    #[test]
    fn test_accumulated_failures_without_panic() {
        let case = TestCase::new("Domain", "Multi", || {
            check!(false);
            check_eq!(1, 2);
            check!(1 > 2);
        });
        let result = quiet_runner().run_test(&case);
        assert_eq!(result.status, TestStatus::Failed);
        assert_eq!(result.failures.len(), 3);
    }

    #[test]
    fn test_panic_after_failures_appends_exception() {
        let case = TestCase::new("Task", "Throws", || {
            check!(false);
            check!(false);
            panic!("collector exploded");
        });
        let result = quiet_runner().run_test(&case);
        assert_eq!(result.status, TestStatus::Failed);
        assert_eq!(result.failures.len(), 3);
        assert_eq!(result.failures[2], "Exception: collector exploded");
    }

    #[test]
    fn test_unknown_panic_payload() {
        let case = TestCase::new("Task", "Odd", || std::panic::panic_any(42u32));
        let result = quiet_runner().run_test(&case);
        assert_eq!(result.failures, vec!["Unknown exception".to_string()]);
    }

    #[test]
    fn test_skipped_case_runs_nothing() {
        let calls = Rc::new(RefCell::new(0));
        let (s, b, t) = (calls.clone(), calls.clone(), calls.clone());
        let case = TestCase::new("Frame", "Skip", move || *b.borrow_mut() += 1)
            .with_setup(move || *s.borrow_mut() += 1)
            .with_teardown(move || *t.borrow_mut() += 1)
            .skip("not supported on this collector");

        let result = quiet_runner().run_test(&case);
        assert_eq!(result.status, TestStatus::Skipped);
        assert_eq!(result.message.as_deref(), Some("not supported on this collector"));
        assert_eq!(*calls.borrow(), 0);
    }

    #[test]
    fn test_setup_body_teardown_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let (s, b, t) = (log.clone(), log.clone(), log.clone());
        let case = TestCase::new("Fixture", "Order", move || b.borrow_mut().push("body"))
            .with_setup(move || s.borrow_mut().push("setup"))
            .with_teardown(move || t.borrow_mut().push("teardown"));

        let result = quiet_runner().run_test(&case);
        assert!(result.is_pass());
        assert_eq!(*log.borrow(), vec!["setup", "body", "teardown"]);
    }

    #[test]
    fn test_context_reset_between_tests() {
        let mut registry = TestRegistry::new();
        TestRegistrar::new(&mut registry)
            .test("Ctx", "Fails", || check!(false))
            .test("Ctx", "Passes", || check!(true));

        let mut sink = Vec::new();
        let summary = quiet_runner().run_with_output(&registry, &mut sink);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.passed, 1);
        assert!(summary.results[1].failures.is_empty());
    }

    #[test]
    fn test_exit_code() {
        let mut summary = RunSummary::default();
        assert_eq!(summary.exit_code(), 0);
        summary.record(TestResult::skipped("A.B".to_string(), "why"));
        assert_eq!(summary.exit_code(), 0);
        summary.record(TestResult {
            name: "A.C".to_string(),
            status: TestStatus::Failed,
            message: None,
            duration: Duration::ZERO,
            failures: vec!["x".to_string()],
        });
        assert_eq!(summary.exit_code(), 1);
    }

    #[test]
    fn test_describe_harness_error_payload() {
        let source = regex::Regex::new("[").unwrap_err();
        let payload: Box<dyn Any + Send> = Box::new(HarnessError::invalid_pattern("[", source));
        assert!(describe_panic(&*payload).starts_with("Exception: Invalid regex pattern '['"));
    }

    #[test]
    fn test_quiet_panics_scoped_to_calling_thread() {
        assert!(!quiet_panics_active());
        with_quiet_panics(|| {
            assert!(quiet_panics_active());
            with_quiet_panics(|| assert!(quiet_panics_active()));
            assert!(quiet_panics_active());

            let other = std::thread::spawn(quiet_panics_active).join().unwrap();
            assert!(!other);
        });
        assert!(!quiet_panics_active());
    }
}
