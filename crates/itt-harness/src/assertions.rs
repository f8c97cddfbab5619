//! Assertion context and non-fatal check macros
//!
//! Every check records into the calling thread's [`AssertionContext`] and returns
//! normally, so one test body can accumulate several independent failures.
//!
//! # Macros
//!
//! ## Basic
//! - `check!(cond)` / `check_true!(cond)` - condition must hold
//! - `check_false!(cond)` - condition must not hold
//! - `check_msg!(cond, msg)` - condition must hold, custom message
//!
//! ## Comparison
//! - `check_eq!(expected, actual)` - values must be equal
//! - `check_ne!(a, b)` - values must differ
//!
//! ## Null-ness
//! - `check_null!(ptr)` / `check_not_null!(ptr)` - see [`Nullable`]
//!
//! ## Panics
//! - `check_throws!(expr, Kind)` - `expr` must panic with a payload of type `Kind`
//!
//! # Thread scoping
//!
//! The context is thread-local. Failures recorded on a worker thread spawned by a
//! test body never reach the runner unless the body moves them across explicitly
//! with [`take_failures`] on the worker and [`add_failures`] on its own thread.

use std::any::Any;
use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};

/// Failure accumulator for the test running on the current thread
#[derive(Debug, Clone, Default)]
pub struct AssertionContext {
    failures: Vec<String>,
    current_test_failed: bool,
}

impl AssertionContext {
    /// Clear failures and the failed flag
    pub fn reset(&mut self) {
        self.failures.clear();
        self.current_test_failed = false;
    }

    /// Record a failure message and mark the test failed
    pub fn add_failure(&mut self, message: impl Into<String>) {
        self.failures.push(message.into());
        self.current_test_failed = true;
    }

    pub fn failed(&self) -> bool {
        self.current_test_failed
    }

    pub fn failures(&self) -> &[String] {
        &self.failures
    }
}

thread_local! {
    static CONTEXT: RefCell<AssertionContext> = RefCell::new(AssertionContext::default());
}

/// Run `f` against the current thread's context
pub fn with_context<R>(f: impl FnOnce(&mut AssertionContext) -> R) -> R {
    CONTEXT.with(|cell| f(&mut cell.borrow_mut()))
}

/// Reset the current thread's context
pub fn reset() {
    with_context(AssertionContext::reset);
}

/// Record a failure on the current thread's context
pub fn add_failure(message: impl Into<String>) {
    let message = message.into();
    with_context(|ctx| ctx.add_failure(message));
}

/// Append a batch of failures, typically drained from a worker thread
pub fn add_failures(messages: impl IntoIterator<Item = String>) {
    with_context(|ctx| {
        for message in messages {
            ctx.add_failure(message);
        }
    });
}

/// Whether the current thread's test has failed
pub fn failed() -> bool {
    with_context(|ctx| ctx.failed())
}

/// Snapshot of the current thread's failures
pub fn failures() -> Vec<String> {
    with_context(|ctx| ctx.failures().to_vec())
}

/// Drain the current thread's failures, leaving its context reset
pub fn take_failures() -> Vec<String> {
    with_context(|ctx| {
        ctx.current_test_failed = false;
        std::mem::take(&mut ctx.failures)
    })
}

/// Values that can be checked for null-ness by `check_null!` / `check_not_null!`
pub trait Nullable {
    fn is_null_value(&self) -> bool;
}

impl<T> Nullable for Option<T> {
    fn is_null_value(&self) -> bool {
        self.is_none()
    }
}

impl<T: ?Sized> Nullable for *const T {
    fn is_null_value(&self) -> bool {
        self.is_null()
    }
}

impl<T: ?Sized> Nullable for *mut T {
    fn is_null_value(&self) -> bool {
        self.is_null()
    }
}

impl<T: Nullable + ?Sized> Nullable for &T {
    fn is_null_value(&self) -> bool {
        (**self).is_null_value()
    }
}

/// Run `f` and report whether it panicked with a payload of exactly type `K`.
///
/// Any other payload, or no panic at all, yields `false`.
pub fn panics_with<K, R>(f: impl FnOnce() -> R) -> bool
where
    K: Any,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(_) => false,
        Err(payload) => (*payload).is::<K>(),
    }
}

#[macro_export]
macro_rules! check {
    ($cond:expr $(,)?) => {
        if !($cond) {
            $crate::assertions::add_failure(::std::format!(
                "{}:{}: Assertion failed: {}",
                ::std::file!(),
                ::std::line!(),
                ::std::stringify!($cond)
            ));
        }
    };
}

#[macro_export]
macro_rules! check_true {
    ($cond:expr $(,)?) => {
        $crate::check!($cond)
    };
}

#[macro_export]
macro_rules! check_false {
    ($cond:expr $(,)?) => {
        $crate::check!(!($cond))
    };
}

#[macro_export]
macro_rules! check_msg {
    ($cond:expr, $msg:expr $(,)?) => {
        if !($cond) {
            $crate::assertions::add_failure(::std::format!(
                "{}:{}: {}",
                ::std::file!(),
                ::std::line!(),
                $msg
            ));
        }
    };
}

#[macro_export]
macro_rules! check_eq {
    ($expected:expr, $actual:expr $(,)?) => {
        match (&$expected, &$actual) {
            (expected, actual) => {
                if !(*expected == *actual) {
                    $crate::assertions::add_failure(::std::format!(
                        "{}:{}: Expected '{}' == '{}', got {:?} != {:?}",
                        ::std::file!(),
                        ::std::line!(),
                        ::std::stringify!($expected),
                        ::std::stringify!($actual),
                        expected,
                        actual
                    ));
                }
            }
        }
    };
}

#[macro_export]
macro_rules! check_ne {
    ($left:expr, $right:expr $(,)?) => {
        match (&$left, &$right) {
            (left, right) => {
                if *left == *right {
                    $crate::assertions::add_failure(::std::format!(
                        "{}:{}: Expected '{}' != '{}', but both equal {:?}",
                        ::std::file!(),
                        ::std::line!(),
                        ::std::stringify!($left),
                        ::std::stringify!($right),
                        left
                    ));
                }
            }
        }
    };
}

#[macro_export]
macro_rules! check_null {
    ($ptr:expr $(,)?) => {
        if !$crate::assertions::Nullable::is_null_value(&$ptr) {
            $crate::assertions::add_failure(::std::format!(
                "{}:{}: Expected '{}' to be null, but it wasn't",
                ::std::file!(),
                ::std::line!(),
                ::std::stringify!($ptr)
            ));
        }
    };
}

#[macro_export]
macro_rules! check_not_null {
    ($ptr:expr $(,)?) => {
        if $crate::assertions::Nullable::is_null_value(&$ptr) {
            $crate::assertions::add_failure(::std::format!(
                "{}:{}: Expected '{}' to be non-null",
                ::std::file!(),
                ::std::line!(),
                ::std::stringify!($ptr)
            ));
        }
    };
}

#[macro_export]
macro_rules! check_throws {
    ($expr:expr, $kind:ty $(,)?) => {
        if !$crate::assertions::panics_with::<$kind, _>(|| $expr) {
            $crate::assertions::add_failure(::std::format!(
                "{}:{}: Expected '{}' to throw {}",
                ::std::file!(),
                ::std::line!(),
                ::std::stringify!($expr),
                ::std::stringify!($kind)
            ));
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::thread;

    #[derive(Debug)]
    struct DomainError;

    #[test]
    fn test_context_reset_clears_state() {
        let mut ctx = AssertionContext::default();
        ctx.add_failure("one");
        assert!(ctx.failed());
        ctx.reset();
        assert!(!ctx.failed());
        assert!(ctx.failures().is_empty());
    }

    #[test]
    fn test_checks_accumulate_in_order() {
        reset();
        check!(1 + 1 == 3);
        check_eq!(2, 1 + 2);
        check_ne!(5, 5);
        check_true!(true);

        let recorded = failures();
        assert!(failed());
        assert_eq!(recorded.len(), 3);
        assert!(recorded[0].ends_with("Assertion failed: 1 + 1 == 3"));
        assert!(recorded[1].ends_with("Expected '2' == '1 + 2', got 2 != 3"));
        assert!(recorded[2].ends_with("Expected '5' != '5', but both equal 5"));
        assert!(recorded[0].contains("assertions.rs:"));
        reset();
    }

    #[test]
    fn test_check_false_and_msg() {
        reset();
        check_false!(2 > 1);
        check_msg!(false, "custom detail");
        let recorded = failures();
        assert_eq!(recorded.len(), 2);
        assert!(recorded[0].ends_with("Assertion failed: !(2 > 1)"));
        assert!(recorded[1].ends_with(": custom detail"));
        reset();
    }

    #[test]
    fn test_null_checks_on_options_and_pointers() {
        reset();
        let missing: Option<u32> = None;
        let present = Some(7u32);
        let null: *const u8 = std::ptr::null();
        let value = 3u8;
        let valid: *const u8 = &value;

        check_null!(missing);
        check_not_null!(present);
        check_null!(null);
        check_not_null!(valid);
        assert!(!failed());

        check_not_null!(missing);
        check_null!(valid);
        let recorded = failures();
        assert_eq!(recorded.len(), 2);
        assert!(recorded[0].ends_with("Expected 'missing' to be non-null"));
        assert!(recorded[1].ends_with("Expected 'valid' to be null, but it wasn't"));
        reset();
    }

    #[test]
    fn test_check_throws_matches_exact_kind() {
        reset();
        check_throws!(std::panic::panic_any(DomainError), DomainError);
        assert!(!failed());

        check_throws!(panic!("plain message"), DomainError);
        check_throws!(1 + 1, DomainError);
        let recorded = failures();
        assert_eq!(recorded.len(), 2);
        assert!(recorded[1].ends_with("Expected '1 + 1' to throw DomainError"));
        reset();
    }

    #[test]
    fn test_panics_with_str_payload() {
        assert!(panics_with::<&'static str, ()>(|| panic!("literal")));
        assert!(!panics_with::<String, ()>(|| panic!("literal")));
    }

    #[test]
    fn test_worker_failures_stay_on_worker_thread() {
        reset();
        let worker_failures = thread::spawn(|| {
            check!(false);
            let drained = take_failures();
            assert!(!failed());
            drained
        })
        .join()
        .unwrap();

        assert!(!failed());
        assert_eq!(worker_failures.len(), 1);

        add_failures(worker_failures);
        assert!(failed());
        assert_eq!(failures().len(), 1);
        reset();
    }
}
