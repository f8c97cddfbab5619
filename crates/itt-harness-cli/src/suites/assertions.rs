//! Assertion macros, fixtures and cross-thread failure hand-off

use itt_harness::assertions::{self, add_failures, take_failures};
use itt_harness::{
    check, check_eq, check_false, check_msg, check_ne, check_not_null, check_null, check_throws,
    check_true, cpu_workload, unique_name, Fixture, TestRegistrar,
};
use std::cell::Cell;
use std::thread;

#[derive(Debug)]
struct DomainError;

thread_local! {
    static DOMAIN_OPEN: Cell<bool> = const { Cell::new(false) };
}

/// Opens a pretend domain for the duration of one test
struct OpenDomain;

impl Fixture for OpenDomain {
    fn set_up() {
        DOMAIN_OPEN.with(|open| open.set(true));
    }

    fn tear_down() {
        DOMAIN_OPEN.with(|open| open.set(false));
    }
}

pub fn register(registrar: &mut TestRegistrar<'_>) {
    registrar
        .test("Assertions", "BasicChecks", basic_checks)
        .test("Assertions", "NullChecks", null_checks)
        .test("Assertions", "ThrowChecks", throw_checks)
        .test("Assertions", "RecordedMessages", recorded_messages)
        .fixture_test::<OpenDomain>("Assertions", "FixtureWrapsBody", || {
            check!(DOMAIN_OPEN.with(Cell::get));
        })
        .test("Assertions", "WorkerHandOff", worker_hand_off)
        .test("Assertions", "UniqueNames", || {
            check_ne!(unique_name("domain"), unique_name("domain"));
        })
        .skipped(
            "Assertions",
            "LiveCollector",
            "requires a reference collector library",
            || check!(false),
        );
}

fn basic_checks() {
    let name = "org.itt.domain";
    check!(name.starts_with("org."));
    check_true!(name.len() > 3);
    check_false!(name.is_empty());
    check_msg!(name.contains("itt"), "domain name lost its vendor segment");
    check_eq!(name.split('.').count(), 3);
    check_ne!(name, "org.itt.other");
}

fn null_checks() {
    let handle: Option<&str> = None;
    let value = 7u32;
    let raw: *const u32 = &value;

    check_null!(handle);
    check_null!(std::ptr::null::<u8>());
    check_not_null!(Some(value));
    check_not_null!(raw);
}

fn throw_checks() {
    check_throws!(std::panic::panic_any(DomainError), DomainError);
    check_throws!(panic!("bad handle"), &str);
}

// Failures recorded by a check can be inspected and discarded, which keeps
// this test green while asserting the exact messages.
fn recorded_messages() {
    check_eq!(1 + 1, 3);
    check_null!(Some(1));
    let recorded = take_failures();

    check_eq!(recorded.len(), 2);
    check!(recorded[0].contains("Expected '1 + 1' == '3', got 2 != 3"));
    check!(recorded[1].ends_with("Expected 'Some(1)' to be null, but it wasn't"));
    check_false!(assertions::failed());
}

fn worker_hand_off() {
    let worker = thread::spawn(|| {
        check!(cpu_workload(10_000) > 0.0);
        take_failures()
    });

    match worker.join() {
        Ok(failures) => {
            check!(failures.is_empty());
            add_failures(failures);
        }
        Err(_) => check_msg!(false, "worker thread panicked"),
    }
}
