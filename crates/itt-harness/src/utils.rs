//! Helpers shared by test bodies: scoped environment, workloads, unique names

use std::env;
use std::ffi::OsString;
use std::hint::black_box;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

/// Sets an environment variable for the guard's lifetime.
///
/// The previous value (or absence) is restored on drop. Environment mutation is
/// process-wide, so callers running in parallel test binaries must serialize.
#[derive(Debug)]
pub struct ScopedEnvVar {
    name: String,
    previous: Option<OsString>,
}

impl ScopedEnvVar {
    pub fn set(name: &str, value: &str) -> Self {
        let previous = env::var_os(name);
        env::set_var(name, value);
        Self {
            name: name.to_string(),
            previous,
        }
    }

    pub fn unset(name: &str) -> Self {
        let previous = env::var_os(name);
        env::remove_var(name);
        Self {
            name: name.to_string(),
            previous,
        }
    }
}

impl Drop for ScopedEnvVar {
    fn drop(&mut self) {
        match self.previous.take() {
            Some(value) => env::set_var(&self.name, value),
            None => env::remove_var(&self.name),
        }
    }
}

/// Burn CPU for roughly `iterations` floating point additions
pub fn cpu_workload(iterations: usize) -> f64 {
    let mut result = 0.0;
    for i in 0..iterations {
        result = black_box(result + i as f64 * 0.001);
    }
    result
}

/// Sleep-based workload for timing-sensitive tests
pub fn timed_workload(duration: Duration) {
    thread::sleep(duration);
}

static NAME_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// `prefix_<n>` with a process-wide increasing `n`, for domain and handle names
pub fn unique_name(prefix: &str) -> String {
    format!("{}_{}", prefix, NAME_COUNTER.fetch_add(1, Ordering::Relaxed))
}
