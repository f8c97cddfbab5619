//! Built-in suites, registered in execution order

use itt_harness::TestRegistrar;

mod assertions;
mod barrier;
mod collector_log;

pub fn register_all(registrar: &mut TestRegistrar<'_>) {
    assertions::register(registrar);
    barrier::register(registrar);
    collector_log::register(registrar);
}
