//! ThreadBarrier rendezvous behaviour under real threads

use itt_harness::assertions::{add_failures, take_failures};
use itt_harness::{check, check_eq, check_msg, timed_workload, TestRegistrar, ThreadBarrier};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

const WORKERS: usize = 4;

pub fn register(registrar: &mut TestRegistrar<'_>) {
    registrar
        .test("ThreadBarrier", "SingleParticipant", || {
            let barrier = ThreadBarrier::new(1);
            check!(barrier.wait());
            check!(barrier.wait());
        })
        .test("ThreadBarrier", "NoPartialRelease", no_partial_release)
        .test("ThreadBarrier", "OneLeaderPerRound", one_leader_per_round);
}

/// Each worker arrives at the barrier at a different time; nobody may observe
/// a phase counter short of the full participant count.
fn no_partial_release() {
    let barrier = ThreadBarrier::new(WORKERS);
    let arrived = AtomicUsize::new(0);

    thread::scope(|scope| {
        let handles: Vec<_> = (0..WORKERS)
            .map(|worker| {
                let barrier = &barrier;
                let arrived = &arrived;
                scope.spawn(move || {
                    for phase in 1..=2 {
                        timed_workload(Duration::from_millis((worker * 5) as u64));
                        arrived.fetch_add(1, Ordering::SeqCst);
                        barrier.wait();
                        check_eq!(WORKERS * phase, arrived.load(Ordering::SeqCst));
                        barrier.wait();
                    }
                    take_failures()
                })
            })
            .collect();

        for handle in handles {
            match handle.join() {
                Ok(failures) => add_failures(failures),
                Err(_) => check_msg!(false, "barrier worker panicked"),
            }
        }
    });
}

fn one_leader_per_round() {
    const ROUNDS: usize = 10;
    let barrier = ThreadBarrier::new(WORKERS);
    let leaders = AtomicUsize::new(0);

    thread::scope(|scope| {
        for _ in 0..WORKERS {
            scope.spawn(|| {
                for _ in 0..ROUNDS {
                    if barrier.wait() {
                        leaders.fetch_add(1, Ordering::SeqCst);
                    }
                }
            });
        }
    });

    check_eq!(leaders.load(Ordering::SeqCst), ROUNDS);
}
