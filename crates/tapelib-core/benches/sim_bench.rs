//! Criterion benchmarks for the tape library simulator.
//!
//! Three benchmark groups:
//! - `tick`: a single step with a long motion queue pending
//! - `admission`: parsing, admitting and dispatching one command
//! - `workload`: draining a full queue of loads and unloads to idle

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use tapelib_core::library::Library;
use tapelib_core::test_utils::*;

// ===========================================================================
// Workloads
// ===========================================================================

/// Sixteen moves shuttling the seeded tapes between slots and drives.
fn busy_library() -> Library {
    let mut lib = fresh_library();
    for i in 0..7u8 {
        let slot = format!("s00{i:02}");
        let spare = format!("s{:02}{:02}", 10 - i, 15 - i);
        lib.handle(&transfer(&slot, &spare)).unwrap();
    }
    for i in 0..4u8 {
        let spare = format!("s{:02}{:02}", 10 - i, 15 - i);
        let drive = format!("d{:02}00", i % 2);
        lib.handle(&load(&spare, &drive)).unwrap();
        lib.handle(&unload(&spare, &drive)).unwrap();
    }
    lib
}

fn bench_tick(c: &mut Criterion) {
    c.bench_function("tick/busy_queue", |b| {
        b.iter_batched_ref(busy_library, |lib| lib.step(), BatchSize::SmallInput)
    });
}

fn bench_admission(c: &mut Criterion) {
    let request = load("s0000", "d0100");
    c.bench_function("admission/load", |b| {
        b.iter_batched_ref(
            fresh_library,
            |lib| lib.handle(&request),
            BatchSize::SmallInput,
        )
    });
}

fn bench_workload(c: &mut Criterion) {
    c.bench_function("workload/drain_to_idle", |b| {
        b.iter_batched_ref(
            busy_library,
            |lib| run_until_idle(lib, 20_000),
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_tick, bench_admission, bench_workload);
criterion_main!(benches);
