#![no_main]
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use tapelib_core::command::Request;
use tapelib_core::test_utils::*;

/// A structured command for fuzzing. Indices are folded into the default
/// layout so most requests name real locations.
#[derive(Arbitrary, Debug)]
enum FuzzOp {
    Load { slot: u8, drive: u8 },
    Unload { slot: u8, drive: u8 },
    Transfer { from: u8, to: u8 },
    Scan { slot: u8 },
    Park,
    Lock,
    Unlock,
    Step { ticks: u8 },
}

#[derive(Arbitrary, Debug)]
struct FuzzInput {
    ops: Vec<FuzzOp>,
}

fn slot(index: u8) -> String {
    format!("s{:02}{:02}", (index / 16) % 11, index % 16)
}

fn drive(index: u8) -> String {
    format!("d{:02}00", index % 3)
}

fuzz_target!(|input: FuzzInput| {
    let mut lib = fresh_library();

    // Limit operations to prevent timeouts.
    let max_ops = input.ops.len().min(200);

    for op in &input.ops[..max_ops] {
        let request = match op {
            FuzzOp::Load { slot: s, drive: d } => load(&slot(*s), &drive(*d)),
            FuzzOp::Unload { slot: s, drive: d } => unload(&slot(*s), &drive(*d)),
            FuzzOp::Transfer { from, to } => transfer(&slot(*from), &slot(*to)),
            FuzzOp::Scan { slot: s } => scan(&slot(*s)),
            FuzzOp::Park => Request::new("park"),
            FuzzOp::Lock => Request::new("lock"),
            FuzzOp::Unlock => Request::new("unlock"),
            FuzzOp::Step { ticks } => {
                lib.advance(u64::from(*ticks));
                continue;
            }
        };
        let _ = lib.handle(&request);
        assert!(lib.outstanding() <= 64);
    }

    let occupied = lib.locations().iter().filter(|l| l.occupied).count();
    assert_eq!(occupied, 7);
});
