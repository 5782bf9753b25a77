#![no_main]

//! Snapshot loader fuzzer.
//!
//! Arbitrary bytes must never make decoding or restoring panic; anything
//! that restores must satisfy every invariant.

use landlord::game::{check_invariants, GameSession, SeededRandomness};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(snapshot) = landlord::persistence::from_json(text) else {
        return;
    };
    if let Ok(session) = GameSession::restore(snapshot, SeededRandomness::new(0)) {
        assert!(check_invariants(&session).is_empty());
    }
});
