//! Fuzz target for wire payload deserialization
//!
//! Channel events and gateway responses arrive as JSON from an untrusted
//! transport; decoding must never panic or hang.
//!
//! # Invariants
//!
//! - Arbitrary bytes never panic any decoder
//! - Sequence strings parse or error, never crash, at any length
//! - A successfully decoded `Seq` round-trips through its display form

#![no_main]

use libfuzzer_sys::fuzz_target;
use parlor_proto::{BroadcastEvent, ConversationPage, GatewayError, MessageRecord, Seq};

fuzz_target!(|data: &[u8]| {
    let _ = serde_json::from_slice::<BroadcastEvent>(data);
    let _ = serde_json::from_slice::<ConversationPage>(data);
    let _ = serde_json::from_slice::<MessageRecord>(data);
    let _ = serde_json::from_slice::<GatewayError>(data);

    if let Ok(text) = std::str::from_utf8(data) {
        if let Ok(seq) = Seq::parse(text) {
            let redecoded = Seq::parse(&seq.to_string()).expect("display form must reparse");
            assert_eq!(seq, redecoded);
        }
    }
});
