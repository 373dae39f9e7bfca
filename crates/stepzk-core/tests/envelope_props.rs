//! Envelope properties that must hold for every outcome.
//!
//! These tests treat the envelope as the **only** thing a downstream contract
//! sees, so for any outcome it must:
//! - decode cleanly with the expected status,
//! - keep the message at exactly one word no matter how long the text, and
//! - re-encode byte-for-byte after a decode.

use proptest::prelude::*;
use stepzk_core::{encoded_len, ProverOutcome, ResultEnvelope, Status};

fn any_outcome() -> impl Strategy<Value = ProverOutcome> {
    prop_oneof![
        prop::collection::vec(any::<u8>(), 0..300)
            .prop_map(|proof_bytes| ProverOutcome::Success { proof_bytes }),
        ".{0,80}".prop_map(|detail| ProverOutcome::ToolUnavailable { detail }),
        (any::<i32>(), ".{0,200}", ".{0,200}").prop_map(|(exit_code, stderr, stdout)| {
            ProverOutcome::ProverFailed {
                exit_code,
                stderr,
                stdout,
            }
        }),
        ".{0,120}".prop_map(|detail| ProverOutcome::InternalError { detail }),
    ]
}

proptest! {
    #[test]
    fn every_outcome_decodes_with_matching_status(outcome in any_outcome()) {
        let bytes = ResultEnvelope::from(&outcome).encode();
        let env = ResultEnvelope::decode(&bytes).unwrap();

        if let ProverOutcome::Success { proof_bytes } = &outcome {
            prop_assert_eq!(env.status, Status::Success);
            prop_assert_eq!(env.message, [0u8; 32]);
            prop_assert_eq!(&env.payload, proof_bytes);
        } else {
            prop_assert_eq!(env.status, Status::Failure);
            prop_assert!(env.payload.is_empty());
            prop_assert_eq!(bytes.len(), encoded_len(0));
        }
        prop_assert_eq!(outcome.exit_code(), i32::from(env.status.code()));
    }

    #[test]
    fn decode_reencode_roundtrip(outcome in any_outcome()) {
        let bytes = ResultEnvelope::from(outcome).encode();
        let again = ResultEnvelope::decode(&bytes).unwrap().encode();
        prop_assert_eq!(again, bytes);
    }

    #[test]
    fn message_is_a_prefix_of_the_text(text in ".{0,100}") {
        let env = ResultEnvelope::failure(&text);
        let n = text.len().min(32);
        prop_assert_eq!(&env.message[..n], &text.as_bytes()[..n]);
        prop_assert!(env.message[n..].iter().all(|&b| b == 0));
    }
}

/// Failed provers with a wall of diagnostics still fit the fixed layout.
#[test]
fn verbose_failure_keeps_fixed_shape() {
    let outcome = ProverOutcome::ProverFailed {
        exit_code: 101,
        stderr: "panicked at 'receipt verification failed'\n".repeat(500),
        stdout: "x".repeat(10_000),
    };
    let env = ResultEnvelope::from(&outcome);
    assert_eq!(env.encode().len(), encoded_len(0));
    assert_eq!(env.message_text(), "exit 101: panicked at 'receipt v");
}
