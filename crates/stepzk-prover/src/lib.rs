//! stepzk-prover — invoke an external prover and classify what happened.
//!
//! The [`Prover`] trait is the seam between the CLI and whatever produces
//! proofs. It is deliberately infallible at the type level: every failure,
//! from a missing binary to a crash mid-run, comes back as a
//! [`ProverOutcome`] variant, so callers always have something to encode.
//!
//! [`ExternalProver`] is the production implementation. One call:
//! 1. checks the executable exists (else `ToolUnavailable`, nothing runs),
//! 2. writes the step log to a scratch file and reserves a scratch output file,
//! 3. runs `prove <start> <log> <steps> <end> <out>` to completion, once,
//! 4. maps exit 0 to `Success` (reading `<out>`), nonzero to `ProverFailed`,
//!    and any other error to `InternalError`.
//!
//! Scratch files are removed on every path, including prover crashes.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::module_name_repetitions)]

/// Subprocess-backed prover.
pub mod external;
/// Scoped scratch files for one invocation.
pub mod scratch;

pub use external::ExternalProver;

use stepzk_core::{ProofRequest, ProverOutcome};

/// Anything that can turn a [`ProofRequest`] into a [`ProverOutcome`].
pub trait Prover {
    /// Attempt a proof exactly once. Never retries.
    fn prove(&self, request: &ProofRequest) -> ProverOutcome;
}
