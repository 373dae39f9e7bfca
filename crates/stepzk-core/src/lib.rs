//! stepzk-core — request building, prover outcomes, and the result envelope.
//!
//! This crate defines the **stable boundary** of the stepzk bridge:
//! - the proof request handed to an external prover (`ProofRequest`, `Digest`),
//! - the closed set of things that can happen when proving (`ProverOutcome`),
//! - the fixed-layout ABI record every run ends in (`ResultEnvelope`), and
//! - the injected configuration naming the external tools (`BridgeConfig`).
//!
//! ```no_run
//! use stepzk_core::{ProofRequest, ProverOutcome, ResultEnvelope};
//! # fn run(args: &[String]) -> anyhow::Result<()> {
//! let request = ProofRequest::from_args(args)?;
//! // ... hand `request` to a prover, get an outcome back ...
//! # let outcome = ProverOutcome::Success { proof_bytes: vec![0xde, 0xad] };
//! let envelope = ResultEnvelope::from(&outcome);
//! print!("{}", envelope.to_hex());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::doc_markdown
)]

/// Injected tool locations and emulator settings.
pub mod config;
/// ABI encoding/decoding of the three-field result envelope.
pub mod envelope;
/// Typed errors for request building, envelope decoding and configuration.
pub mod error;
/// Closed outcome type produced by every prover invocation.
pub mod outcome;
/// Request builder: arity, digest normalization, log loading.
pub mod request;

pub use config::*;
pub use envelope::*;
pub use error::*;
pub use outcome::*;
pub use request::*;

/// Commonly-used items for quick imports.
///
/// ```rust
/// use stepzk_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        config::BridgeConfig,
        envelope::{ResultEnvelope, Status},
        outcome::ProverOutcome,
        request::{Digest, ProofRequest},
    };
}
