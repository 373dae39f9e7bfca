//! Crate-local error types.
//!
//! Orchestration code (the prover crate, the CLI) works in `anyhow::Result`;
//! these typed errors exist where callers branch on the failure kind.

use std::path::PathBuf;
use thiserror::Error;

/// Failure while turning raw positional arguments into a [`crate::ProofRequest`].
#[derive(Debug, Error)]
pub enum RequestError {
    /// Not exactly four positional values were supplied.
    #[error("expected 4 arguments <startHash> <endHash> <numCycles> <stepLogPath>, got {got}")]
    InvalidArgumentCount {
        /// Number of values actually supplied.
        got: usize,
    },
    /// The step count is not an unsigned decimal integer.
    #[error("invalid step count {raw:?}: expected an unsigned decimal integer")]
    InvalidStepCount {
        /// The value as supplied.
        raw: String,
    },
    /// The step log does not exist or cannot be read.
    #[error("cannot read step log {}: {source}", path.display())]
    LogUnreadable {
        /// Resolved (absolute, home-expanded) path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl RequestError {
    /// Whether this error aborts the run before any envelope is produced.
    ///
    /// Only wrong arity is fatal; everything else is reported through an
    /// `InternalError` envelope.
    #[inline]
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::InvalidArgumentCount { .. })
    }
}

/// Failure while decoding a [`crate::ResultEnvelope`].
#[derive(Debug, Error)]
pub enum EnvelopeError {
    /// Input is not valid hex.
    #[error("envelope is not valid hex: {0}")]
    Hex(#[from] hex::FromHexError),
    /// Input is not a well-formed `(bytes32, bytes32, bytes)` encoding.
    #[error("malformed envelope encoding: {0}")]
    Abi(#[from] alloy_sol_types::Error),
    /// Status word is neither 0 nor 1.
    #[error("unknown envelope status word 0x{0}")]
    UnknownStatus(String),
}

/// Failure while loading a [`crate::BridgeConfig`] file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("reading config {}: {source}", path.display())]
    Read {
        /// Config file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// TOML syntax or schema error.
    #[error("parsing TOML config: {0}")]
    Toml(#[from] toml::de::Error),
    /// JSON syntax or schema error.
    #[error("parsing JSON config: {0}")]
    Json(#[from] serde_json::Error),
    /// Extension is neither `.toml` nor `.json`.
    #[error("unsupported config extension: {0} (supported: .toml, .json)")]
    UnsupportedExtension(String),
    /// Path has no extension to select a format from.
    #[error("config path has no extension (expected .toml or .json): {}", .0.display())]
    NoExtension(PathBuf),
}
