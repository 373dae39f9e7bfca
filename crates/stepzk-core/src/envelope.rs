//! The fixed-layout result envelope written on standard output.
//!
//! Wire format: Solidity ABI parameter encoding of
//! `(bytes32 status, bytes32 message, bytes payload)`:
//!
//! ```text
//! word 0   status   0 = success, 1 = failure (big-endian)
//! word 1   message  UTF-8, cut at 32 bytes, zero right-padded
//! word 2   0x60     offset of the dynamic `payload`
//! word 3   len      payload length in bytes
//! word 4.. payload  zero right-padded to a whole word
//! ```
//!
//! Every [`ProverOutcome`] maps to exactly one envelope, so the success
//! channel always carries something a contract can decode. Message text past
//! 32 bytes is dropped on the wire; full diagnostics go to the logs.

use crate::error::EnvelopeError;
use crate::outcome::ProverOutcome;
use alloy_primitives::{Bytes, B256};
use alloy_sol_types::SolValue;
use serde::Serialize;

/// Width of the message field in bytes.
pub const MESSAGE_LEN: usize = 32;

/// ABI word size.
pub const WORD_LEN: usize = 32;

/// Logical result carried in the status word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Proof produced.
    Success,
    /// Any failure variant.
    Failure,
}

impl Status {
    /// Numeric value of the status word.
    #[inline]
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Failure => 1,
        }
    }

    /// The full 32-byte status word.
    #[must_use]
    pub fn word(self) -> B256 {
        B256::with_last_byte(self.code())
    }

    fn from_word(word: &B256) -> Result<Self, EnvelopeError> {
        if word == &Self::Success.word() {
            Ok(Self::Success)
        } else if word == &Self::Failure.word() {
            Ok(Self::Failure)
        } else {
            Err(EnvelopeError::UnknownStatus(hex::encode(word)))
        }
    }
}

/// The three-field record returned regardless of outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultEnvelope {
    /// Success or failure.
    pub status: Status,
    /// Fixed-width message; all zero on success.
    pub message: [u8; MESSAGE_LEN],
    /// Proof artifact on success; empty on failure.
    pub payload: Vec<u8>,
}

impl ResultEnvelope {
    /// Envelope carrying a proof.
    #[must_use]
    pub const fn success(payload: Vec<u8>) -> Self {
        Self {
            status: Status::Success,
            message: [0u8; MESSAGE_LEN],
            payload,
        }
    }

    /// Envelope carrying a (truncated) failure message and no payload.
    #[must_use]
    pub fn failure(message: &str) -> Self {
        Self {
            status: Status::Failure,
            message: pack_message(message),
            payload: Vec::new(),
        }
    }

    /// ABI-encode the three fields.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        (
            self.status.word(),
            B256::from(self.message),
            Bytes::copy_from_slice(&self.payload),
        )
            .abi_encode_params()
    }

    /// `0x`-prefixed lowercase hex of [`ResultEnvelope::encode`].
    #[must_use]
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.encode()))
    }

    /// Strictly decode an encoded envelope.
    pub fn decode(data: &[u8]) -> Result<Self, EnvelopeError> {
        let (status, message, payload) = <(B256, B256, Bytes)>::abi_decode_params(data, true)?;
        Ok(Self {
            status: Status::from_word(&status)?,
            message: message.0,
            payload: payload.to_vec(),
        })
    }

    /// Decode hex text, with or without a `0x` prefix; surrounding whitespace is ignored.
    pub fn from_hex(text: &str) -> Result<Self, EnvelopeError> {
        let text = text.trim();
        let bytes = hex::decode(text.strip_prefix("0x").unwrap_or(text))?;
        Self::decode(&bytes)
    }

    /// Message bytes up to the zero padding, lossily read as UTF-8.
    #[must_use]
    pub fn message_text(&self) -> String {
        let end = self
            .message
            .iter()
            .rposition(|&b| b != 0)
            .map_or(0, |i| i + 1);
        String::from_utf8_lossy(&self.message[..end]).into_owned()
    }

    /// Serializable view for operator tooling.
    #[must_use]
    pub fn view(&self) -> EnvelopeView {
        EnvelopeView {
            status: self.status,
            message: self.message_text(),
            payload: format!("0x{}", hex::encode(&self.payload)),
            payload_len: self.payload.len(),
        }
    }
}

impl From<&ProverOutcome> for ResultEnvelope {
    fn from(outcome: &ProverOutcome) -> Self {
        match outcome {
            ProverOutcome::Success { proof_bytes } => Self::success(proof_bytes.clone()),
            ProverOutcome::ToolUnavailable { .. }
            | ProverOutcome::ProverFailed { .. }
            | ProverOutcome::InternalError { .. } => Self::failure(&outcome.message()),
        }
    }
}

impl From<ProverOutcome> for ResultEnvelope {
    fn from(outcome: ProverOutcome) -> Self {
        match outcome {
            ProverOutcome::Success { proof_bytes } => Self::success(proof_bytes),
            failed => Self::from(&failed),
        }
    }
}

/// Human-readable rendering of a decoded envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvelopeView {
    /// Decoded status.
    pub status: Status,
    /// Message text without padding.
    pub message: String,
    /// `0x`-prefixed payload hex.
    pub payload: String,
    /// Payload length in bytes.
    pub payload_len: usize,
}

/// Cut `text` to [`MESSAGE_LEN`] bytes and zero-pad the rest.
///
/// The cut is byte-wise and may split a multi-byte character.
#[must_use]
pub fn pack_message(text: &str) -> [u8; MESSAGE_LEN] {
    let mut out = [0u8; MESSAGE_LEN];
    let bytes = text.as_bytes();
    let n = bytes.len().min(MESSAGE_LEN);
    out[..n].copy_from_slice(&bytes[..n]);
    out
}

/// Encoded size of an envelope whose payload is `payload_len` bytes.
#[must_use]
pub const fn encoded_len(payload_len: usize) -> usize {
    4 * WORD_LEN + payload_len.div_ceil(WORD_LEN) * WORD_LEN
}
