//! The closed result of one prover invocation.

use std::fmt;

/// What happened when a proof was requested. Produced once, consumed once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProverOutcome {
    /// Prover exited 0; `proof_bytes` is what it wrote to its output path.
    Success {
        /// Proof artifact.
        proof_bytes: Vec<u8>,
    },
    /// The configured prover executable does not exist.
    ToolUnavailable {
        /// Names the missing path.
        detail: String,
    },
    /// Prover ran and exited nonzero (or was killed).
    ProverFailed {
        /// Exit code; `128 + signal` for signal deaths on Unix.
        exit_code: i32,
        /// Captured standard error.
        stderr: String,
        /// Captured standard output.
        stdout: String,
    },
    /// Anything else that went wrong around the prover.
    InternalError {
        /// Human-readable description.
        detail: String,
    },
}

impl ProverOutcome {
    /// Outcome for a prover missing at `path`.
    #[must_use]
    pub fn tool_unavailable(path: &std::path::Path) -> Self {
        Self::ToolUnavailable {
            detail: format!("prover not found: {}", path.display()),
        }
    }

    /// Outcome wrapping any error raised while orchestrating a run.
    ///
    /// Uses the alternate `Display` so `anyhow` context chains are kept.
    #[must_use]
    pub fn internal(err: impl fmt::Display) -> Self {
        Self::InternalError {
            detail: format!("{err:#}"),
        }
    }

    /// Whether a proof was produced.
    #[inline]
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Process exit status mirroring this outcome: 0 on success, 1 otherwise.
    #[inline]
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        if self.is_success() {
            0
        } else {
            1
        }
    }

    /// Short text for the envelope's message field (truncated by the encoder).
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Success { .. } => String::new(),
            Self::ToolUnavailable { detail } | Self::InternalError { detail } => detail.clone(),
            Self::ProverFailed {
                exit_code,
                stderr,
                stdout,
            } => match first_line(stderr).or_else(|| first_line(stdout)) {
                Some(line) => format!("exit {exit_code}: {line}"),
                None => format!("exit {exit_code}"),
            },
        }
    }
}

/// Exit code of a finished child; `128 + signal` for a signal death on Unix,
/// `-1` when neither is available.
#[must_use]
pub fn exit_code_of(status: std::process::ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(sig) = status.signal() {
            return 128 + sig;
        }
    }
    -1
}

fn first_line(text: &str) -> Option<&str> {
    text.lines().map(str::trim).find(|l| !l.is_empty())
}

impl fmt::Display for ProverOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success { proof_bytes } => write!(f, "proof ({} bytes)", proof_bytes.len()),
            Self::ToolUnavailable { detail } => write!(f, "tool unavailable: {detail}"),
            Self::ProverFailed {
                exit_code,
                stderr,
                stdout,
            } => write!(
                f,
                "prover failed with exit code {exit_code}\nstderr: {}\nstdout: {}",
                stderr.trim(),
                stdout.trim()
            ),
            Self::InternalError { detail } => write!(f, "internal error: {detail}"),
        }
    }
}
