//! Request builder: four raw positional values in, one [`ProofRequest`] out.
//!
//! Steps, in order: arity check, digest normalization (one leading `0x`
//! stripped), step-count parse, log path resolution (`~` expansion, made
//! absolute), then a single whole-file read of the step log.

use crate::error::RequestError;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Number of positional values a request is built from.
pub const REQUEST_ARITY: usize = 4;

/// Byte width of a state digest.
pub const DIGEST_LEN: usize = 32;

/// A state digest as hex text with any `0x` prefix removed.
///
/// The text is otherwise left untouched: a digest that is not 64 hex
/// characters is still forwarded to the prover, which is the component that
/// rejects it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Digest(String);

impl Digest {
    /// Strip one leading `0x` and keep the rest verbatim.
    #[must_use]
    pub fn normalize(raw: &str) -> Self {
        Self(raw.strip_prefix("0x").unwrap_or(raw).to_owned())
    }

    /// Hex text without prefix, exactly as forwarded to the prover.
    #[inline]
    #[must_use]
    pub fn as_hex(&self) -> &str {
        &self.0
    }

    /// Decoded bytes, if the text is exactly 32 bytes of hex.
    #[must_use]
    pub fn to_bytes(&self) -> Option<[u8; DIGEST_LEN]> {
        let mut out = [0u8; DIGEST_LEN];
        hex::decode_to_slice(&self.0, &mut out).ok()?;
        Some(out)
    }

    /// Whether [`Digest::to_bytes`] would succeed.
    #[inline]
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.to_bytes().is_some()
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A claimed transition plus the evidence log, ready for the prover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofRequest {
    /// State the transition starts from.
    pub start: Digest,
    /// State the transition claims to reach.
    pub end: Digest,
    /// Number of machine steps between the two states.
    pub step_count: u64,
    /// `step_count` exactly as the caller wrote it; this is what the prover sees.
    pub step_count_raw: String,
    /// Absolute path the log was loaded from.
    pub log_path: PathBuf,
    /// Full content of the step log.
    pub step_log: Vec<u8>,
}

impl ProofRequest {
    /// The one check that runs before anything else, configuration included.
    pub const fn check_arity<S>(args: &[S]) -> Result<(), RequestError> {
        if args.len() == REQUEST_ARITY {
            Ok(())
        } else {
            Err(RequestError::InvalidArgumentCount { got: args.len() })
        }
    }

    /// Build a request from `<startHash> <endHash> <numCycles> <stepLogPath>`.
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> Result<Self, RequestError> {
        let [start, end, steps, log] = args else {
            return Err(RequestError::InvalidArgumentCount { got: args.len() });
        };

        let start = Digest::normalize(start.as_ref());
        let end = Digest::normalize(end.as_ref());
        for (which, d) in [("start", &start), ("end", &end)] {
            if !d.is_well_formed() {
                tracing::warn!(which, digest = %d, "digest is not 32 bytes of hex; forwarding as-is");
            }
        }

        let raw_steps = steps.as_ref();
        let step_count = raw_steps
            .parse::<u64>()
            .map_err(|_| RequestError::InvalidStepCount {
                raw: raw_steps.to_owned(),
            })?;

        let log_path = resolve_log_path(log.as_ref());
        let step_log = fs::read(&log_path).map_err(|source| RequestError::LogUnreadable {
            path: log_path.clone(),
            source,
        })?;

        tracing::debug!(
            start = %start,
            end = %end,
            step_count,
            log = %log_path.display(),
            log_bytes = step_log.len(),
            "built proof request"
        );

        Ok(Self {
            start,
            end,
            step_count,
            step_count_raw: raw_steps.to_owned(),
            log_path,
            step_log,
        })
    }
}

/// Expand a leading `~` to the home directory and make the path absolute.
///
/// Falls back to the unexpanded / relative form when the home or current
/// directory cannot be determined; the subsequent read reports the failure.
#[must_use]
pub fn resolve_log_path(raw: &str) -> PathBuf {
    let expanded = match raw.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => home::home_dir()
            .map_or_else(
                || PathBuf::from(raw),
                |h| h.join(rest.trim_start_matches('/')),
            ),
        _ => PathBuf::from(raw),
    };
    absolute(&expanded)
}

pub(crate) fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_owned();
    }
    std::env::current_dir().map_or_else(|_| path.to_owned(), |cwd| cwd.join(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const A32: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
    const B32: &str = "bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";

    fn log_file(bytes: &[u8]) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(bytes).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn builds_request_from_four_values() {
        let log = log_file(b"step log \x00\x01\x02");
        let path = log.path().to_str().unwrap();
        let req = ProofRequest::from_args(&[A32, B32, "10", path]).unwrap();

        assert_eq!(req.start.as_hex(), &A32[2..]);
        assert_eq!(req.end.as_hex(), B32);
        assert_eq!(req.start.to_bytes(), Some([0xaa; 32]));
        assert_eq!(req.end.to_bytes(), Some([0xbb; 32]));
        assert_eq!(req.step_count, 10);
        assert_eq!(req.step_count_raw, "10");
        assert_eq!(req.log_path, log.path());
        assert_eq!(req.step_log, b"step log \x00\x01\x02");
    }

    #[test]
    fn wrong_arity_is_reported_with_count() {
        let err = ProofRequest::from_args(&[A32, B32, "10"]).unwrap_err();
        assert!(matches!(err, RequestError::InvalidArgumentCount { got: 3 }));

        let err = ProofRequest::from_args(&[A32, B32, "10", "/tmp/x", "extra"]).unwrap_err();
        assert!(matches!(err, RequestError::InvalidArgumentCount { got: 5 }));

        let none: [&str; 0] = [];
        assert!(ProofRequest::from_args(&none).unwrap_err().is_fatal());
        assert!(ProofRequest::check_arity(&none).unwrap_err().is_fatal());
        assert!(ProofRequest::check_arity(&["a", "b", "c", "d"]).is_ok());
    }

    #[test]
    fn missing_log_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.bin");
        let err =
            ProofRequest::from_args(&[A32, B32, "1", missing.to_str().unwrap()]).unwrap_err();
        match err {
            RequestError::LogUnreadable { path, .. } => assert_eq!(path, missing),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn non_numeric_step_count_is_rejected() {
        let log = log_file(b"x");
        let err = ProofRequest::from_args(&[A32, B32, "ten", log.path().to_str().unwrap()])
            .unwrap_err();
        assert!(matches!(err, RequestError::InvalidStepCount { raw } if raw == "ten"));
    }

    #[test]
    fn step_count_text_is_kept_verbatim() {
        let log = log_file(b"x");
        let path = log.path().to_str().unwrap();
        for raw in ["010", "+10"] {
            let req = ProofRequest::from_args(&[A32, B32, raw, path]).unwrap();
            assert_eq!(req.step_count, 10);
            assert_eq!(req.step_count_raw, raw);
        }
    }

    #[test]
    fn malformed_digest_is_passed_through() {
        let log = log_file(b"x");
        let req = ProofRequest::from_args(&["0xnothex", "0x0x12", "0", log.path().to_str().unwrap()])
            .unwrap();
        assert_eq!(req.start.as_hex(), "nothex");
        assert!(!req.start.is_well_formed());
        // Only the first prefix goes.
        assert_eq!(req.end.as_hex(), "0x12");
    }

    #[test]
    fn home_shorthand_expands() {
        let Some(home) = home::home_dir() else {
            return;
        };
        assert_eq!(resolve_log_path("~/logs/step.bin"), home.join("logs/step.bin"));
        assert_eq!(resolve_log_path("~"), home);
        // `~user` is not shorthand for the current user's home.
        assert!(resolve_log_path("~other/x").ends_with("~other/x"));
    }

    #[test]
    fn relative_paths_become_absolute() {
        let p = resolve_log_path("some/relative.log");
        assert!(p.is_absolute());
        assert!(p.ends_with("some/relative.log"));
    }
}
