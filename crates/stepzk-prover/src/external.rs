//! [`ExternalProver`]: one synchronous subprocess per request.

use crate::scratch::ScratchFiles;
use crate::Prover;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Instant;
use stepzk_core::{exit_code_of, resolve_executable, BridgeConfig, ProofRequest, ProverOutcome};
use tracing::{error, info, warn};

/// First positional argument selecting the prover's proving mode.
pub const PROVE_SUBCOMMAND: &str = "prove";

/// Runs a prover executable found at a configured path.
#[derive(Debug, Clone)]
pub struct ExternalProver {
    executable: PathBuf,
    scratch_dir: Option<PathBuf>,
}

impl ExternalProver {
    /// Prover at `executable`; scratch files go to the system temp directory.
    #[must_use]
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            scratch_dir: None,
        }
    }

    /// Prover named by [`BridgeConfig::prover_path`].
    #[must_use]
    pub fn from_config(cfg: &BridgeConfig) -> Self {
        Self::new(&cfg.prover_path)
    }

    /// Place scratch files in `dir` instead of the system temp directory.
    #[must_use]
    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = Some(dir.into());
        self
    }

    /// Configured executable path.
    #[must_use]
    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// The file that would be launched, if there is one.
    #[must_use]
    pub fn resolve(&self) -> Option<PathBuf> {
        resolve_executable(&self.executable)
    }

    /// Whether the configured location names an existing file.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.resolve().is_some()
    }

    /// `prove <start> <log> <steps> <end> <out>`, stdin closed, outputs captured.
    fn command(program: &Path, request: &ProofRequest, log: &Path, out: &Path) -> Command {
        let mut cmd = Command::new(program);
        cmd.arg(PROVE_SUBCOMMAND)
            .arg(request.start.as_hex())
            .arg(log)
            .arg(&request.step_count_raw)
            .arg(request.end.as_hex())
            .arg(out)
            .stdin(Stdio::null());
        cmd
    }

    fn run(&self, program: &Path, request: &ProofRequest) -> Result<ProverOutcome> {
        let scratch = ScratchFiles::create(self.scratch_dir.as_deref(), &request.step_log)?;
        let mut cmd = Self::command(program, request, scratch.log_path(), scratch.output_path());

        info!(
            prover = %program.display(),
            start = %request.start,
            end = %request.end,
            steps = request.step_count,
            "invoking prover"
        );
        let t0 = Instant::now();
        let output = cmd
            .output()
            .with_context(|| format!("running prover {}", program.display()))?;
        let elapsed_ms = u64::try_from(t0.elapsed().as_millis()).unwrap_or(u64::MAX);

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        let outcome = if output.status.success() {
            let proof_bytes = fs::read(scratch.output_path()).with_context(|| {
                format!(
                    "reading proof artifact {}",
                    scratch.output_path().display()
                )
            })?;
            info!(bytes = proof_bytes.len(), elapsed_ms, "prover succeeded");
            ProverOutcome::Success { proof_bytes }
        } else {
            let exit_code = exit_code_of(output.status);
            error!(
                exit_code,
                elapsed_ms,
                stderr = %stderr.trim(),
                stdout = %stdout.trim(),
                "prover failed"
            );
            ProverOutcome::ProverFailed {
                exit_code,
                stderr,
                stdout,
            }
        };

        scratch.close()?;
        Ok(outcome)
    }
}

impl Prover for ExternalProver {
    fn prove(&self, request: &ProofRequest) -> ProverOutcome {
        let Some(program) = self.resolve() else {
            warn!(prover = %self.executable.display(), "prover executable not found");
            return ProverOutcome::tool_unavailable(&self.executable);
        };
        self.run(&program, request).unwrap_or_else(|e| {
            error!(error = %format!("{e:#}"), "prover invocation aborted");
            ProverOutcome::internal(&e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stepzk_core::Digest;

    fn request() -> ProofRequest {
        ProofRequest {
            start: Digest::normalize("0x01"),
            end: Digest::normalize("02"),
            step_count: 42,
            step_count_raw: "042".into(),
            log_path: PathBuf::from("/tmp/step.log"),
            step_log: vec![1, 2, 3],
        }
    }

    #[test]
    fn command_has_fixed_argument_order() {
        let cmd = ExternalProver::command(
            Path::new("/opt/prover"),
            &request(),
            Path::new("/s/log"),
            Path::new("/s/out"),
        );
        assert_eq!(cmd.get_program(), "/opt/prover");
        let args: Vec<_> = cmd.get_args().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(args, ["prove", "01", "/s/log", "042", "02", "/s/out"]);
    }

    #[test]
    fn missing_executable_short_circuits() {
        let dir = tempfile::tempdir().unwrap();
        let p = ExternalProver::new(dir.path().join("absent")).with_scratch_dir(dir.path());
        assert!(!p.is_available());
        match p.prove(&request()) {
            ProverOutcome::ToolUnavailable { detail } => assert!(detail.contains("absent")),
            other => panic!("unexpected outcome: {other:?}"),
        }
        // Nothing was materialized.
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn bare_name_resolves_through_path() {
        let p = ExternalProver::new("sh");
        let resolved = p.resolve().unwrap();
        assert!(resolved.is_absolute());
        assert!(p.is_available());
        assert!(!ExternalProver::new("stepzk-no-such-prover").is_available());
    }

    #[test]
    fn from_config_uses_prover_path() {
        let cfg = BridgeConfig {
            prover_path: PathBuf::from("/cfg/prover"),
            ..BridgeConfig::default()
        };
        assert_eq!(ExternalProver::from_config(&cfg).executable(), Path::new("/cfg/prover"));
    }
}
