use anyhow::{Context, Result};
use std::io::{self, Write};
use std::path::Path;
use tempfile::{Builder, NamedTempFile};

/// The step-log input and proof output files of one prover run.
///
/// Both files are deleted when this value is dropped. [`ScratchFiles::close`]
/// does the same but reports deletion errors.
#[derive(Debug)]
pub struct ScratchFiles {
    log: NamedTempFile,
    output: NamedTempFile,
}

impl ScratchFiles {
    /// Write `step_log` to a fresh file and reserve a fresh output path.
    ///
    /// Files go in `dir` when given, otherwise the system temp directory.
    pub fn create(dir: Option<&Path>, step_log: &[u8]) -> Result<Self> {
        let mut log = named(dir, "stepzk-log-", ".log").context("creating step log scratch file")?;
        log.write_all(step_log)
            .and_then(|()| log.flush())
            .with_context(|| format!("writing step log to {}", log.path().display()))?;

        let output =
            named(dir, "stepzk-proof-", ".bin").context("creating proof output scratch file")?;

        tracing::debug!(
            log = %log.path().display(),
            output = %output.path().display(),
            log_bytes = step_log.len(),
            "scratch files ready"
        );
        Ok(Self { log, output })
    }

    /// Path the prover reads the step log from.
    #[must_use]
    pub fn log_path(&self) -> &Path {
        self.log.path()
    }

    /// Path the prover writes its artifact to.
    #[must_use]
    pub fn output_path(&self) -> &Path {
        self.output.path()
    }

    /// Delete both files now, surfacing failures.
    ///
    /// An output file the prover already removed is not an error.
    pub fn close(self) -> Result<()> {
        self.log.close().context("removing step log scratch file")?;
        match self.output.close() {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other.context("removing proof output scratch file"),
        }
    }
}

fn named(dir: Option<&Path>, prefix: &str, suffix: &str) -> io::Result<NamedTempFile> {
    let mut b = Builder::new();
    b.prefix(prefix).suffix(suffix);
    match dir {
        Some(d) => b.tempfile_in(d),
        None => b.tempfile(),
    }
}
