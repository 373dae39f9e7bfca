//! Step-log producer: a thin wrapper around the machine emulator.
//!
//! The emulator is run with the configured leading arguments (machine image,
//! drives, hash-tree target, …) followed by whatever the caller passes. Its
//! standard output and standard error are captured to completion and merged,
//! stdout first, into one log; the exit code is reported unchanged.
//!
//! Native modules the emulator loads are found through `LUA_CPATH`, built from
//! [`BridgeConfig::library_paths`].

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

use anyhow::{bail, Context, Result};
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use stepzk_core::{exit_code_of, resolve_executable, BridgeConfig};

/// Search-path variable for the emulator's native Lua modules.
pub const LUA_CPATH: &str = "LUA_CPATH";

/// Captured result of one emulator run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceRun {
    /// Emulator exit code (`128 + signal` for signal deaths on Unix).
    pub exit_code: i32,
    /// Standard output followed by standard error.
    pub log: Vec<u8>,
}

impl TraceRun {
    /// Whether the emulator exited 0.
    #[inline]
    #[must_use]
    pub const fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// The configured emulator executable.
#[derive(Debug, Clone)]
pub struct Emulator {
    executable: PathBuf,
    base_args: Vec<String>,
    library_paths: Vec<PathBuf>,
}

impl Emulator {
    /// Emulator at `executable` with no leading arguments or library paths.
    #[must_use]
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            base_args: Vec::new(),
            library_paths: Vec::new(),
        }
    }

    /// Emulator described by a [`BridgeConfig`].
    #[must_use]
    pub fn from_config(cfg: &BridgeConfig) -> Self {
        Self {
            executable: cfg.emulator_path.clone(),
            base_args: cfg.emulator_args.clone(),
            library_paths: cfg.library_paths.clone(),
        }
    }

    /// Configured executable path.
    #[must_use]
    pub fn executable(&self) -> &Path {
        &self.executable
    }

    fn command(&self, program: &Path, args: &[String]) -> Command {
        let mut cmd = Command::new(program);
        cmd.args(&self.base_args).args(args).stdin(Stdio::null());
        if let Some(cpath) = lua_cpath(&self.library_paths, std::env::var_os(LUA_CPATH).as_deref())
        {
            cmd.env(LUA_CPATH, cpath);
        }
        cmd
    }

    /// Run to completion with `args` appended to the configured ones.
    ///
    /// A nonzero exit is not an error here; it is reported in
    /// [`TraceRun::exit_code`]. Errors mean the emulator could not be run.
    pub fn run(&self, args: &[String]) -> Result<TraceRun> {
        let Some(program) = resolve_executable(&self.executable) else {
            bail!("emulator not found: {}", self.executable.display());
        };
        let output = self
            .command(&program, args)
            .output()
            .with_context(|| format!("running emulator {}", program.display()))?;

        let exit_code = exit_code_of(output.status);
        let mut log = output.stdout;
        log.extend_from_slice(&output.stderr);

        tracing::info!(
            emulator = %program.display(),
            exit_code,
            log_bytes = log.len(),
            "emulator finished"
        );
        Ok(TraceRun { exit_code, log })
    }
}

/// `LUA_CPATH` value exposing `dirs`, keeping the inherited value after them.
///
/// Each directory contributes `<dir>/?.so;`; a final `;` stands for Lua's
/// default path. Returns `None` when there is nothing to add.
#[must_use]
pub fn lua_cpath(dirs: &[PathBuf], inherited: Option<&OsStr>) -> Option<OsString> {
    if dirs.is_empty() {
        return None;
    }
    let mut out = OsString::new();
    for d in dirs {
        out.push(d.join("?.so"));
        out.push(";");
    }
    out.push(";");
    if let Some(prev) = inherited {
        out.push(prev);
    }
    Some(out)
}
