//! Bridge configuration: where the external tools live.
//!
//! Nothing in the bridge hard-codes a tool location. A [`BridgeConfig`] is
//! assembled once at process start (defaults → config file → environment →
//! flags; the last two are applied by the CLI via [`BridgeConfig::apply`]) and
//! handed to the prover and emulator wrappers.
//!
//! Config files are selected by extension (`.toml` or `.json`,
//! case-insensitive):
//!
//! ```toml
//! prover_path = "/opt/risc0/bin/cartesi-risc0-cli"
//! emulator_path = "/opt/cartesi/bin/cartesi-machine"
//! emulator_args = ["--ram-image=/opt/cartesi/images/linux.bin", "--hash-tree-target=risc0"]
//! library_paths = ["/opt/cartesi/lib"]
//! ```

use crate::error::ConfigError;
use crate::request::absolute;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default prover executable (looked up on `PATH`, see [`resolve_executable`]).
pub const DEFAULT_PROVER: &str = "cartesi-risc0-cli";
/// Default emulator executable (looked up on `PATH`, see [`resolve_executable`]).
pub const DEFAULT_EMULATOR: &str = "cartesi-machine";

/// Locations of the external tools plus emulator invocation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BridgeConfig {
    /// External prover executable.
    pub prover_path: PathBuf,
    /// Trace-producing emulator executable.
    pub emulator_path: PathBuf,
    /// Arguments always passed to the emulator before caller arguments.
    pub emulator_args: Vec<String>,
    /// Directories holding the emulator's native modules.
    pub library_paths: Vec<PathBuf>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            prover_path: PathBuf::from(DEFAULT_PROVER),
            emulator_path: PathBuf::from(DEFAULT_EMULATOR),
            emulator_args: Vec::new(),
            library_paths: Vec::new(),
        }
    }
}

/// Values that take precedence over a loaded file (environment and flags).
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Replaces [`BridgeConfig::prover_path`] when set.
    pub prover_path: Option<PathBuf>,
    /// Replaces [`BridgeConfig::emulator_path`] when set.
    pub emulator_path: Option<PathBuf>,
    /// Appended to [`BridgeConfig::library_paths`].
    pub library_paths: Vec<PathBuf>,
}

impl BridgeConfig {
    /// Parse a TOML document.
    pub fn from_toml_str(src: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(src)?)
    }

    /// Parse a JSON document.
    pub fn from_json_str(src: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(src)?)
    }

    /// Load from a file, choosing the format by extension.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let ext = ext_lower(path).ok_or_else(|| ConfigError::NoExtension(path.to_owned()))?;
        let parse: fn(&str) -> Result<Self, ConfigError> = match ext.as_str() {
            "toml" => Self::from_toml_str,
            "json" => Self::from_json_str,
            _ => return Err(ConfigError::UnsupportedExtension(ext)),
        };
        let src = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        let cfg = parse(&src)?;
        tracing::debug!(path = %path.display(), ?cfg, "loaded bridge config");
        Ok(cfg)
    }

    /// Load from `path` if given, otherwise start from defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }

    /// Layer higher-precedence values on top of this config.
    #[must_use]
    pub fn apply(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(p) = overrides.prover_path {
            self.prover_path = p;
        }
        if let Some(p) = overrides.emulator_path {
            self.emulator_path = p;
        }
        self.library_paths.extend(overrides.library_paths);
        self
    }
}

/// The file a configured tool location names, or `None` if there is none.
///
/// A bare name (one path component) is searched on `PATH`, the way a shell
/// would. Anything with a separator is taken relative to the working
/// directory and only has to exist. Callers spawn the returned path, so the
/// availability check and the launch always agree.
#[must_use]
pub fn resolve_executable(configured: &Path) -> Option<PathBuf> {
    if configured.components().count() == 1 && !configured.is_absolute() {
        return which::which(configured).ok();
    }
    let path = absolute(configured);
    path.exists().then_some(path)
}

fn ext_lower(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
}
