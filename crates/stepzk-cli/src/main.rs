// crates/stepzk-cli/src/main.rs

#![forbid(unsafe_code)]
#![deny(
    rust_2018_idioms,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo
)]

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use stepzk_core::{BridgeConfig, ConfigOverrides, ProofRequest, ProverOutcome, ResultEnvelope};
use stepzk_prover::{ExternalProver, Prover};
use stepzk_trace::Emulator;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(
    name = "stepzk",
    about = "Step prover bridge",
    long_about = "Step prover bridge.\n\nRuns an external prover over a claimed state transition and prints a fixed-layout ABI result envelope that always decodes, whatever happened.",
    version = env!("CARGO_PKG_VERSION"),
    disable_help_subcommand = true
)]
struct Cli {
    #[command(flatten)]
    tools: ToolArgs,

    #[command(subcommand)]
    cmd: Cmd,
}

/// Where the external tools live. Flags beat environment beats config file.
#[derive(Args, Debug)]
struct ToolArgs {
    /// Config file (.toml or .json)
    #[arg(long, global = true, env = "STEPZK_CONFIG")]
    config: Option<PathBuf>,

    /// Prover executable
    #[arg(long, global = true, env = "STEPZK_PROVER")]
    prover: Option<PathBuf>,

    /// Emulator executable
    #[arg(long, global = true, env = "STEPZK_EMULATOR")]
    emulator: Option<PathBuf>,

    /// Directory with emulator native modules (repeatable)
    #[arg(long = "lib-path", global = true)]
    lib_paths: Vec<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Prove a transition and print the result envelope as 0x-hex.
    ///
    /// Takes exactly: <startHash> <endHash> <numCycles> <stepLogPath>.
    /// Exit code is 0 when a proof was produced, 1 otherwise.
    Prove {
        /// startHash endHash numCycles stepLogPath
        #[arg(value_name = "ARGS", allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Run the emulator, print its merged stdout+stderr, mirror its exit code.
    Trace {
        /// Arguments appended after the configured emulator arguments
        #[arg(num_args = 0.., trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Decode a result envelope (0x-hex, or `-` for stdin) and print it as JSON.
    Decode {
        /// Envelope hex
        envelope: String,
    },
}

fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    match cli.cmd {
        Cmd::Prove { args } => prove(cli.tools, &args),
        Cmd::Trace { args } => trace(&load_config(cli.tools)?, &args),
        Cmd::Decode { envelope } => decode(&envelope),
    }
}

/// Initialize tracing with an env-driven filter (default INFO).
///
/// Logs go to stderr; stdout carries only the envelope or trace log.
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .with_level(true)
        .compact();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

fn load_config(tools: ToolArgs) -> Result<BridgeConfig> {
    let cfg = BridgeConfig::load_or_default(tools.config.as_deref())
        .context("loading configuration")?
        .apply(ConfigOverrides {
            prover_path: tools.prover,
            emulator_path: tools.emulator,
            library_paths: tools.lib_paths,
        });
    info!(
        prover = %cfg.prover_path.display(),
        emulator = %cfg.emulator_path.display(),
        "configuration resolved"
    );
    Ok(cfg)
}

/// Only a wrong argument count escapes as an error; everything after that
/// check, configuration included, ends in an envelope on stdout.
fn prove(tools: ToolArgs, args: &[String]) -> Result<ExitCode> {
    ProofRequest::check_arity(args)?;

    let outcome = match load_config(tools) {
        Ok(cfg) => prove_with(&cfg, args),
        Err(e) => {
            warn!(error = %format!("{e:#}"), "configuration rejected");
            ProverOutcome::internal(&e)
        }
    };

    let envelope = ResultEnvelope::from(&outcome);
    let mut out = io::stdout().lock();
    out.write_all(envelope.to_hex().as_bytes())
        .and_then(|()| out.flush())
        .context("writing envelope to stdout")?;

    info!(outcome = %outcome, "done");
    Ok(exit_code(outcome.exit_code()))
}

fn prove_with(cfg: &BridgeConfig, args: &[String]) -> ProverOutcome {
    match ProofRequest::from_args(args) {
        Ok(request) => ExternalProver::from_config(cfg).prove(&request),
        Err(e) => {
            warn!(error = %e, "request rejected");
            ProverOutcome::internal(&e)
        }
    }
}

fn trace(cfg: &BridgeConfig, args: &[String]) -> Result<ExitCode> {
    let run = Emulator::from_config(cfg).run(args)?;

    let mut out = io::stdout().lock();
    out.write_all(&run.log)
        .and_then(|()| out.flush())
        .context("writing trace log to stdout")?;

    Ok(exit_code(run.exit_code))
}

fn decode(envelope: &str) -> Result<ExitCode> {
    let text = if envelope == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("reading envelope from stdin")?;
        buf
    } else {
        envelope.to_owned()
    };

    let env = ResultEnvelope::from_hex(&text).context("decoding envelope")?;
    let json = serde_json::to_string_pretty(&env.view()).context("serialize envelope view")?;
    println!("{json}");
    Ok(ExitCode::SUCCESS)
}

/// Process exit code for `code`; anything outside `0..=255` becomes 1.
fn exit_code(code: i32) -> ExitCode {
    u8::try_from(code).map_or(ExitCode::FAILURE, ExitCode::from)
}
