//! WFUZZ CLI: argument handling, logging setup and report output.
//!
//! stdout carries only the serialized report; logs and error objects go to
//! stderr.
use anyhow::Context;
use clap::Parser;
use serde_json::{json, Value};
use std::io::Write;
use std::panic::UnwindSafe;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use thiserror::Error;
use tracing_subscriber::EnvFilter;
use wfuzz_core::processor::panic_message;
use wfuzz_core::{BatchRunner, HarnessConfig, HarnessError, Report};
use wfuzz_engine::WasmiRuntime;

#[derive(Parser, Debug)]
#[command(
    name = "wasm-fuzzer",
    version = wfuzz_core::WFUZZ_VERSION,
    about = "Runs every WebAssembly module in a directory and classifies the stage each one fails at"
)]
pub struct Args {
    /// Directory containing the modules to run
    pub directory: PathBuf,

    /// YAML file overriding the module extension, entry point or input
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write the report as a single line instead of indented JSON
    #[arg(long, default_value_t = false)]
    pub compact: bool,
}

#[derive(Error, Debug)]
pub enum CliError {
    #[error("usage: wasm-fuzzer <directory>")]
    Usage(String),

    #[error("directory access failed")]
    DirectoryAccess(#[source] std::io::Error),

    #[error("path is not a directory")]
    NotADirectory(PathBuf),

    #[error("invalid configuration: {0:#}")]
    Config(anyhow::Error),

    #[error("fuzzer execution failed")]
    Run(#[source] HarnessError),

    #[error("failed to encode JSON output")]
    Output(#[source] std::io::Error),
}

impl CliError {
    /// The error object written to stderr.
    pub fn to_json(&self) -> Value {
        let error = self.to_string();
        match self {
            CliError::Usage(details) => json!({ "error": error, "details": details }),
            CliError::DirectoryAccess(e) => json!({ "error": error, "details": e.to_string() }),
            CliError::NotADirectory(path) => {
                json!({ "error": error, "path": path.display().to_string() })
            }
            CliError::Config(_) => json!({ "error": "invalid configuration", "details": error }),
            CliError::Run(e) => json!({ "error": error, "details": e.to_string() }),
            CliError::Output(e) => json!({ "error": error, "details": e.to_string() }),
        }
    }
}

/// Installs a stderr tracing subscriber honouring `RUST_LOG` (default `warn`).
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Validates the target directory, runs the batch and writes the report.
pub fn run(args: &Args, out: &mut impl Write) -> Result<Report, CliError> {
    let config = load_config(args.config.as_deref()).map_err(CliError::Config)?;

    let metadata = std::fs::metadata(&args.directory).map_err(CliError::DirectoryAccess)?;
    if !metadata.is_dir() {
        return Err(CliError::NotADirectory(args.directory.clone()));
    }

    tracing::debug!(?config, dir = %args.directory.display(), "starting batch");
    let report = BatchRunner::with_config(WasmiRuntime::new(), config)
        .run(&args.directory)
        .map_err(CliError::Run)?;

    write_report(&report, out, args.compact).map_err(CliError::Output)?;
    Ok(report)
}

fn load_config(path: Option<&Path>) -> anyhow::Result<HarnessConfig> {
    match path {
        Some(path) => HarnessConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(HarnessConfig::default()),
    }
}

/// Serializes the report followed by a newline.
pub fn write_report(report: &Report, out: &mut impl Write, compact: bool) -> std::io::Result<()> {
    if compact {
        serde_json::to_writer(&mut *out, report)?;
    } else {
        serde_json::to_writer_pretty(&mut *out, report)?;
    }
    writeln!(out)?;
    out.flush()
}

fn emit_error(error: &Value) {
    eprintln!("{}", error);
}

/// Parses arguments and runs the batch. Returns the process exit code.
pub fn drive() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if !e.use_stderr() => {
            // --help / --version
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            emit_error(&CliError::Usage(e.kind().to_string()).to_json());
            return ExitCode::FAILURE;
        }
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match run(&args, &mut out) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "run failed");
            emit_error(&e.to_json());
            ExitCode::FAILURE
        }
    }
}

/// Runs `f` inside the top-level recovery boundary. A panic that escapes it
/// is written to `err` as a `fatal panic in main` error object.
pub fn recover_with<F>(f: F, err: &mut impl Write) -> ExitCode
where
    F: FnOnce() -> ExitCode + UnwindSafe,
{
    match std::panic::catch_unwind(f) {
        Ok(code) => code,
        Err(payload) => {
            let error = json!({
                "error": "fatal panic in main",
                "details": panic_message(payload.as_ref()),
            });
            let _ = writeln!(err, "{}", error);
            ExitCode::FAILURE
        }
    }
}

/// Top-level recovery boundary for the driver itself. Panics inside a
/// module's processing never reach this point.
pub fn main_with_recovery() -> ExitCode {
    recover_with(drive, &mut std::io::stderr())
}

/// Replaces the default panic hook, which prints to stderr, with a debug
/// event. Contained panics are already reported by the processor and the
/// recovery boundary.
pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        let location = info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_default();
        tracing::debug!(
            payload = %panic_message(info.payload()),
            %location,
            "panic caught by hook"
        );
    }));
}
