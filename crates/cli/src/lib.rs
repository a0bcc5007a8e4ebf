//! Shared plumbing for the command-line tools: logging, JSON output, and
//! argument helpers.
//!
//! Every tool prints its result as pretty JSON on stdout. Failures print
//! `{"error": "..."}` on stdout and exit with status 1; logs go to stderr.

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use serde::Serialize;
use std::io::Read;
use std::path::Path;

/// Initialize logging to stderr; `verbose` raises the default level to debug.
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

/// Parse command-line arguments, reporting usage errors as JSON.
pub fn parse_args<T: Parser>() -> T {
    match T::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => exit_with_error(&e.to_string()),
    }
}

/// Print `value` as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", to_json(value)?);
    Ok(())
}

/// Render `value` as pretty JSON, keeping non-ASCII text as-is.
pub fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize output")
}

/// Report `error` as a JSON payload and exit with status 1.
pub fn fail(error: &anyhow::Error) -> ! {
    log::debug!("{:?}", error);
    exit_with_error(&format!("{:#}", error))
}

fn exit_with_error(message: &str) -> ! {
    println!("{}", error_payload(message));
    std::process::exit(1)
}

/// The `{"error": ...}` payload for `message`.
pub fn error_payload(message: &str) -> String {
    serde_json::json!({ "error": message.trim_end() }).to_string()
}

/// Load a JSON argument given inline, as `@path`, or as `-` for stdin.
pub fn read_json_arg(arg: &str) -> Result<String> {
    if arg == "-" {
        let mut input = String::new();
        std::io::stdin()
            .read_to_string(&mut input)
            .context("Failed to read JSON from stdin")?;
        return Ok(input);
    }

    match arg.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(Path::new(path))
            .with_context(|| format!("Failed to read {}", path)),
        None => Ok(arg.to_string()),
    }
}
