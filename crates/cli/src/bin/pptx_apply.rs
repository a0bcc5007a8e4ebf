//! Write accepted suggestions back into a PowerPoint file.

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde_json::Value;
use spellcheck_cli::{fail, init_logging, parse_args, print_json, read_json_arg};
use spellcheck_core::Suggestion;
use spellcheck_pptx::{apply_corrections, fetch, DocumentSource, FetchOptions};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Apply correction suggestions to a .pptx file.
#[derive(Parser, Debug)]
#[command(name = "pptx-apply")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Document URL (http, https, file) or local path
    source: String,

    /// Suggestions as a JSON array or spell-check result (inline, @file, or -)
    #[arg(short, long, value_name = "JSON")]
    corrections: String,

    /// Where to write the corrected .pptx
    #[arg(short, long)]
    output: PathBuf,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args: Args = parse_args();
    init_logging(args.verbose);

    if let Err(e) = run(&args) {
        fail(&e);
    }
}

fn run(args: &Args) -> Result<()> {
    let suggestions = parse_suggestions(&read_json_arg(&args.corrections)?)?;
    let source = DocumentSource::parse(&args.source);
    let local = fetch(&source, &FetchOptions::new())
        .with_context(|| format!("Failed to open {}", source))?;

    if same_file(local.path(), &args.output) {
        bail!("Output path must differ from the source document");
    }

    let parent = args
        .output
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let mut staged = tempfile::NamedTempFile::new_in(parent)
        .with_context(|| format!("Failed to create a file in {}", parent.display()))?;

    let reader = BufReader::new(local.open()?);
    let report = apply_corrections(reader, staged.as_file_mut(), &suggestions)
        .context("Failed to apply corrections")?;

    staged
        .persist(&args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    log::info!(
        "Applied {} of {} suggestion(s) to {}",
        report.applied,
        suggestions.len(),
        args.output.display()
    );

    print_json(&report)
}

/// Accept either a bare suggestion array or an object with a `suggestions` field.
fn parse_suggestions(json: &str) -> Result<Vec<Suggestion>> {
    let value: Value = serde_json::from_str(json).context("Invalid corrections JSON")?;
    let list = match value {
        Value::Array(items) => Value::Array(items),
        Value::Object(mut map) => map
            .remove("suggestions")
            .context("Corrections object has no `suggestions` field")?,
        _ => bail!("Corrections must be a JSON array or object"),
    };
    serde_json::from_value(list).context("Invalid suggestion entry")
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
