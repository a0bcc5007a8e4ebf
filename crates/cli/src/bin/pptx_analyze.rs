//! Extract the text runs of a PowerPoint file as JSON.

use anyhow::{Context, Result};
use clap::Parser;
use spellcheck_cli::{fail, init_logging, parse_args, print_json};
use spellcheck_pptx::{extract_from_source, DocumentSource, FetchOptions};
use std::path::PathBuf;
use std::time::Duration;

/// Extract slides, shapes, and text runs from a .pptx file.
#[derive(Parser, Debug)]
#[command(name = "pptx-analyze")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Document URL (http, https, file) or local path
    source: String,

    /// Download timeout in seconds
    #[arg(long, default_value = "120")]
    timeout: u64,

    /// Directory for the temporary download (default: system temp dir)
    #[arg(long)]
    temp_dir: Option<PathBuf>,

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
    let source = DocumentSource::parse(&args.source);

    let mut options = FetchOptions::new().with_timeout(Duration::from_secs(args.timeout));
    if let Some(dir) = &args.temp_dir {
        options = options.with_temp_dir(dir);
    }

    let document = extract_from_source(&source, &options)
        .with_context(|| format!("Failed to analyze {}", source))?;

    log::info!(
        "{} slide(s), {} shape(s), {} run(s)",
        document.stats.slides,
        document.stats.shapes,
        document.stats.runs
    );

    print_json(&document)
}
