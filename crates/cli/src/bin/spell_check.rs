//! Check text, or the extracted text of a whole presentation, for spelling
//! and grammar errors.

use anyhow::{Context, Result};
use clap::Parser;
use spellcheck_cli::{fail, init_logging, parse_args, print_json, read_json_arg};
use spellcheck_core::{Document, SpellChecker, TextCorrectionProvider};

/// Get correction suggestions for Korean text from a language model.
///
/// Either pass the text (and optionally the API key) positionally, or pass
/// the JSON printed by pptx-analyze with --pptx-data.
#[derive(Parser, Debug)]
#[command(name = "spell-check")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Text to check
    #[arg(required_unless_present = "pptx_data", conflicts_with = "pptx_data")]
    text: Option<String>,

    /// API key (falls back to OPENAI_API_KEY)
    #[arg(value_name = "API_KEY")]
    key: Option<String>,

    /// Document JSON from pptx-analyze (inline, @file, or - for stdin)
    #[arg(long, value_name = "JSON")]
    pptx_data: Option<String>,

    /// API key (falls back to OPENAI_API_KEY)
    #[arg(long)]
    api_key: Option<String>,

    /// Model name (falls back to OPENAI_MODEL, then gpt-4o-mini)
    #[arg(long)]
    model: Option<String>,

    /// Completion request timeout in seconds
    #[arg(long, default_value = "60")]
    timeout: u64,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

type BoxedProvider = Box<dyn TextCorrectionProvider>;

fn main() {
    let args: Args = parse_args();
    init_logging(args.verbose);

    if let Err(e) = run(&args) {
        fail(&e);
    }
}

fn run(args: &Args) -> Result<()> {
    let checker = SpellChecker::new(build_provider(args)?);

    match &args.pptx_data {
        Some(data) => {
            let json = read_json_arg(data)?;
            let document: Document =
                serde_json::from_str(&json).context("Invalid --pptx-data JSON")?;
            let result = checker.check_document(&document);
            log::info!(
                "{} suggestion(s) across {} shape(s)",
                result.suggestions.len(),
                result.stats.shapes
            );
            print_json(&result)
        }
        None => {
            let text = args.text.as_deref().unwrap_or_default();
            let result = checker.check_text(text).context("Spell check failed")?;
            print_json(&result)
        }
    }
}

#[cfg(feature = "openai")]
fn build_provider(args: &Args) -> Result<BoxedProvider> {
    use spellcheck_openai::{OpenAiConfig, OpenAiProvider};
    use std::time::Duration;

    let api_key = args.api_key.clone().or_else(|| args.key.clone());
    let mut config = OpenAiConfig::from_env(api_key)?
        .with_timeout(Duration::from_secs(args.timeout));
    if let Some(model) = &args.model {
        config = config.with_model(model);
    }

    let provider = OpenAiProvider::new(config)?;
    log::debug!("Using {:?}", provider.config());
    Ok(Box::new(provider))
}

#[cfg(not(feature = "openai"))]
fn build_provider(_args: &Args) -> Result<BoxedProvider> {
    anyhow::bail!("spell-check was built without a completion provider; rebuild with `--features openai`")
}
