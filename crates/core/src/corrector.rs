//! Spell checking of free text and whole documents through a completion service.

use crate::error::Result;
use crate::prompt::CompletionRequest;
use crate::reply::parse_reply;
use crate::suggestion::{AnalysisResult, JobId, Suggestion, SuggestionContext};
use crate::tokens::{char_len, estimate_tokens};
use crate::types::{Document, Stats};

/// Capability to run one chat completion and return the reply text.
///
/// Implementations make a single attempt per call; retries are not expected.
pub trait TextCorrectionProvider {
    fn complete(&self, request: &CompletionRequest) -> Result<String>;

    /// Name of the provider for logging.
    fn name(&self) -> &str;
}

impl<P: TextCorrectionProvider + ?Sized> TextCorrectionProvider for &P {
    fn complete(&self, request: &CompletionRequest) -> Result<String> {
        (**self).complete(request)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<P: TextCorrectionProvider + ?Sized> TextCorrectionProvider for Box<P> {
    fn complete(&self, request: &CompletionRequest) -> Result<String> {
        (**self).complete(request)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Produces correction suggestions using a [`TextCorrectionProvider`].
#[derive(Debug, Clone)]
pub struct SpellChecker<P> {
    provider: P,
}

impl<P: TextCorrectionProvider> SpellChecker<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Analyze `text`, propagating provider and reply errors.
    ///
    /// Blank text returns no suggestions without contacting the provider.
    pub fn try_analyze_text(
        &self,
        text: &str,
        context: Option<&SuggestionContext>,
    ) -> Result<Vec<Suggestion>> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let request = CompletionRequest::spell_check(text);
        log::debug!(
            "Requesting corrections from {} ({} chars)",
            self.provider.name(),
            char_len(text)
        );
        let reply = self.provider.complete(&request)?;
        let suggestions = parse_reply(&reply, text)?;

        Ok(suggestions
            .into_iter()
            .map(|s| s.with_context(context))
            .collect())
    }

    /// Analyze `text`, logging any failure and returning no suggestions for it.
    pub fn analyze_text(&self, text: &str, context: Option<&SuggestionContext>) -> Vec<Suggestion> {
        match self.try_analyze_text(text, context) {
            Ok(suggestions) => suggestions,
            Err(e) => {
                match context {
                    Some(ctx) => log::error!(
                        "Analysis failed for {} on slide {}: {}",
                        ctx.shape_id,
                        ctx.slide_index,
                        e
                    ),
                    None => log::error!("Analysis failed: {}", e),
                }
                Vec::new()
            }
        }
    }

    /// Analyze one free-standing text, failing if the provider call fails.
    pub fn check_text(&self, text: &str) -> Result<AnalysisResult> {
        let suggestions = self.try_analyze_text(text, None)?;
        let stats = Stats::for_text(text, suggestions.len());

        Ok(AnalysisResult {
            job_id: JobId::generate(JobId::TEXT_PREFIX),
            suggestions,
            stats,
        })
    }

    /// Analyze every shape of `document` in order.
    ///
    /// Each shape's runs are joined into one text and checked on its own. A
    /// failing shape contributes no suggestions; the rest still run.
    pub fn check_document(&self, document: &Document) -> AnalysisResult {
        let mut suggestions = Vec::new();
        let mut stats = Stats {
            slides: document.slides.len(),
            ..Stats::default()
        };

        for (slide_index, shape) in document.shapes() {
            stats.shapes += 1;
            stats.runs += shape.text_runs.len();

            let full_text = shape.full_text();
            stats.tokens_estimated += estimate_tokens(&full_text);

            if full_text.trim().is_empty() {
                continue;
            }

            let context = SuggestionContext::for_shape(slide_index, shape.shape_id.as_str());
            let found = self.analyze_text(&full_text, Some(&context));
            log::info!("{}: {} suggestion(s)", shape.shape_id, found.len());
            suggestions.extend(found);
        }

        AnalysisResult {
            job_id: JobId::generate(JobId::DOCUMENT_PREFIX),
            suggestions,
            stats,
        }
    }
}
