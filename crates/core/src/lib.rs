//! Core domain types, document normalization, and correction-suggestion
//! logic for presentation spell checking.

pub mod corrector;
pub mod error;
pub mod model;
pub mod prompt;
pub mod reply;
pub mod suggestion;
pub mod tokens;
pub mod types;

pub use corrector::{SpellChecker, TextCorrectionProvider};
pub use error::{Error, Result};
pub use model::{extract_document, DocumentModelReader};
pub use prompt::CompletionRequest;
pub use suggestion::{
    AnalysisResult, Category, JobId, Position, Severity, Suggestion, SuggestionContext,
};
pub use types::{Document, ExtractedSlide, Shape, ShapeKind, Stats, TextRun};
