//! Domain types for representing extracted presentation text.
//!
//! Field names serialize to the JSON schema the downstream review UI reads:
//! camelCase for document structure, snake_case inside text runs.

use serde::{Deserialize, Serialize};

use crate::tokens::{char_len, estimate_tokens};

/// Font name reported when a run does not set one.
pub const DEFAULT_FONT_NAME: &str = "기본";

/// Font size in points reported when a run does not set one.
pub const DEFAULT_FONT_SIZE: f64 = 12.0;

/// An entire presentation reduced to its text-bearing shapes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Slides with at least one qualifying shape, in presentation order.
    pub slides: Vec<ExtractedSlide>,

    /// Aggregate counts over the extracted content.
    #[serde(default)]
    pub stats: Stats,
}

impl Document {
    /// Create an empty document for a source with `slide_count` slides.
    pub fn new(slide_count: usize) -> Self {
        Self {
            slides: Vec::new(),
            stats: Stats {
                slides: slide_count,
                ..Stats::default()
            },
        }
    }

    /// Add a slide, skipping it when none of its shapes carry text.
    pub fn add_slide(&mut self, slide: ExtractedSlide) {
        if slide.shapes.is_empty() {
            return;
        }
        for shape in &slide.shapes {
            self.stats.shapes += 1;
            self.stats.runs += shape.text_runs.len();
            self.stats.tokens_estimated += estimate_tokens(&shape.full_text());
        }
        self.slides.push(slide);
    }

    /// Iterate over every shape in document order together with its slide index.
    pub fn shapes(&self) -> impl Iterator<Item = (usize, &Shape)> {
        self.slides
            .iter()
            .flat_map(|slide| slide.shapes.iter().map(move |shape| (slide.slide_index, shape)))
    }
}

/// A single slide and its text-bearing shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedSlide {
    /// 1-based position of the slide in presentation order.
    pub slide_index: usize,

    #[serde(default)]
    pub shapes: Vec<Shape>,
}

impl ExtractedSlide {
    pub fn new(slide_index: usize) -> Self {
        Self {
            slide_index,
            shapes: Vec::new(),
        }
    }

    /// Add a shape, skipping it when it has no runs.
    pub fn add_shape(&mut self, shape: Shape) {
        if !shape.text_runs.is_empty() {
            self.shapes.push(shape);
        }
    }
}

/// A shape on a slide holding one or more text runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shape {
    /// Synthetic id of the form `shape-{slide}-{position}`.
    pub shape_id: String,

    #[serde(default)]
    pub shape_type: ShapeKind,

    #[serde(default)]
    pub text_runs: Vec<TextRun>,
}

impl Shape {
    /// Build the synthetic id for the shape at 1-based `position` on slide `slide_index`.
    pub fn make_id(slide_index: usize, position: usize) -> String {
        format!("shape-{}-{}", slide_index, position)
    }

    /// Concatenate the text of all runs, without separators.
    pub fn full_text(&self) -> String {
        self.text_runs.iter().map(|r| r.text.as_str()).collect()
    }
}

/// The kind of text-bearing shape a run was found in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShapeKind {
    /// A shape flagged as a text box.
    TextBox,
    /// A layout placeholder (title, body, subtitle, ...).
    Placeholder,
    /// Any other shape exposing a text frame.
    #[default]
    AutoShape,
    #[serde(other)]
    Unknown,
}

/// A contiguous, uniformly styled fragment of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextRun {
    /// Text content, exactly as stored (not trimmed).
    pub text: String,

    /// 0-based paragraph index within the shape's text frame.
    pub paragraph_idx: usize,

    /// 0-based run index within the paragraph.
    pub run_idx: usize,

    pub font_name: String,

    /// Font size in points.
    pub font_size: f64,

    pub is_bold: bool,

    pub is_italic: bool,
}

impl Default for TextRun {
    fn default() -> Self {
        Self {
            text: String::new(),
            paragraph_idx: 0,
            run_idx: 0,
            font_name: DEFAULT_FONT_NAME.to_string(),
            font_size: DEFAULT_FONT_SIZE,
            is_bold: false,
            is_italic: false,
        }
    }
}

/// Aggregate counts over a document or an analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub slides: usize,
    pub shapes: usize,
    pub runs: usize,

    /// Rough language-model token estimate, see [`estimate_tokens`].
    pub tokens_estimated: f64,

    /// Character length of the analyzed text (single-text analyses only).
    #[serde(
        rename = "original_length",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub original_length: Option<usize>,

    /// Number of suggestions produced (single-text analyses only).
    #[serde(
        rename = "suggestions_count",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub suggestions_count: Option<usize>,
}

impl Stats {
    /// Stats describing a single free-standing text.
    pub fn for_text(text: &str, suggestions_count: usize) -> Self {
        Self {
            slides: 1,
            shapes: 1,
            runs: 1,
            tokens_estimated: estimate_tokens(text),
            original_length: Some(char_len(text)),
            suggestions_count: Some(suggestions_count),
        }
    }
}
