//! Format-independent view of a presentation's object model, and its
//! normalization into a [`Document`].
//!
//! Format backends implement [`DocumentModelReader`] and report every shape,
//! paragraph, and run as stored, with unset attributes left as `None`.
//! [`extract_document`] applies the filtering and defaulting rules so that
//! they are identical for every backend.

use crate::error::Result;
use crate::types::{
    Document, ExtractedSlide, Shape, ShapeKind, TextRun, DEFAULT_FONT_NAME, DEFAULT_FONT_SIZE,
};

/// Capability to walk a presentation's slide → shape → paragraph → run tree.
pub trait DocumentModelReader {
    /// Read every slide in presentation order.
    fn read_slides(&mut self) -> Result<Vec<SlideModel>>;
}

/// One slide as stored in the source document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlideModel {
    /// All top-level shapes, text-bearing or not, in z-order.
    pub shapes: Vec<ShapeModel>,
}

/// One top-level shape.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeModel {
    pub kind: ShapeKind,

    /// Paragraphs of the shape's text frame; `None` when the shape has no text frame.
    pub text_frame: Option<Vec<ParagraphModel>>,
}

impl ShapeModel {
    /// A shape that cannot hold text (picture, table frame, group, connector).
    pub fn without_text() -> Self {
        Self {
            kind: ShapeKind::Unknown,
            text_frame: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParagraphModel {
    pub runs: Vec<RunModel>,
}

/// A run with its explicitly set font properties.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunModel {
    pub text: String,
    pub font_name: Option<String>,
    /// Size in points.
    pub font_size: Option<f64>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
}

impl RunModel {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}

/// Walk a document model and build the normalized [`Document`].
pub fn extract_document<R: DocumentModelReader + ?Sized>(reader: &mut R) -> Result<Document> {
    let slides = reader.read_slides()?;
    let mut document = Document::new(slides.len());

    for (slide_idx, slide_model) in slides.iter().enumerate() {
        let slide = normalize_slide(slide_model, slide_idx + 1);
        log::debug!(
            "Slide {}: {} of {} shapes carry text",
            slide.slide_index,
            slide.shapes.len(),
            slide_model.shapes.len()
        );
        document.add_slide(slide);
    }

    Ok(document)
}

fn normalize_slide(model: &SlideModel, slide_index: usize) -> ExtractedSlide {
    let mut slide = ExtractedSlide::new(slide_index);

    for (shape_idx, shape) in model.shapes.iter().enumerate() {
        let Some(paragraphs) = &shape.text_frame else {
            continue;
        };

        slide.add_shape(Shape {
            shape_id: Shape::make_id(slide_index, shape_idx + 1),
            shape_type: shape.kind,
            text_runs: collect_runs(paragraphs),
        });
    }

    slide
}

fn collect_runs(paragraphs: &[ParagraphModel]) -> Vec<TextRun> {
    let mut runs = Vec::new();

    for (paragraph_idx, paragraph) in paragraphs.iter().enumerate() {
        for (run_idx, run) in paragraph.runs.iter().enumerate() {
            if run.text.trim().is_empty() {
                continue;
            }
            runs.push(TextRun {
                text: run.text.clone(),
                paragraph_idx,
                run_idx,
                font_name: run
                    .font_name
                    .clone()
                    .filter(|name| !name.is_empty())
                    .unwrap_or_else(|| DEFAULT_FONT_NAME.to_string()),
                font_size: run.font_size.unwrap_or(DEFAULT_FONT_SIZE),
                is_bold: run.bold.unwrap_or(false),
                is_italic: run.italic.unwrap_or(false),
            });
        }
    }

    runs
}
