//! PPTX document model reader.
//!
//! Walks each slide's shape tree and reports every top-level shape together
//! with the paragraphs and runs of its text frame.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use spellcheck_core::model::{ParagraphModel, RunModel, ShapeModel, SlideModel};
use spellcheck_core::{DocumentModelReader, Error, Result, ShapeKind};
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use zip::ZipArchive;

use crate::package::{attr_value, local_name, open_package, read_part, slide_paths};

/// Elements that count as shapes when they are direct children of `p:spTree`.
pub(crate) const SHAPE_ELEMENTS: &[&[u8]] = &[
    b"sp",
    b"grpSp",
    b"graphicFrame",
    b"cxnSp",
    b"pic",
    b"contentPart",
];

/// Reader for PPTX (Office Open XML) packages.
pub struct PptxReader<R: Read + Seek> {
    archive: ZipArchive<R>,
}

impl PptxReader<BufReader<File>> {
    /// Open a PPTX file on disk.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::new(BufReader::new(file))
    }
}

impl<R: Read + Seek> PptxReader<R> {
    /// Read a PPTX package from a seekable reader.
    pub fn new(reader: R) -> Result<Self> {
        Ok(Self {
            archive: open_package(reader)?,
        })
    }

    /// Parse a single slide part.
    fn read_slide(&mut self, slide_path: &str) -> Result<SlideModel> {
        let content = read_part(&mut self.archive, slide_path)?;
        parse_slide_xml(&content)
            .map_err(|e| Error::PptxParseError(format!("{}: {}", slide_path, e)))
    }
}

impl<R: Read + Seek> DocumentModelReader for PptxReader<R> {
    fn read_slides(&mut self) -> Result<Vec<SlideModel>> {
        let paths = slide_paths(&mut self.archive)?;
        log::debug!("Found {} slide parts", paths.len());

        paths.iter().map(|path| self.read_slide(path)).collect()
    }
}

/// A shape being assembled while its element is open.
struct ShapeBuilder {
    /// Nesting level of the shape element.
    level: usize,
    is_sp: bool,
    kind: ShapeKind,
    paragraphs: Option<Vec<ParagraphModel>>,
}

impl ShapeBuilder {
    fn finish(self) -> ShapeModel {
        if !self.is_sp {
            return ShapeModel::without_text();
        }
        ShapeModel {
            kind: self.kind,
            text_frame: self.paragraphs,
        }
    }
}

/// Event-driven state while walking one slide part.
#[derive(Default)]
struct SlideWalker {
    /// Number of currently open elements.
    depth: usize,
    tree_level: Option<usize>,
    shape: Option<ShapeBuilder>,
    in_text_body: bool,
    paragraph: Option<ParagraphModel>,
    run: Option<RunModel>,
    in_run_props: bool,
    in_text: bool,
    shapes: Vec<ShapeModel>,
}

impl SlideWalker {
    fn start(&mut self, e: &BytesStart<'_>, empty: bool) {
        let level = self.depth + 1;
        if !empty {
            self.depth = level;
        }
        let qname = e.name();
        let name = local_name(qname.as_ref());

        let Some(tree) = self.tree_level else {
            if name == b"spTree" && !empty {
                self.tree_level = Some(level);
            }
            return;
        };

        if self.shape.is_none() {
            if level == tree + 1 && SHAPE_ELEMENTS.contains(&name) {
                let builder = ShapeBuilder {
                    level,
                    is_sp: name == b"sp",
                    kind: ShapeKind::AutoShape,
                    paragraphs: None,
                };
                if empty {
                    self.shapes.push(builder.finish());
                } else {
                    self.shape = Some(builder);
                }
            }
            return;
        }

        let Some(shape) = self.shape.as_mut().filter(|s| s.is_sp) else {
            return;
        };

        // Kind markers live in p:nvSpPr, at most three levels below the shape.
        if level <= shape.level + 3 {
            mark_shape_kind(shape, e, name);
        }

        match name {
            b"txBody" if level == shape.level + 1 => {
                shape.paragraphs = Some(Vec::new());
                self.in_text_body = !empty;
            }
            b"p" if self.in_text_body => {
                if empty {
                    push_paragraph(shape, ParagraphModel::default());
                } else {
                    self.paragraph = Some(ParagraphModel::default());
                }
            }
            b"r" => {
                if let Some(paragraph) = self.paragraph.as_mut() {
                    if empty {
                        paragraph.runs.push(RunModel::default());
                    } else {
                        self.run = Some(RunModel::default());
                    }
                }
            }
            b"rPr" => {
                if let Some(run) = self.run.as_mut() {
                    apply_run_properties(run, e);
                    self.in_run_props = !empty;
                }
            }
            b"latin" if self.in_run_props => {
                if let Some(run) = self.run.as_mut() {
                    run.font_name = attr_value(e, b"typeface");
                }
            }
            b"t" if self.run.is_some() && !empty => self.in_text = true,
            _ => {}
        }
    }

    fn end(&mut self, name: &[u8]) {
        let level = self.depth;
        self.depth = self.depth.saturating_sub(1);

        let Some(shape_level) = self.shape.as_ref().map(|s| s.level) else {
            if self.tree_level == Some(level) {
                self.tree_level = None;
            }
            return;
        };

        if level == shape_level {
            if let Some(done) = self.shape.take() {
                self.shapes.push(done.finish());
            }
            self.in_text_body = false;
            self.paragraph = None;
            self.run = None;
            self.in_run_props = false;
            self.in_text = false;
            return;
        }

        match name {
            b"t" => self.in_text = false,
            b"rPr" => self.in_run_props = false,
            b"r" => {
                if let (Some(run), Some(paragraph)) = (self.run.take(), self.paragraph.as_mut()) {
                    paragraph.runs.push(run);
                }
            }
            b"p" if self.in_text_body => {
                if let (Some(paragraph), Some(shape)) = (self.paragraph.take(), self.shape.as_mut())
                {
                    push_paragraph(shape, paragraph);
                }
            }
            b"txBody" if level == shape_level + 1 => self.in_text_body = false,
            _ => {}
        }
    }

    fn push_text(&mut self, text: &str) {
        if let Some(run) = self.run.as_mut() {
            run.text.push_str(text);
        }
    }
}

/// Parse a slide part into its shapes.
pub fn parse_slide_xml(xml: &str) -> Result<SlideModel> {
    let mut reader = Reader::from_str(xml);
    let mut walker = SlideWalker::default();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => walker.start(e, false),
            Ok(Event::Empty(ref e)) => walker.start(e, true),
            Ok(Event::End(ref e)) => walker.end(local_name(e.name().as_ref())),
            Ok(Event::Text(ref e)) if walker.in_text => {
                let text = e
                    .unescape()
                    .map_err(|err| Error::XmlError(format!("Bad text in run: {}", err)))?;
                walker.push_text(&text);
            }
            Ok(Event::CData(ref e)) if walker.in_text => {
                walker.push_text(&String::from_utf8_lossy(e));
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!("Error parsing slide: {}", e)));
            }
            _ => {}
        }
    }

    Ok(SlideModel {
        shapes: walker.shapes,
    })
}

/// Record placeholder and text-box markers.
fn mark_shape_kind(shape: &mut ShapeBuilder, e: &BytesStart<'_>, name: &[u8]) {
    match name {
        b"ph" => shape.kind = ShapeKind::Placeholder,
        b"cNvSpPr" if shape.kind != ShapeKind::Placeholder => {
            if attr_value(e, b"txBox").as_deref().and_then(parse_bool) == Some(true) {
                shape.kind = ShapeKind::TextBox;
            }
        }
        _ => {}
    }
}

fn push_paragraph(shape: &mut ShapeBuilder, paragraph: ParagraphModel) {
    if let Some(paragraphs) = shape.paragraphs.as_mut() {
        paragraphs.push(paragraph);
    }
}

/// Read `sz`, `b`, and `i` from an `a:rPr` element.
fn apply_run_properties(run: &mut RunModel, e: &BytesStart<'_>) {
    for attr in e.attributes().flatten() {
        let value = String::from_utf8_lossy(&attr.value);
        match attr.key.as_ref() {
            // Hundredths of a point.
            b"sz" => run.font_size = value.parse::<f64>().ok().map(|sz| sz / 100.0),
            b"b" => run.bold = parse_bool(&value),
            b"i" => run.italic = parse_bool(&value),
            _ => {}
        }
    }
}

/// Parse an XML schema boolean.
fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "true" => Some(true),
        "0" | "false" => Some(false),
        _ => None,
    }
}
