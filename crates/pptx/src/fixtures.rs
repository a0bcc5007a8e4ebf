//! In-memory PPTX packages for tests.

use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::ZipWriter;

const NAMESPACES: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#;

const SLIDE_REL_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";

/// Builds a minimal but well-formed presentation package.
pub struct PptxBuilder {
    slides: Vec<String>,
    order: Option<Vec<usize>>,
}

impl PptxBuilder {
    pub fn new() -> Self {
        Self {
            slides: Vec::new(),
            order: None,
        }
    }

    /// Add a slide whose `p:cSld` contains `sp_tree`.
    pub fn slide(mut self, sp_tree: &str) -> Self {
        self.slides.push(format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld {}><p:cSld>{}</p:cSld></p:sld>"#,
            NAMESPACES, sp_tree
        ));
        self
    }

    /// Present slide parts in this order (1-based part numbers).
    pub fn order(mut self, order: &[usize]) -> Self {
        self.order = Some(order.to_vec());
        self
    }

    pub fn build(self) -> Vec<u8> {
        let order = self
            .order
            .unwrap_or_else(|| (1..=self.slides.len()).collect());

        let rels: String = (1..=self.slides.len())
            .map(|n| {
                format!(
                    r#"<Relationship Id="rId{}" Type="{}" Target="slides/slide{}.xml"/>"#,
                    n + 1,
                    SLIDE_REL_TYPE,
                    n
                )
            })
            .collect();
        let rels = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster" Target="slideMasters/slideMaster1.xml"/>{}</Relationships>"#,
            rels
        );

        let ids: String = order
            .iter()
            .enumerate()
            .map(|(i, n)| format!(r#"<p:sldId id="{}" r:id="rId{}"/>"#, 256 + i, n + 1))
            .collect();
        let presentation = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation {}><p:sldIdLst>{}</p:sldIdLst></p:presentation>"#,
            NAMESPACES, ids
        );

        let mut parts = vec![
            ("[Content_Types].xml".to_string(), "<Types/>".to_string()),
            ("docProps/app.xml".to_string(), "<Properties/>".to_string()),
            ("ppt/presentation.xml".to_string(), presentation),
            ("ppt/_rels/presentation.xml.rels".to_string(), rels),
        ];
        for (i, slide) in self.slides.into_iter().enumerate() {
            parts.push((format!("ppt/slides/slide{}.xml", i + 1), slide));
        }

        write_zip(parts.iter().map(|(n, c)| (n.as_str(), c.as_str())))
    }
}

/// A package containing exactly the given parts.
pub fn package_with_parts(parts: &[(&str, &str)]) -> Vec<u8> {
    write_zip(parts.iter().copied())
}

fn write_zip<'a>(parts: impl Iterator<Item = (&'a str, &'a str)>) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in parts {
        zip.start_file(name, FileOptions::default()).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

/// A text box shape; each inner slice is a paragraph of run texts.
pub fn text_box(id: usize, paragraphs: &[&[&str]]) -> String {
    shape(id, r#"<p:cNvSpPr txBox="1"/>"#, "<p:nvPr/>", paragraphs)
}

/// A title placeholder shape.
pub fn title(id: usize, paragraphs: &[&[&str]]) -> String {
    shape(id, "<p:cNvSpPr/>", r#"<p:nvPr><p:ph type="title"/></p:nvPr>"#, paragraphs)
}

/// A picture, which holds no text.
pub fn picture(id: usize) -> String {
    format!(
        r#"<p:pic><p:nvPicPr><p:cNvPr id="{}" name="Picture {}"/><p:cNvPicPr/><p:nvPr/></p:nvPicPr></p:pic>"#,
        id, id
    )
}

fn shape(id: usize, c_nv_sp_pr: &str, nv_pr: &str, paragraphs: &[&[&str]]) -> String {
    let body: String = paragraphs
        .iter()
        .map(|runs| {
            let runs: String = runs
                .iter()
                .map(|t| format!(r#"<a:r><a:rPr lang="ko-KR"/><a:t>{}</a:t></a:r>"#, t))
                .collect();
            format!("<a:p>{}</a:p>", runs)
        })
        .collect();

    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{}" name="Shape {}"/>{}{}</p:nvSpPr><p:spPr/><p:txBody><a:bodyPr/><a:lstStyle/>{}</p:txBody></p:sp>"#,
        id, id, c_nv_sp_pr, nv_pr, body
    )
}

/// Wrap shapes in a shape tree.
pub fn sp_tree(shapes: &[String]) -> String {
    format!(
        r#"<p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>{}</p:spTree>"#,
        shapes.concat()
    )
}
