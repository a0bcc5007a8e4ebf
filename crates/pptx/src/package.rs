//! Helpers for navigating the OOXML package of a PPTX file.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use spellcheck_core::{Error, Result};
use std::collections::HashMap;
use std::io::{Read, Seek};
use zip::ZipArchive;

pub const PRESENTATION_PART: &str = "ppt/presentation.xml";
pub const PRESENTATION_RELS_PART: &str = "ppt/_rels/presentation.xml.rels";

/// ZIP local file header signature; every PPTX starts with it.
const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

/// Check whether `bytes` start like a ZIP (and therefore possibly PPTX) file.
pub fn has_zip_magic(bytes: &[u8]) -> bool {
    bytes.starts_with(&ZIP_MAGIC)
}

/// Open a PPTX package, checking that it contains a presentation part.
pub fn open_package<R: Read + Seek>(reader: R) -> Result<ZipArchive<R>> {
    let archive = ZipArchive::new(reader)
        .map_err(|e| Error::UnsupportedFormat(format!("not a ZIP package: {}", e)))?;

    if !archive.file_names().any(|name| name == PRESENTATION_PART) {
        return Err(Error::UnsupportedFormat(format!(
            "missing {}; not a PowerPoint package",
            PRESENTATION_PART
        )));
    }

    Ok(archive)
}

/// Read a part of the package as UTF-8 text.
pub fn read_part<R: Read + Seek>(archive: &mut ZipArchive<R>, path: &str) -> Result<String> {
    let mut file = archive
        .by_name(path)
        .map_err(|e| Error::ZipError(format!("File not found in archive '{}': {}", path, e)))?;

    let mut content = String::new();
    file.read_to_string(&mut content)
        .map_err(|e| Error::ZipError(format!("Failed to read '{}': {}", path, e)))?;

    Ok(content)
}

/// Get the slide part paths in presentation order.
///
/// The order comes from `sldIdLst` in the presentation part. Packages without
/// that list fall back to slide relationships sorted by their number.
pub fn slide_paths<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<Vec<String>> {
    let rels = read_relationships(&read_part(archive, PRESENTATION_RELS_PART)?)?;
    let slide_ids = read_slide_id_list(&read_part(archive, PRESENTATION_PART)?)?;

    if !slide_ids.is_empty() {
        let mut paths = Vec::with_capacity(slide_ids.len());
        for rel_id in slide_ids {
            match rels.get(&rel_id) {
                Some(rel) if rel.is_slide() => paths.push(resolve_target(&rel.target)),
                _ => log::warn!("Slide relationship {} not found, skipping", rel_id),
            }
        }
        return Ok(paths);
    }

    let mut slides: Vec<(&str, &Relationship)> = rels
        .iter()
        .filter(|(_, rel)| rel.is_slide())
        .map(|(id, rel)| (id.as_str(), rel))
        .collect();

    slides.sort_by(|a, b| {
        let na = extract_slide_number(&a.1.target).or_else(|| extract_slide_number(a.0));
        let nb = extract_slide_number(&b.1.target).or_else(|| extract_slide_number(b.0));
        match (na, nb) {
            (Some(na), Some(nb)) => na.cmp(&nb),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.1.target.cmp(&b.1.target),
        }
    });

    Ok(slides
        .into_iter()
        .map(|(_, rel)| resolve_target(&rel.target))
        .collect())
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Relationship {
    rel_type: String,
    target: String,
}

impl Relationship {
    fn is_slide(&self) -> bool {
        self.rel_type.ends_with("/slide")
    }
}

fn read_relationships(xml: &str) -> Result<HashMap<String, Relationship>> {
    let mut rels = HashMap::new();
    let mut reader = Reader::from_str(xml);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if local_name(e.name().as_ref()) == b"Relationship" =>
            {
                let id = attr_value(e, b"Id").unwrap_or_default();
                rels.insert(
                    id,
                    Relationship {
                        rel_type: attr_value(e, b"Type").unwrap_or_default(),
                        target: attr_value(e, b"Target").unwrap_or_default(),
                    },
                );
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error parsing relationships: {}",
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(rels)
}

/// Relationship ids of `p:sldId` entries, in order.
fn read_slide_id_list(xml: &str) -> Result<Vec<String>> {
    let mut ids = Vec::new();
    let mut reader = Reader::from_str(xml);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if local_name(e.name().as_ref()) == b"sldId" =>
            {
                // `id` is the numeric slide id; the relationship id is the prefixed `r:id`.
                let rel_id = e.attributes().flatten().find_map(|attr| {
                    let key = attr.key.as_ref();
                    (key != b"id" && local_name(key) == b"id")
                        .then(|| String::from_utf8_lossy(&attr.value).to_string())
                });
                if let Some(rel_id) = rel_id {
                    ids.push(rel_id);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error parsing presentation part: {}",
                    e
                )));
            }
            _ => {}
        }
    }

    Ok(ids)
}

/// Turn a relationship target into a package path.
fn resolve_target(target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        absolute.to_string()
    } else {
        format!("ppt/{}", target)
    }
}

/// Get an attribute value by exact key.
pub fn attr_value(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .map(|attr| String::from_utf8_lossy(&attr.value).to_string())
}

/// Extract the local name from a potentially namespaced XML element name.
pub fn local_name(name: &[u8]) -> &[u8] {
    if let Some(pos) = name.iter().position(|&b| b == b':') {
        &name[pos + 1..]
    } else {
        name
    }
}

/// Extract a slide number from a string like "rId2" or "slide3.xml".
fn extract_slide_number(s: &str) -> Option<usize> {
    let s = s.trim_end_matches(".xml").trim_end_matches(".rels");

    let digits: String = s.chars().rev().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let digits: String = digits.chars().rev().collect();
    digits.parse().ok()
}
