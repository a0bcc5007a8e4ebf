//! Writing accepted suggestions back into a PPTX package.
//!
//! Replacements happen inside the text of individual runs, so a suggestion
//! whose original text spans several runs is reported as unmatched.

use quick_xml::events::{BytesText, Event};
use quick_xml::{Reader, Writer};
use regex::Regex;
use serde::Serialize;
use spellcheck_core::{Error, Result, Suggestion};
use std::collections::{BTreeMap, HashMap};
use std::io::{Cursor, Read, Seek, Write};
use std::sync::LazyLock;
use zip::write::FileOptions;
use zip::ZipWriter;

use crate::package::{local_name, open_package, read_part, slide_paths};
use crate::parser::SHAPE_ELEMENTS;

static SHAPE_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^shape-(\d+)-(\d+)$").unwrap());

/// Outcome of applying a batch of suggestions.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ApplyReport {
    /// Number of suggestions that changed at least one run.
    pub applied: usize,

    /// Total number of text replacements made.
    pub replacements: usize,

    /// Suggestions that did not match any run text.
    pub unmatched: Vec<Suggestion>,
}

/// Apply `suggestions` to the package read from `reader`, writing the result to `writer`.
///
/// Suggestions without a slide index, or whose slide does not exist, are unmatched.
pub fn apply_corrections<R, W>(reader: R, writer: W, suggestions: &[Suggestion]) -> Result<ApplyReport>
where
    R: Read + Seek,
    W: Write + Seek,
{
    let mut archive = open_package(reader)?;
    let paths = slide_paths(&mut archive)?;
    let mut report = ApplyReport::default();

    let mut by_slide: BTreeMap<usize, Vec<&Suggestion>> = BTreeMap::new();
    for suggestion in suggestions {
        match suggestion.slide_index() {
            Some(index) if (1..=paths.len()).contains(&index) => {
                by_slide.entry(index).or_default().push(suggestion);
            }
            _ => report.unmatched.push(suggestion.clone()),
        }
    }

    let mut rewritten: HashMap<String, String> = HashMap::new();
    for (slide_index, slide_suggestions) in by_slide {
        let path = &paths[slide_index - 1];
        let xml = read_part(&mut archive, path)?;
        let (new_xml, hits) = rewrite_slide_xml(&xml, slide_index, &slide_suggestions)?;

        for (suggestion, count) in slide_suggestions.iter().zip(hits) {
            if count > 0 {
                report.applied += 1;
                report.replacements += count;
            } else {
                report.unmatched.push((*suggestion).clone());
            }
        }
        log::debug!("Rewrote {} for slide {}", path, slide_index);
        rewritten.insert(path.clone(), new_xml);
    }

    let mut zip = ZipWriter::new(writer);
    for i in 0..archive.len() {
        let file = archive
            .by_index(i)
            .map_err(|e| Error::ZipError(format!("Failed to read entry {}: {}", i, e)))?;

        match rewritten.remove(file.name()) {
            Some(xml) => {
                let options = FileOptions::default().compression_method(file.compression());
                zip.start_file(file.name(), options)
                    .map_err(|e| Error::ZipError(e.to_string()))?;
                zip.write_all(xml.as_bytes())?;
            }
            None => zip
                .raw_copy_file(file)
                .map_err(|e| Error::ZipError(e.to_string()))?,
        }
    }
    zip.finish().map_err(|e| Error::ZipError(e.to_string()))?;

    if !report.unmatched.is_empty() {
        log::warn!(
            "{} suggestion(s) did not match any run text",
            report.unmatched.len()
        );
    }

    Ok(report)
}

/// Replace suggestion originals inside the run text of one slide part.
///
/// Returns the new XML and, per suggestion, the number of replacements made.
fn rewrite_slide_xml(
    xml: &str,
    slide_index: usize,
    suggestions: &[&Suggestion],
) -> Result<(String, Vec<usize>)> {
    // Longest originals first so that a shorter one cannot break a longer match.
    let mut order: Vec<usize> = (0..suggestions.len()).collect();
    order.sort_by_key(|&i| std::cmp::Reverse(suggestions[i].original.chars().count()));

    let targets: Vec<Option<usize>> = suggestions
        .iter()
        .map(|s| s.shape_id().and_then(|id| shape_position(id, slide_index)))
        .collect();

    let mut hits = vec![0usize; suggestions.len()];
    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Cursor::new(Vec::new()));

    let mut depth = 0usize;
    let mut tree_level: Option<usize> = None;
    let mut shape_count = 0usize;
    let mut shape_level: Option<usize> = None;
    let mut in_run = false;
    let mut in_text = false;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| Error::XmlError(format!("Error parsing slide: {}", e)))?;

        match &event {
            Event::Start(e) => {
                depth += 1;
                let qname = e.name();
                let name = local_name(qname.as_ref());
                match tree_level {
                    None if name == b"spTree" => tree_level = Some(depth),
                    Some(tree) if depth == tree + 1 && SHAPE_ELEMENTS.contains(&name) => {
                        shape_count += 1;
                        shape_level = Some(depth);
                    }
                    _ => {}
                }
                match name {
                    b"r" => in_run = true,
                    b"t" if in_run => in_text = true,
                    _ => {}
                }
            }
            Event::Empty(e) => {
                let qname = e.name();
                if let Some(tree) = tree_level {
                    if depth + 1 == tree + 1 && SHAPE_ELEMENTS.contains(&local_name(qname.as_ref()))
                    {
                        shape_count += 1;
                    }
                }
            }
            Event::End(e) => {
                let qname = e.name();
                match local_name(qname.as_ref()) {
                    b"t" => in_text = false,
                    b"r" => in_run = false,
                    _ => {}
                }
                if shape_level == Some(depth) {
                    shape_level = None;
                }
                depth = depth.saturating_sub(1);
            }
            Event::Text(e) if in_text => {
                let original = e
                    .unescape()
                    .map_err(|err| Error::XmlError(format!("Bad text in run: {}", err)))?;
                let mut text = original.to_string();

                for &i in &order {
                    let suggestion = suggestions[i];
                    if suggestion.original.is_empty() {
                        continue;
                    }
                    if let Some(target) = targets[i] {
                        if shape_level.is_none() || target != shape_count {
                            continue;
                        }
                    }
                    let count = text.matches(suggestion.original.as_str()).count();
                    if count > 0 {
                        text = text.replace(suggestion.original.as_str(), &suggestion.revised);
                        hits[i] += count;
                    }
                }

                if text != original {
                    write_event(&mut writer, Event::Text(BytesText::new(&text)))?;
                    continue;
                }
            }
            Event::Eof => break,
            _ => {}
        }

        write_event(&mut writer, event)?;
    }

    let bytes = writer.into_inner().into_inner();
    let xml = String::from_utf8(bytes).map_err(|e| Error::XmlError(e.to_string()))?;
    Ok((xml, hits))
}

fn write_event(writer: &mut Writer<Cursor<Vec<u8>>>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| Error::XmlError(format!("Failed to write slide: {}", e)))
}

/// The 1-based shape position named by `shape_id`, if it belongs to `slide_index`.
fn shape_position(shape_id: &str, slide_index: usize) -> Option<usize> {
    let caps = SHAPE_ID_REGEX.captures(shape_id)?;
    let slide: usize = caps[1].parse().ok()?;
    let position: usize = caps[2].parse().ok()?;
    (slide == slide_index).then_some(position)
}
