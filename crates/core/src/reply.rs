//! Parsing of the completion service's structured reply.

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::sync::LazyLock;

use crate::error::{Error, Result};
use crate::suggestion::{Category, Position, Severity, Suggestion};
use crate::tokens::char_len;

/// Matches a reply wrapped in a Markdown code fence.
static CODE_FENCE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^\s*```[A-Za-z]*\s*\n(.*?)\n?\s*```\s*$").unwrap());

#[derive(Debug, Deserialize)]
struct Reply {
    #[serde(default)]
    corrections: Vec<RawCorrection>,
}

/// One correction as the model wrote it; every field may be missing.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawCorrection {
    original: Option<String>,
    revised: Option<String>,
    #[serde(rename = "type")]
    category: Option<String>,
    reason: Option<String>,
    severity: Option<String>,
    position: Option<Value>,
}

/// Parse a reply body into suggestions for `text`.
///
/// Missing fields take defaults; entries whose revision equals the original are dropped.
pub fn parse_reply(reply: &str, text: &str) -> Result<Vec<Suggestion>> {
    let body = strip_code_fence(reply);
    let reply: Reply = serde_json::from_str(body).map_err(|e| Error::InvalidReply(e.to_string()))?;
    let text_len = char_len(text);

    let suggestions = reply
        .corrections
        .into_iter()
        .map(|raw| into_suggestion(raw, text_len))
        .filter(|s| {
            let unchanged = s.original == s.revised;
            if unchanged {
                log::debug!("Dropping no-op correction for {:?}", s.original);
            }
            !unchanged
        })
        .collect();

    Ok(suggestions)
}

fn strip_code_fence(reply: &str) -> &str {
    match CODE_FENCE_REGEX.captures(reply).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str(),
        None => reply.trim(),
    }
}

fn into_suggestion(raw: RawCorrection, text_len: usize) -> Suggestion {
    let category = raw
        .category
        .as_deref()
        .map(|label| {
            Category::from_label(label).unwrap_or_else(|| {
                log::debug!("Unknown category {:?}, using default", label);
                Category::default()
            })
        })
        .unwrap_or_default();

    let severity = raw
        .severity
        .as_deref()
        .and_then(Severity::from_label)
        .unwrap_or_default();

    let position = raw
        .position
        .as_ref()
        .and_then(parse_position)
        .unwrap_or(Position::new(0, text_len));

    Suggestion {
        original: raw.original.unwrap_or_default(),
        revised: raw.revised.unwrap_or_default(),
        category,
        reason: raw.reason.unwrap_or_default(),
        severity,
        position,
        context: None,
    }
}

fn parse_position(value: &Value) -> Option<Position> {
    let offset = |key: &str| -> Option<usize> {
        let field = value.get(key)?;
        field
            .as_u64()
            .or_else(|| field.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .or_else(|| field.as_str().and_then(|s| s.trim().parse().ok()))
            .map(|n| n as usize)
    };
    Some(Position::new(offset("start")?, offset("end")?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const TEXT: &str = "이거는 맞춤법 오류 이다.";

    #[test]
    fn test_single_grammar_correction() {
        let reply = r#"{"corrections":[{"original":"이거는","revised":"이것은","type":"grammar","severity":"med"}]}"#;
        let suggestions = parse_reply(reply, TEXT).unwrap();

        assert_eq!(suggestions.len(), 1);
        let s = &suggestions[0];
        assert_eq!(s.original, "이거는");
        assert_eq!(s.revised, "이것은");
        assert_eq!(s.category, Category::Grammar);
        assert_eq!(s.severity, Severity::Med);
        assert_eq!(s.reason, "");
        assert_eq!(s.position, Position::new(0, 14));
        assert_eq!(s.context, None);
    }

    #[test]
    fn test_defaults_for_missing_fields() {
        let reply = r#"{"corrections":[{"original":"맞춤법","revised":"맞춤 법"}]}"#;
        let s = &parse_reply(reply, TEXT).unwrap()[0];

        assert_eq!(s.category, Category::Spelling);
        assert_eq!(s.severity, Severity::Med);
    }

    #[test]
    fn test_unknown_labels_fall_back() {
        let reply = r#"{"corrections":[{"original":"a","revised":"b","type":"punctuation","severity":"critical"}]}"#;
        let s = &parse_reply(reply, "a").unwrap()[0];

        assert_eq!(s.category, Category::Spelling);
        assert_eq!(s.severity, Severity::High);
    }

    #[test]
    fn test_explicit_position() {
        let reply = r#"{"corrections":[
            {"original":"오류 이다","revised":"오류이다","type":"spacing","position":{"start":8,"end":13}},
            {"original":"x","revised":"y","position":{"start":"2","end":3.0}},
            {"original":"p","revised":"q","position":{"start":1}}
        ]}"#;
        let suggestions = parse_reply(reply, TEXT).unwrap();

        assert_eq!(suggestions[0].position, Position::new(8, 13));
        assert_eq!(suggestions[1].position, Position::new(2, 3));
        assert_eq!(suggestions[2].position, Position::new(0, 14));
    }

    #[test]
    fn test_identical_revision_is_dropped() {
        let reply = r#"{"corrections":[{"original":"같다","revised":"같다"},{"original":"틀리다","revised":"다르다"}]}"#;
        let suggestions = parse_reply(reply, "같다 틀리다").unwrap();

        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].original, "틀리다");
    }

    #[test]
    fn test_empty_and_missing_corrections() {
        assert!(parse_reply(r#"{"corrections":[]}"#, TEXT).unwrap().is_empty());
        assert!(parse_reply("{}", TEXT).unwrap().is_empty());
    }

    #[test]
    fn test_code_fenced_reply() {
        let reply = "```json\n{\"corrections\":[{\"original\":\"a\",\"revised\":\"b\"}]}\n```";
        assert_eq!(parse_reply(reply, "a").unwrap().len(), 1);
    }

    #[test]
    fn test_malformed_reply() {
        assert!(matches!(
            parse_reply("죄송합니다, 도와드릴 수 없습니다.", TEXT),
            Err(Error::InvalidReply(_))
        ));
        assert!(matches!(
            parse_reply(r#"{"corrections":"none"}"#, TEXT),
            Err(Error::InvalidReply(_))
        ));
    }
}
