//! Correction suggestions and analysis results.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::types::Stats;

/// What kind of problem a suggestion fixes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Spelling,
    Spacing,
    Grammar,
    Consistency,
    Style,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Self::Spelling,
        Self::Spacing,
        Self::Grammar,
        Self::Consistency,
        Self::Style,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Spelling => "spelling",
            Self::Spacing => "spacing",
            Self::Grammar => "grammar",
            Self::Consistency => "consistency",
            Self::Style => "style",
        }
    }

    /// Parse a label as written by the model.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "spelling" => Some(Self::Spelling),
            "spacing" => Some(Self::Spacing),
            "grammar" => Some(Self::Grammar),
            "consistency" => Some(Self::Consistency),
            "style" => Some(Self::Style),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How important a suggestion is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    #[default]
    Med,
    Low,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Self::High, Self::Med, Self::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Med => "med",
            Self::Low => "low",
        }
    }

    /// Parse a label as written by the model.
    ///
    /// Accepts the critical/important/minor scale as well.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "high" | "critical" => Some(Self::High),
            "med" | "medium" | "important" => Some(Self::Med),
            "low" | "minor" => Some(Self::Low),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Character offsets `[start, end)` into the analyzed text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub start: usize,
    pub end: usize,
}

impl Position {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// Where in a document an analyzed text came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionContext {
    pub slide_index: usize,
    pub shape_id: String,
    /// `[paragraph, run]` of the originating run.
    pub run_path: [usize; 2],
}

impl SuggestionContext {
    /// Context for a whole shape; the run path points at its first run.
    pub fn for_shape(slide_index: usize, shape_id: impl Into<String>) -> Self {
        Self {
            slide_index,
            shape_id: shape_id.into(),
            run_path: [0, 0],
        }
    }
}

/// One proposed correction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub original: String,
    pub revised: String,

    #[serde(rename = "type")]
    pub category: Category,

    #[serde(default)]
    pub reason: String,

    #[serde(default)]
    pub severity: Severity,

    /// Absent in corrections that only name a shape; treated as `{0, 0}`.
    #[serde(default)]
    pub position: Position,

    #[serde(flatten)]
    pub context: Option<SuggestionContext>,
}

impl Suggestion {
    pub fn with_context(mut self, context: Option<&SuggestionContext>) -> Self {
        self.context = context.cloned();
        self
    }

    pub fn slide_index(&self) -> Option<usize> {
        self.context.as_ref().map(|c| c.slide_index)
    }

    pub fn shape_id(&self) -> Option<&str> {
        self.context.as_ref().map(|c| c.shape_id.as_str())
    }
}

/// Identifier of one analysis run: a prefix plus the start time in milliseconds.
///
/// Two analyses started within the same millisecond share an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub const DOCUMENT_PREFIX: &'static str = "ai-job";
    pub const TEXT_PREFIX: &'static str = "text-job";

    pub fn generate(prefix: &str) -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        Self(format!("{}-{}", prefix, millis))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The output of one corrector invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub job_id: JobId,
    pub suggestions: Vec<Suggestion>,
    pub stats: Stats,
}
