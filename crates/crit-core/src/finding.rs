//! Findings reported by reviewer tasks.
//!
//! A [`Finding`] is always well-formed once constructed: reviewer replies are
//! normalized at the boundary by [`Finding::from_raw`], so downstream stages
//! never see an unknown severity or an empty message.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Category assigned when a reviewer omits one.
pub const DEFAULT_CATEGORY: &str = "general";

/// Message assigned when a reviewer omits one.
pub const DEFAULT_MESSAGE: &str = "No details";

/// Finding severity.
///
/// Ordered so that an ascending sort puts the most severe first:
/// `Critical < High < Medium`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Critical,
    High,
    Medium,
}

impl Severity {
    /// Lenient parse. Anything unrecognized maps to [`Severity::Medium`].
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "critical" => Self::Critical,
            "high" => Self::High,
            _ => Self::Medium,
        }
    }

    /// `true` when `self` ranks strictly above `other`.
    pub fn is_more_severe_than(self, other: Severity) -> bool {
        self < other
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Critical => write!(f, "critical"),
            Self::High => write!(f, "high"),
            Self::Medium => write!(f, "medium"),
        }
    }
}

/// One reported issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Name of the reviewer task that produced this finding.
    pub source_task: String,
    pub severity: Severity,
    /// Free-form label from the reviewer's taxonomy.
    pub category: String,
    /// `None` means the finding is general, not tied to a file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl Finding {
    pub fn new(
        source_task: impl Into<String>,
        severity: Severity,
        category: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            source_task: source_task.into(),
            severity,
            category: non_blank(category.into()).unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            file: None,
            line: None,
            message: non_blank(message.into()).unwrap_or_else(|| DEFAULT_MESSAGE.to_string()),
            suggestion: None,
        }
    }

    pub fn at(mut self, file: impl Into<String>, line: Option<u32>) -> Self {
        self.file = non_blank(file.into());
        self.line = line;
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = non_blank(suggestion.into());
        self
    }

    /// Build a finding from a loosely-typed reviewer reply item.
    ///
    /// Returns `None` only when `raw` is not a JSON object. Individual fields
    /// are never rejected; malformed values fall back to safe defaults.
    pub fn from_raw(source_task: &str, raw: &Value) -> Option<Self> {
        let obj = raw.as_object()?;

        let severity = obj
            .get("severity")
            .and_then(Value::as_str)
            .map(Severity::parse)
            .unwrap_or(Severity::Medium);

        Some(Self {
            source_task: source_task.to_string(),
            severity,
            category: string_field(obj.get("category"))
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            file: string_field(obj.get("file")),
            line: obj.get("line").and_then(line_number),
            message: string_field(obj.get("message"))
                .unwrap_or_else(|| DEFAULT_MESSAGE.to_string()),
            suggestion: string_field(obj.get("suggestion")),
        })
    }

    /// Usable location. A line without a file is not a location.
    pub fn location(&self) -> Option<(&str, Option<u32>)> {
        self.file.as_deref().map(|f| (f, self.line))
    }

    pub fn is_critical(&self) -> bool {
        self.severity == Severity::Critical
    }
}

fn non_blank(s: String) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn string_field(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .and_then(|s| non_blank(s.to_string()))
}

fn line_number(value: &Value) -> Option<u32> {
    let n = match value {
        Value::Number(n) => n.as_u64()?,
        Value::String(s) => s.trim().parse::<u64>().ok()?,
        _ => return None,
    };
    u32::try_from(n).ok().filter(|n| *n > 0)
}
