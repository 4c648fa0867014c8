//! Reply parsing: model text → [`TaskOutput`].

use serde_json::Value;

use crate::error::ProviderError;
use crate::finding::Finding;
use crate::task::TaskOutput;

/// Confidence assumed when a reply omits it.
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

/// Parse a reviewer reply into a task output.
///
/// Fails with [`ProviderError::MalformedContent`] when no JSON object can be
/// recovered from `content`. Individual findings are normalized, never
/// rejected, and the list is cut to `max_findings`.
pub fn parse_reply(
    task: &str,
    content: &str,
    max_findings: usize,
) -> Result<TaskOutput, ProviderError> {
    let body = extract_object(strip_code_fences(content)).ok_or_else(|| {
        ProviderError::MalformedContent(format!("no JSON object in {task} reply"))
    })?;
    let value: Value = serde_json::from_str(body)
        .map_err(|e| ProviderError::MalformedContent(format!("{task} reply: {e}")))?;
    let obj = value
        .as_object()
        .ok_or_else(|| ProviderError::MalformedContent(format!("{task} reply is not an object")))?;

    let summary = obj
        .get("summary")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("{task} review completed"));

    let confidence = obj
        .get("confidence")
        .and_then(Value::as_f64)
        .unwrap_or(DEFAULT_CONFIDENCE);

    let findings: Vec<Finding> = obj
        .get("findings")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|raw| Finding::from_raw(task, raw))
                .take(max_findings)
                .collect()
        })
        .unwrap_or_default();

    Ok(TaskOutput::new(task, findings, summary, confidence))
}

/// Drop a surrounding Markdown code fence (with optional language tag).
pub fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = match rest.find('\n') {
        Some(nl) => &rest[nl + 1..],
        None => rest,
    };
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

/// Slice from the first `{` to the last `}`.
fn extract_object(content: &str) -> Option<&str> {
    let start = content.find('{')?;
    let end = content.rfind('}')?;
    (end > start).then(|| &content[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finding::Severity;

    #[test]
    fn test_parses_fenced_reply() {
        let content = "```json\n{\"summary\":\"one issue\",\"confidence\":0.8,\"findings\":[{\"severity\":\"critical\",\"category\":\"sql-injection\",\"file\":\"db.rs\",\"line\":4,\"message\":\"raw query\"}]}\n```";
        let out = parse_reply("security", content, 10).unwrap();
        assert_eq!(out.summary, "one issue");
        assert_eq!(out.confidence, 0.8);
        assert_eq!(out.findings.len(), 1);
        assert_eq!(out.findings[0].severity, Severity::Critical);
        assert_eq!(out.findings[0].source_task, "security");
        assert_eq!(out.findings[0].line, Some(4));
    }

    #[test]
    fn test_prose_around_object_is_ignored() {
        let content = "Here is my review:\n{\"summary\":\"ok\",\"findings\":[]}\nThanks!";
        let out = parse_reply("quality", content, 10).unwrap();
        assert_eq!(out.summary, "ok");
        assert_eq!(out.confidence, DEFAULT_CONFIDENCE);
    }

    #[test]
    fn test_confidence_is_clamped() {
        let out = parse_reply("quality", r#"{"confidence": 3.5}"#, 10).unwrap();
        assert_eq!(out.confidence, 1.0);
        assert_eq!(out.summary, "quality review completed");
        assert!(out.findings.is_empty());
    }

    #[test]
    fn test_findings_are_normalized_and_truncated() {
        let content = r#"{"findings":[
            {"severity":"low","message":"  "},
            {"severity":"HIGH","category":"perf","message":"loop"},
            "not an object",
            {"message":"third"}
        ]}"#;
        let out = parse_reply("performance", content, 2).unwrap();
        assert_eq!(out.findings.len(), 2);
        assert_eq!(out.findings[0].severity, Severity::Medium);
        assert_eq!(out.findings[0].message, "No details");
        assert_eq!(out.findings[0].category, "general");
        assert_eq!(out.findings[1].severity, Severity::High);
    }

    #[test]
    fn test_unparseable_reply_is_malformed() {
        for content in ["", "no json here", "{ not: valid", "[1, 2]"] {
            let err = parse_reply("quality", content, 10).unwrap_err();
            assert!(matches!(err, ProviderError::MalformedContent(_)), "{content:?}");
        }
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("  {}  "), "{}");
    }
}
