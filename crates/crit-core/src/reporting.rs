//! Review artifacts: `review.json` and the Markdown review body.

use std::fmt::Write as _;
use std::path::Path;

use crate::aggregate::AggregatedResult;
use crate::error::ReviewResult;
use crate::finding::Finding;

/// Write the aggregated result as pretty JSON.
pub fn write_review_json(path: &Path, result: &AggregatedResult) -> ReviewResult<()> {
    let content = serde_json::to_string_pretty(result)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Render the Markdown body posted as a review comment.
pub fn render_review_md(result: &AggregatedResult) -> String {
    let mut out = String::new();
    out.push_str("# Review Summary\n\n");

    let verdict = if result.should_escalate {
        "**Human review required**"
    } else {
        "No escalation"
    };
    let _ = writeln!(
        out,
        "- verdict: {verdict}\n- confidence: {:.2}\n- findings: {} kept of {} reported\n",
        result.confidence,
        result.findings.len(),
        result.raw_finding_count
    );
    out.push_str(&result.summary);
    out.push_str("\n\n");

    if !result.escalation_reasons.is_empty() {
        out.push_str("## Escalation\n");
        for reason in &result.escalation_reasons {
            let _ = writeln!(out, "- {reason}");
        }
        out.push('\n');
    }

    if result.findings.is_empty() {
        out.push_str("## Findings\nNo findings.\n");
        return out;
    }

    out.push_str("## Findings\n");
    out.push_str("| Severity | Location | Category | Message | Reviewer |\n");
    out.push_str("|---|---|---|---|---|\n");
    for f in &result.findings {
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} | {} |",
            f.severity,
            location_cell(f),
            f.category,
            table_cell(&f.message),
            f.source_task
        );
    }

    let suggestions: Vec<&Finding> = result.findings.iter().filter(|f| f.suggestion.is_some()).collect();
    if !suggestions.is_empty() {
        out.push_str("\n### Suggestions\n");
        for f in suggestions {
            if let Some(s) = &f.suggestion {
                let _ = writeln!(out, "- {}: {}", location_cell(f), s);
            }
        }
    }
    out
}

/// Write review.md.
pub fn write_review_md(path: &Path, result: &AggregatedResult) -> ReviewResult<()> {
    std::fs::write(path, render_review_md(result))?;
    Ok(())
}

fn location_cell(f: &Finding) -> String {
    match f.location() {
        Some((file, Some(line))) => format!("`{file}:{line}`"),
        Some((file, None)) => format!("`{file}`"),
        None => "general".to_string(),
    }
}

fn table_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}
