//! Shared prompt renderer and reply schema for model-backed reviewers.

use std::fmt::Write as _;

use serde_json::{json, Value};

use crate::task::TaskInput;

/// Patch text beyond this many characters per file is cut.
pub const MAX_PATCH_CHARS: usize = 4_000;

/// Render the user prompt for one reviewer invocation.
pub fn render_prompt(input: &TaskInput, categories: &[&str], max_findings: usize) -> String {
    let mut out = String::new();

    out.push_str("## Change summary\n");
    let _ = writeln!(
        out,
        "{} (risk: {})\n",
        input.delta.summary, input.delta.risk
    );

    let context = input.context.trim();
    if !context.is_empty() {
        out.push_str("## Context\n");
        out.push_str(context);
        out.push_str("\n\n");
    }

    out.push_str("## Files\n");
    for file in &input.change_set.files {
        let _ = writeln!(
            out,
            "### {} ({}, +{} -{})",
            file.filename, file.status, file.additions, file.deletions
        );
        if file.patch.is_empty() {
            out.push_str("(no patch available)\n\n");
            continue;
        }
        out.push_str("```diff\n");
        out.push_str(&cap_patch(&file.patch));
        out.push_str("\n```\n\n");
    }

    if !input.previous_findings.is_empty() {
        out.push_str("## Already reported\n");
        out.push_str("Earlier reviewers reported the following. Do not repeat them.\n");
        for f in &input.previous_findings {
            match f.location() {
                Some((file, Some(line))) => {
                    let _ = writeln!(out, "- [{}] {file}:{line} {}", f.severity, f.message);
                }
                Some((file, None)) => {
                    let _ = writeln!(out, "- [{}] {file} {}", f.severity, f.message);
                }
                None => {
                    let _ = writeln!(out, "- [{}] {}", f.severity, f.message);
                }
            }
        }
        out.push('\n');
    }

    out.push_str("## Instructions\n");
    let _ = writeln!(
        out,
        "Report at most {max_findings} findings using categories: {}.",
        categories.join(", ")
    );
    out.push_str(
        "Only reference files listed above. Reply with a single JSON object matching the schema.\n",
    );
    out
}

fn cap_patch(patch: &str) -> String {
    match patch.char_indices().nth(MAX_PATCH_CHARS) {
        Some((cut, _)) => format!("{}\n... (patch truncated)", &patch[..cut]),
        None => patch.to_string(),
    }
}

/// JSON schema every reviewer reply is expected to follow.
pub fn reply_schema(categories: &[&str], max_findings: usize) -> Value {
    json!({
        "type": "object",
        "required": ["summary", "confidence", "findings"],
        "properties": {
            "summary": { "type": "string" },
            "confidence": { "type": "number", "minimum": 0, "maximum": 1 },
            "findings": {
                "type": "array",
                "maxItems": max_findings,
                "items": {
                    "type": "object",
                    "required": ["severity", "category", "message"],
                    "properties": {
                        "severity": { "enum": ["critical", "high", "medium"] },
                        "category": { "enum": categories },
                        "file": { "type": "string" },
                        "line": { "type": "integer", "minimum": 1 },
                        "message": { "type": "string" },
                        "suggestion": { "type": "string" }
                    }
                }
            }
        }
    })
}
