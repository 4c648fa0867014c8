//! Severity-first ranking and truncation.

use crate::finding::Finding;

/// Sort by severity (critical first), then by file name with general findings
/// sorting as the empty string, and keep at most `limit`.
///
/// The sort is stable, so ties keep their incoming order.
pub fn rank_and_truncate(mut findings: Vec<Finding>, limit: usize) -> Vec<Finding> {
    findings.sort_by(|a, b| {
        a.severity.cmp(&b.severity).then_with(|| {
            a.file
                .as_deref()
                .unwrap_or("")
                .cmp(b.file.as_deref().unwrap_or(""))
        })
    });
    findings.truncate(limit);
    findings
}
