//! Escalation: decide whether a human must review the change.
//!
//! Evaluated over the raw, pre-filter finding set so that a finding later
//! removed by grounding or dedup can still trigger escalation.

use serde::{Deserialize, Serialize};

use crate::finding::{Finding, Severity};
use crate::reviewers::SECURITY_TASK;
use crate::task::TaskOutput;

/// Escalation verdict with one reason per satisfied rule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EscalationDecision {
    pub should_escalate: bool,
    pub reasons: Vec<String>,
}

/// Apply every escalation rule; reasons accumulate.
///
/// - any critical finding
/// - any task confidence strictly below `confidence_floor`
/// - any security-task finding above medium severity
pub fn evaluate_escalation(
    findings: &[Finding],
    outputs: &[TaskOutput],
    confidence_floor: f64,
) -> EscalationDecision {
    let mut reasons = Vec::new();

    let critical = findings
        .iter()
        .filter(|f| f.severity == Severity::Critical)
        .count();
    if critical > 0 {
        reasons.push(format!(
            "{critical} critical {} reported",
            plural(critical, "finding", "findings")
        ));
    }

    let low_confidence: Vec<&str> = outputs
        .iter()
        .filter(|o| o.confidence < confidence_floor)
        .map(|o| o.task_name.as_str())
        .collect();
    if !low_confidence.is_empty() {
        reasons.push(format!(
            "low confidence (< {confidence_floor}) from: {}",
            low_confidence.join(", ")
        ));
    }

    let security = findings
        .iter()
        .filter(|f| f.source_task == SECURITY_TASK && f.severity != Severity::Medium)
        .count();
    if security > 0 {
        reasons.push(format!(
            "{security} security {} rated high or critical",
            plural(security, "finding", "findings")
        ));
    }

    EscalationDecision {
        should_escalate: !reasons.is_empty(),
        reasons,
    }
}

fn plural<'a>(n: usize, one: &'a str, many: &'a str) -> &'a str {
    if n == 1 {
        one
    } else {
        many
    }
}
