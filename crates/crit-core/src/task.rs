//! Reviewer task capability.
//!
//! The scheduler treats every reviewer uniformly through [`ReviewerTask`].
//! Inject stub implementations in tests; production reviewers are built from
//! a [`crate::reviewers::ReviewStrategy`] plus a model provider.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::change_set::{ChangeDelta, ChangeSet};
use crate::error::ReviewResult;
use crate::finding::{Finding, Severity};

/// Model class a reviewer asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityTier {
    Fast,
    Balanced,
    Deep,
}

/// Owned snapshot handed to a single task invocation.
#[derive(Debug, Clone)]
pub struct TaskInput {
    pub change_set: ChangeSet,
    /// Shared textual context (repository notes, PR description, ...).
    pub context: String,
    pub delta: ChangeDelta,
    /// Findings from tasks that already ran in this sequential invocation.
    /// Always empty in concurrent mode.
    pub previous_findings: Vec<Finding>,
}

/// One reviewer task's result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskOutput {
    pub task_name: String,
    pub findings: Vec<Finding>,
    pub summary: String,
    /// Always within `[0, 1]`.
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens_used: Option<u64>,
    /// Set only on outputs substituted for a task that failed.
    #[serde(default)]
    pub failed: bool,
}

impl TaskOutput {
    pub fn new(
        task_name: impl Into<String>,
        findings: Vec<Finding>,
        summary: impl Into<String>,
        confidence: f64,
    ) -> Self {
        Self {
            task_name: task_name.into(),
            findings,
            summary: summary.into(),
            confidence: clamp_confidence(confidence),
            latency_ms: None,
            tokens_used: None,
            failed: false,
        }
    }

    /// Degraded output substituted for a task that failed.
    pub fn failed(task_name: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        let task_name = task_name.into();
        let summary = format!("{task_name} review failed: {reason}");
        Self {
            task_name,
            findings: Vec::new(),
            summary,
            confidence: 0.0,
            latency_ms: None,
            tokens_used: None,
            failed: true,
        }
    }

    pub fn with_telemetry(mut self, latency_ms: Option<u64>, tokens_used: Option<u64>) -> Self {
        self.latency_ms = latency_ms;
        self.tokens_used = tokens_used;
        self
    }

    pub fn has_critical(&self) -> bool {
        self.findings.iter().any(|f| f.severity == Severity::Critical)
    }
}

pub(crate) fn clamp_confidence(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// A pluggable unit producing findings for a change set.
#[async_trait]
pub trait ReviewerTask: Send + Sync {
    fn name(&self) -> &str;

    /// Lower runs earlier.
    fn execution_priority(&self) -> i32;

    fn capability_tier(&self) -> CapabilityTier;

    /// Produce findings for `input`. May fail; the scheduler isolates failures.
    async fn run(&self, input: TaskInput) -> ReviewResult<TaskOutput>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_clamps_confidence() {
        assert_eq!(TaskOutput::new("t", vec![], "", 1.7).confidence, 1.0);
        assert_eq!(TaskOutput::new("t", vec![], "", -0.2).confidence, 0.0);
        assert_eq!(TaskOutput::new("t", vec![], "", f64::NAN).confidence, 0.0);
        assert_eq!(TaskOutput::new("t", vec![], "", 0.42).confidence, 0.42);
    }

    #[test]
    fn test_failed_output_is_degraded() {
        let out = TaskOutput::failed("security", "connection refused");
        assert!(out.findings.is_empty());
        assert_eq!(out.confidence, 0.0);
        assert_eq!(out.summary, "security review failed: connection refused");
        assert!(out.failed);
        assert!(!TaskOutput::new("security", vec![], "nothing to report", 0.0).failed);
    }

    #[test]
    fn test_has_critical() {
        let medium = Finding::new("perf", Severity::Medium, "performance", "slow loop");
        let critical = Finding::new("perf", Severity::Critical, "performance", "unbounded alloc");
        assert!(!TaskOutput::new("perf", vec![medium.clone()], "", 0.9).has_critical());
        assert!(TaskOutput::new("perf", vec![medium, critical], "", 0.9).has_critical());
    }
}
