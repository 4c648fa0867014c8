//! Aggregation stage: fold a [`PipelineResult`] into an [`AggregatedResult`].
//!
//! Flow: raw findings → grounding → dedup → rank/truncate. Escalation runs
//! over the raw findings and per-task confidences, independent of the
//! filtering chain.
//!
//! # Module layout
//!
//! - [`grounding`]: `filter_grounded`
//! - [`similarity`]: weighted message/location/category similarity
//! - [`dedup`]: `deduplicate`
//! - [`rank`]: `rank_and_truncate`
//! - [`escalation`]: `evaluate_escalation`, `EscalationDecision`

pub mod dedup;
pub mod escalation;
pub mod grounding;
pub mod rank;
pub mod similarity;

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::change_set::ChangeSet;
use crate::config::ReviewConfig;
use crate::finding::Finding;
use crate::obs;
use crate::pipeline::PipelineResult;

pub use dedup::deduplicate;
pub use escalation::{evaluate_escalation, EscalationDecision};
pub use grounding::filter_grounded;
pub use rank::rank_and_truncate;
pub use similarity::similarity;

/// External-facing output of the review core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedResult {
    /// Grounded, deduplicated, ranked and truncated findings.
    pub findings: Vec<Finding>,
    pub summary: String,
    pub confidence: f64,
    pub should_escalate: bool,
    pub escalation_reasons: Vec<String>,
    /// Number of findings before filtering.
    pub raw_finding_count: usize,
    pub generated_at: DateTime<Utc>,
}

/// Derive the aggregated result without mutating `result`.
///
/// `change_set` supplies the filenames for grounding; `None` or an empty
/// change set disables grounding.
pub fn aggregate(
    result: &PipelineResult,
    change_set: Option<&ChangeSet>,
    config: &ReviewConfig,
) -> AggregatedResult {
    let _span = obs::ReviewSpan::enter(&result.run_id);

    let escalation = evaluate_escalation(
        &result.findings,
        &result.task_outputs,
        config.escalation_confidence_floor,
    );

    let filenames: HashSet<&str> = change_set.map(ChangeSet::filenames).unwrap_or_default();
    let grounded = filter_grounded(result.findings.clone(), &filenames);
    let grounded_count = grounded.len();
    let deduplicated = deduplicate(grounded, config.dedup_threshold);
    let deduplicated_count = deduplicated.len();
    let findings = rank_and_truncate(deduplicated, config.max_findings);

    obs::emit_aggregated(
        config.verbose,
        result.findings.len(),
        grounded_count,
        deduplicated_count,
        findings.len(),
    );
    if escalation.should_escalate {
        obs::emit_escalated(&escalation.reasons);
    }

    let summary = format!(
        "{} of {} finding(s) kept from {} reviewer(s); {} dropped as ungrounded, {} merged as duplicates",
        findings.len(),
        result.findings.len(),
        result.task_count(),
        result.findings.len() - grounded_count,
        grounded_count - deduplicated_count,
    );

    AggregatedResult {
        findings,
        summary,
        confidence: result.confidence,
        should_escalate: escalation.should_escalate,
        escalation_reasons: escalation.reasons,
        raw_finding_count: result.findings.len(),
        generated_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change_set::ChangedFile;
    use crate::config::PipelineMode;
    use crate::finding::Severity;
    use crate::task::TaskOutput;

    fn pipeline(outputs: Vec<TaskOutput>) -> PipelineResult {
        PipelineResult::from_outputs("run-agg", outputs, vec![], PipelineMode::Concurrent, 5)
    }

    #[test]
    fn test_aggregate_does_not_mutate_pipeline_result() {
        let f = Finding::new("quality", Severity::Medium, "quality", "dup").at("a.rs", Some(1));
        let result = pipeline(vec![TaskOutput::new("quality", vec![f.clone(), f], "ok", 0.9)]);
        let before = result.clone();
        let agg = aggregate(&result, None, &ReviewConfig::default());
        assert_eq!(result, before);
        assert_eq!(agg.findings.len(), 1);
        assert_eq!(agg.raw_finding_count, 2);
        assert!(agg.summary.contains("1 merged as duplicates"));
    }

    #[test]
    fn test_escalation_sees_findings_removed_by_grounding() {
        let ghost = Finding::new("quality", Severity::Critical, "quality", "crash")
            .at("not-in-change.rs", Some(3));
        let result = pipeline(vec![TaskOutput::new("quality", vec![ghost], "ok", 0.9)]);
        let change_set = ChangeSet::new(vec![ChangedFile::modified("real.rs", "+x")]);

        let agg = aggregate(&result, Some(&change_set), &ReviewConfig::default());
        assert!(agg.findings.is_empty());
        assert!(agg.should_escalate);
        assert!(agg.escalation_reasons[0].contains("1 critical"));
    }

    #[test]
    fn test_confidence_is_carried_from_pipeline() {
        let result = pipeline(vec![
            TaskOutput::new("a", vec![], "ok", 0.8),
            TaskOutput::new("b", vec![], "ok", 0.6),
        ]);
        let agg = aggregate(&result, None, &ReviewConfig::default());
        assert!((agg.confidence - 0.7).abs() < 1e-9);
        assert!(!agg.should_escalate);
    }
}
