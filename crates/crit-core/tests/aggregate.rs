//! Aggregation tests over hand-built pipeline results.

use crit_core::aggregate::similarity::similarity;
use crit_core::{
    aggregate, deduplicate, evaluate_escalation, ChangeSet, ChangedFile, Finding, PipelineMode,
    PipelineResult, ReviewConfig, Severity, TaskOutput,
};

fn change_set(files: &[&str]) -> ChangeSet {
    ChangeSet::new(files.iter().map(|f| ChangedFile::modified(*f, "+line")).collect())
}

fn pipeline(outputs: Vec<TaskOutput>) -> PipelineResult {
    PipelineResult::from_outputs("run-test", outputs, vec![], PipelineMode::Concurrent, 12)
}

fn confident_outputs(n: usize) -> Vec<TaskOutput> {
    (0..n)
        .map(|i| TaskOutput::new(format!("task-{i}"), vec![], "ok", 0.9))
        .collect()
}

// ---- Escalation trigger set ----

#[test]
fn test_single_critical_security_finding_escalates() {
    let findings = vec![Finding::new("security", Severity::Critical, "sql-injection", "raw query")];
    let decision = evaluate_escalation(&findings, &confident_outputs(5), 0.5);
    assert!(decision.should_escalate);
    assert!(decision.reasons.iter().any(|r| r.contains("1 critical")));
}

#[test]
fn test_no_findings_with_confident_tasks_does_not_escalate() {
    let decision = evaluate_escalation(&[], &confident_outputs(5), 0.5);
    assert!(!decision.should_escalate);
}

// ---- Grounding ----

#[test]
fn test_aggregate_drops_ungrounded_and_keeps_general() {
    let findings = vec![
        Finding::new("quality", Severity::Medium, "quality", "unused import").at("x.ts", Some(2)),
        Finding::new("quality", Severity::Medium, "quality", "dead branch").at("y.ts", Some(9)),
        Finding::new("quality", Severity::Medium, "quality", "naming is inconsistent"),
    ];
    let result = pipeline(vec![TaskOutput::new("quality", findings, "ok", 0.9)]);

    let agg = aggregate(&result, Some(&change_set(&["y.ts"])), &ReviewConfig::default());
    let files: Vec<Option<&str>> = agg.findings.iter().map(|f| f.file.as_deref()).collect();
    assert_eq!(files, vec![Some("y.ts"), None]);
    assert_eq!(agg.raw_finding_count, 3);
    assert!(agg.summary.contains("1 dropped as ungrounded"));

    let agg = aggregate(&result, Some(&change_set(&["x.ts", "y.ts"])), &ReviewConfig::default());
    assert_eq!(agg.findings.len(), 3);
}

// ---- Dedup properties ----

#[test]
fn test_identity_similarity_for_every_shape() {
    let located = Finding::new("security", Severity::High, "xss", "unescaped html").at("a.ts", Some(3));
    let file_only = Finding::new("security", Severity::High, "xss", "unescaped html").at("a.ts", None);
    let general = Finding::new("quality", Severity::Medium, "quality", "docs missing");
    for f in [located, file_only, general] {
        assert_eq!(similarity(&f, &f), 1.0);
    }
}

#[test]
fn test_merge_never_lowers_severity() {
    let pairs = [
        (Severity::Medium, Severity::Critical),
        (Severity::Critical, Severity::Medium),
        (Severity::High, Severity::High),
    ];
    for (first, second) in pairs {
        let a = Finding::new("security", first, "secrets", "API key committed").at("cfg.rs", Some(4));
        let b = Finding::new("quality", second, "secrets", "API key committed").at("cfg.rs", Some(4));
        let out = deduplicate(vec![a, b], 0.8);
        assert_eq!(out.len(), 1);
        assert!(!first.is_more_severe_than(out[0].severity));
        assert!(!second.is_more_severe_than(out[0].severity));
    }
}

#[test]
fn test_sql_injection_messages_threshold_boundary() {
    let a = Finding::new("security", Severity::High, "sql-injection", "SQL injection risk").at("db.rs", Some(10));
    let b = Finding::new("security", Severity::High, "sql-injection", "SQL injection issue found")
        .at("db.rs", Some(10));
    assert_eq!(deduplicate(vec![a.clone(), b.clone()], 0.5).len(), 1);
    assert_eq!(deduplicate(vec![a, b], 0.99).len(), 2);
}

#[test]
fn test_related_categories_across_reviewers_merge() {
    // sql-injection and injection are related (0.7 * 0.2 = 0.14)
    let a = Finding::new("security", Severity::High, "sql-injection", "User input reaches query")
        .at("db.rs", Some(10));
    let b = Finding::new("quality", Severity::Medium, "injection", "User input reaches query")
        .at("db.rs", Some(12));
    // 0.5 + 0.9 * 0.3 + 0.14 = 0.91
    let out = deduplicate(vec![a, b], 0.9);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].severity, Severity::High);
}

#[test]
fn test_aggregate_respects_configured_limit_and_threshold() {
    let findings: Vec<Finding> = (0..6)
        .map(|i| {
            Finding::new("quality", Severity::Medium, "quality", format!("distinct issue number {i}"))
                .at(format!("f{i}.rs"), Some(1))
        })
        .collect();
    let result = pipeline(vec![TaskOutput::new("quality", findings, "ok", 0.9)]);
    let config = ReviewConfig {
        max_findings: 4,
        ..ReviewConfig::default()
    };
    let agg = aggregate(&result, None, &config);
    assert_eq!(agg.findings.len(), 4);
    assert_eq!(agg.raw_finding_count, 6);
}

#[test]
fn test_aggregated_result_serializes_for_reporting() {
    let result = pipeline(confident_outputs(2));
    let agg = aggregate(&result, None, &ReviewConfig::default());
    let raw = serde_json::to_value(&agg).expect("serialize");
    assert_eq!(raw["should_escalate"], serde_json::json!(false));
    assert!(raw["generated_at"].is_string());
}
