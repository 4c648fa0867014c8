//! Structured observability hooks for review pipeline events.
//!
//! Step-by-step events (task start/finish/skip) are emitted at `debug!` and
//! promoted to `info!` when the caller runs with `verbose` set. Outcome events
//! (failures, escalation) are always emitted at a fixed level.

use tracing::{debug, info, warn};

macro_rules! step {
    ($verbose:expr, $($arg:tt)+) => {
        if $verbose {
            info!($($arg)+);
        } else {
            debug!($($arg)+);
        }
    };
}

/// RAII guard that enters a review-scoped tracing span for synchronous stages.
///
/// ```ignore
/// let _span = ReviewSpan::enter(&result.run_id);
/// // aggregation events are now tagged with run_id
/// ```
pub struct ReviewSpan {
    _span: tracing::span::EnteredSpan,
}

impl ReviewSpan {
    pub fn enter(run_id: &str) -> Self {
        let span = tracing::info_span!("crit.review", run_id = %run_id);
        Self {
            _span: span.entered(),
        }
    }
}

pub fn emit_task_started(verbose: bool, task: &str, priority: i32, previous_findings: usize) {
    step!(
        verbose,
        event = "review.task_started",
        task = %task,
        priority = priority,
        previous_findings = previous_findings,
    );
}

pub fn emit_task_finished(verbose: bool, task: &str, findings: usize, confidence: f64, latency_ms: u64) {
    step!(
        verbose,
        event = "review.task_finished",
        task = %task,
        findings = findings,
        confidence = confidence,
        latency_ms = latency_ms,
    );
}

pub fn emit_task_skipped(verbose: bool, task: &str, reason: &str) {
    step!(verbose, event = "review.task_skipped", task = %task, reason = %reason);
}

/// Task failure absorbed into a degraded output.
pub fn emit_task_failed(task: &str, error: &dyn std::fmt::Display) {
    warn!(event = "review.task_failed", task = %task, error = %error);
}

pub fn emit_pipeline_finished(
    mode: &str,
    tasks: usize,
    findings: usize,
    confidence: f64,
    total_latency_ms: u64,
) {
    info!(
        event = "review.pipeline_finished",
        mode = %mode,
        tasks = tasks,
        findings = findings,
        confidence = confidence,
        total_latency_ms = total_latency_ms,
    );
}

pub fn emit_aggregated(verbose: bool, raw: usize, grounded: usize, deduplicated: usize, kept: usize) {
    step!(
        verbose,
        event = "review.aggregated",
        raw = raw,
        grounded = grounded,
        deduplicated = deduplicated,
        kept = kept,
    );
}

pub fn emit_escalated(reasons: &[String]) {
    warn!(event = "review.escalated", reasons = ?reasons);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_review_span_create() {
        let _span = ReviewSpan::enter("run-1");
    }

    #[test]
    fn test_step_events_do_not_panic_without_subscriber() {
        emit_task_started(true, "security", 0, 0);
        emit_task_finished(false, "security", 2, 0.9, 15);
        emit_task_skipped(true, "quality", "critical finding");
    }
}
