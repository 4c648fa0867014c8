//! Pipeline Scheduler.
//!
//! # Module layout
//!
//! - [`scheduler`]: `run_pipeline`, sequential and concurrent execution
//! - [`PipelineResult`]: flat, unfiltered output of one pipeline run

pub mod scheduler;

use serde::{Deserialize, Serialize};

use crate::config::PipelineMode;
use crate::finding::{Finding, Severity};
use crate::task::TaskOutput;

pub use scheduler::run_pipeline;

/// Result of one pipeline run. Read-only once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineResult {
    pub run_id: String,
    /// Concatenation of every task's findings in execution order, unfiltered.
    pub findings: Vec<Finding>,
    /// One entry per task that was started, in priority order.
    pub task_outputs: Vec<TaskOutput>,
    pub summary: String,
    /// Arithmetic mean of task confidences, degraded outputs included.
    pub confidence: f64,
    pub total_latency_ms: u64,
    pub has_critical: bool,
    pub mode: PipelineMode,
    /// Tasks not started because a critical finding stopped a sequential run.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped_tasks: Vec<String>,
}

impl PipelineResult {
    pub fn from_outputs(
        run_id: impl Into<String>,
        task_outputs: Vec<TaskOutput>,
        skipped_tasks: Vec<String>,
        mode: PipelineMode,
        total_latency_ms: u64,
    ) -> Self {
        let findings: Vec<Finding> = task_outputs
            .iter()
            .flat_map(|o| o.findings.iter().cloned())
            .collect();

        let confidence = if task_outputs.is_empty() {
            0.0
        } else {
            task_outputs.iter().map(|o| o.confidence).sum::<f64>() / task_outputs.len() as f64
        };

        let has_critical = findings.iter().any(|f| f.severity == Severity::Critical);

        let summary = if task_outputs.is_empty() {
            "no reviewer tasks ran".to_string()
        } else {
            task_outputs
                .iter()
                .map(|o| format!("{}: {}", o.task_name, o.summary))
                .collect::<Vec<_>>()
                .join("\n")
        };

        Self {
            run_id: run_id.into(),
            findings,
            task_outputs,
            summary,
            confidence,
            total_latency_ms,
            has_critical,
            mode,
            skipped_tasks,
        }
    }

    pub fn task_count(&self) -> usize {
        self.task_outputs.len()
    }

    /// Number of task outputs substituted for failed tasks.
    pub fn failed_count(&self) -> usize {
        self.task_outputs.iter().filter(|o| o.failed).count()
    }
}
