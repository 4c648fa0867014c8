//! Failure-isolated reviewer scheduling.
//!
//! Every task invocation runs inside its own tokio task, so an error, a panic,
//! or an expired deadline is converted into a degraded [`TaskOutput`] instead
//! of aborting the run. Concurrent mode fans out over a [`JoinSet`] and puts
//! results back into priority order; sequential mode threads earlier findings
//! into later tasks' inputs.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task::JoinSet;
use tracing::{field, instrument, warn, Span};

use crate::change_set::{ChangeDelta, ChangeSet};
use crate::config::{PipelineMode, ReviewConfig};
use crate::error::ReviewError;
use crate::finding::Finding;
use crate::obs;
use crate::pipeline::PipelineResult;
use crate::task::{clamp_confidence, ReviewerTask, TaskInput, TaskOutput};

/// Run `tasks` against `change_set` and collect their outputs.
///
/// Tasks are sorted by ascending `execution_priority` before execution in
/// both modes. This function never fails: task errors become degraded
/// outputs with confidence 0.
#[instrument(
    skip_all,
    fields(mode = %config.mode, tasks = tasks.len(), run_id = field::Empty, change = field::Empty)
)]
pub async fn run_pipeline(
    tasks: &[Arc<dyn ReviewerTask>],
    change_set: &ChangeSet,
    context: &str,
    delta: &ChangeDelta,
    config: &ReviewConfig,
) -> PipelineResult {
    let start = Instant::now();
    let run_id = uuid::Uuid::new_v4().to_string();
    let digest = change_set.digest();
    let span = Span::current();
    span.record("run_id", run_id.as_str());
    span.record("change", &digest[..12]);

    let mut ordered: Vec<Arc<dyn ReviewerTask>> = tasks.to_vec();
    ordered.sort_by_key(|t| t.execution_priority());

    let base = TaskInput {
        change_set: change_set.clone(),
        context: context.to_string(),
        delta: delta.clone(),
        previous_findings: Vec::new(),
    };

    let (outputs, skipped) = match config.mode {
        PipelineMode::Sequential => run_sequential(&ordered, &base, config).await,
        PipelineMode::Concurrent => (run_concurrent(&ordered, &base, config).await, Vec::new()),
    };

    let total_latency_ms = start.elapsed().as_millis() as u64;
    let result =
        PipelineResult::from_outputs(run_id, outputs, skipped, config.mode, total_latency_ms);

    obs::emit_pipeline_finished(
        &config.mode.to_string(),
        result.task_count(),
        result.findings.len(),
        result.confidence,
        total_latency_ms,
    );
    result
}

async fn run_sequential(
    ordered: &[Arc<dyn ReviewerTask>],
    base: &TaskInput,
    config: &ReviewConfig,
) -> (Vec<TaskOutput>, Vec<String>) {
    let mut outputs = Vec::with_capacity(ordered.len());
    let mut previous: Vec<Finding> = Vec::new();
    let mut skipped = Vec::new();

    for (pos, task) in ordered.iter().enumerate() {
        let input = TaskInput {
            previous_findings: previous.clone(),
            ..base.clone()
        };
        obs::emit_task_started(
            config.verbose,
            task.name(),
            task.execution_priority(),
            input.previous_findings.len(),
        );

        let output = run_isolated(Arc::clone(task), input, config.task_timeout, config.verbose).await;
        let stop = config.stop_on_critical && output.has_critical();
        previous.extend(output.findings.iter().cloned());
        outputs.push(output);

        if stop {
            for rest in &ordered[pos + 1..] {
                obs::emit_task_skipped(config.verbose, rest.name(), "critical finding produced");
                skipped.push(rest.name().to_string());
            }
            break;
        }
    }

    (outputs, skipped)
}

async fn run_concurrent(
    ordered: &[Arc<dyn ReviewerTask>],
    base: &TaskInput,
    config: &ReviewConfig,
) -> Vec<TaskOutput> {
    let mut join_set = JoinSet::new();
    for (idx, task) in ordered.iter().cloned().enumerate() {
        let input = base.clone();
        let timeout = config.task_timeout;
        let verbose = config.verbose;
        obs::emit_task_started(verbose, task.name(), task.execution_priority(), 0);
        join_set.spawn(async move { (idx, run_isolated(task, input, timeout, verbose).await) });
    }

    let mut slots: Vec<Option<TaskOutput>> = vec![None; ordered.len()];
    while let Some(joined) = join_set.join_next().await {
        match joined {
            Ok((idx, output)) => slots[idx] = Some(output),
            Err(e) => warn!(error = %e, "reviewer worker join error"),
        }
    }

    slots
        .into_iter()
        .zip(ordered)
        .map(|(slot, task)| {
            slot.unwrap_or_else(|| TaskOutput::failed(task.name(), "worker did not complete"))
        })
        .collect()
}

/// Run one task behind a panic/timeout boundary and never fail.
async fn run_isolated(
    task: Arc<dyn ReviewerTask>,
    input: TaskInput,
    timeout: Option<Duration>,
    verbose: bool,
) -> TaskOutput {
    let name = task.name().to_string();
    let started = Instant::now();
    let mut worker = tokio::spawn(async move { task.run(input).await });

    let joined = match timeout {
        Some(limit) => match tokio::time::timeout(limit, &mut worker).await {
            Ok(joined) => joined,
            Err(_) => {
                worker.abort();
                let err = ReviewError::TaskTimedOut {
                    task: name.clone(),
                    timeout_ms: limit.as_millis() as u64,
                };
                obs::emit_task_failed(&name, &err);
                return TaskOutput::failed(name, err);
            }
        },
        None => worker.await,
    };

    let elapsed_ms = started.elapsed().as_millis() as u64;
    match joined {
        Ok(Ok(mut output)) => {
            output.task_name.clone_from(&name);
            output.confidence = clamp_confidence(output.confidence);
            if output.latency_ms.is_none() {
                output.latency_ms = Some(elapsed_ms);
            }
            obs::emit_task_finished(
                verbose,
                &name,
                output.findings.len(),
                output.confidence,
                elapsed_ms,
            );
            output
        }
        Ok(Err(err)) => {
            obs::emit_task_failed(&name, &err);
            TaskOutput::failed(name, err).with_telemetry(Some(elapsed_ms), None)
        }
        Err(join_err) => {
            let err = if join_err.is_panic() {
                ReviewError::TaskPanicked { task: name.clone() }
            } else {
                ReviewError::TaskFailed {
                    task: name.clone(),
                    detail: join_err.to_string(),
                }
            };
            obs::emit_task_failed(&name, &err);
            TaskOutput::failed(name, err).with_telemetry(Some(elapsed_ms), None)
        }
    }
}
