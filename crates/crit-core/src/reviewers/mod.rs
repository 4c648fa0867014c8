//! Model-backed reviewer tasks.
//!
//! The five built-in reviewers share one run contract and differ only in a
//! [`ReviewStrategy`] (focus text, categories, scheduling hints). A
//! [`ModelReviewer`] pairs a strategy with a [`ModelProvider`] and is what the
//! scheduler sees as a [`ReviewerTask`].
//!
//! # Module layout
//!
//! - [`prompt`]: shared prompt renderer and reply schema
//! - [`reply`]: reply text → `TaskOutput`
//! - [`strategies`]: security, breaking-changes, test-coverage, performance, quality

pub mod prompt;
pub mod reply;
pub mod strategies;

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ReviewResult;
use crate::obs;
use crate::provider::{ModelProvider, ModelRequest};
use crate::task::{CapabilityTier, ReviewerTask, TaskInput, TaskOutput};

pub use reply::parse_reply;
pub use strategies::{
    BreakingChangeStrategy, PerformanceStrategy, QualityStrategy, SecurityStrategy,
    TestCoverageStrategy, BREAKING_CHANGES_TASK, PERFORMANCE_TASK, QUALITY_TASK, SECURITY_TASK,
    TEST_COVERAGE_TASK,
};

/// Default cap on findings a single reviewer may report.
pub const DEFAULT_MAX_FINDINGS: usize = 10;

/// Variant-specific behavior of a model-backed reviewer.
pub trait ReviewStrategy: Send + Sync {
    fn name(&self) -> &str;

    fn execution_priority(&self) -> i32;

    fn capability_tier(&self) -> CapabilityTier;

    /// System prompt text.
    fn focus(&self) -> &str;

    /// Category taxonomy the reviewer reports in.
    fn categories(&self) -> &[&'static str];

    fn max_findings(&self) -> usize {
        DEFAULT_MAX_FINDINGS
    }

    fn build_prompt(&self, input: &TaskInput) -> String {
        prompt::render_prompt(input, self.categories(), self.max_findings())
    }

    fn schema(&self) -> Value {
        prompt::reply_schema(self.categories(), self.max_findings())
    }
}

/// A [`ReviewerTask`] that asks a model and parses its reply.
///
/// Provider errors propagate to the scheduler. A reply that cannot be parsed
/// is absorbed here and returned as a confidence-0 output.
pub struct ModelReviewer<S> {
    strategy: S,
    provider: Arc<dyn ModelProvider>,
}

impl<S: ReviewStrategy> ModelReviewer<S> {
    pub fn new(strategy: S, provider: Arc<dyn ModelProvider>) -> Self {
        Self { strategy, provider }
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }
}

#[async_trait]
impl<S: ReviewStrategy> ReviewerTask for ModelReviewer<S> {
    fn name(&self) -> &str {
        self.strategy.name()
    }

    fn execution_priority(&self) -> i32 {
        self.strategy.execution_priority()
    }

    fn capability_tier(&self) -> CapabilityTier {
        self.strategy.capability_tier()
    }

    async fn run(&self, input: TaskInput) -> ReviewResult<TaskOutput> {
        let name = self.strategy.name();
        let request = ModelRequest {
            task: name.to_string(),
            tier: self.strategy.capability_tier(),
            system: self.strategy.focus().to_string(),
            prompt: self.strategy.build_prompt(&input),
            schema: self.strategy.schema(),
        };

        let started = Instant::now();
        let reply = self.provider.complete(request).await?;
        let latency_ms = started.elapsed().as_millis() as u64;

        let output = match parse_reply(name, &reply.content, self.strategy.max_findings()) {
            Ok(output) => output,
            Err(err) => {
                obs::emit_task_failed(name, &err);
                TaskOutput::failed(name, err)
            }
        };
        Ok(output.with_telemetry(Some(latency_ms), Some(reply.total_tokens())))
    }
}

/// The five built-in reviewers, all backed by `provider`.
pub fn default_reviewers(provider: Arc<dyn ModelProvider>) -> Vec<Arc<dyn ReviewerTask>> {
    vec![
        Arc::new(ModelReviewer::new(SecurityStrategy, provider.clone())),
        Arc::new(ModelReviewer::new(BreakingChangeStrategy, provider.clone())),
        Arc::new(ModelReviewer::new(TestCoverageStrategy, provider.clone())),
        Arc::new(ModelReviewer::new(PerformanceStrategy, provider.clone())),
        Arc::new(ModelReviewer::new(QualityStrategy, provider)),
    ]
}
