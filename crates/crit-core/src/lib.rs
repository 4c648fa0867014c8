//! Crit Core Library
//!
//! Review pipeline core: schedules reviewer tasks over a change set, isolates
//! their failures, then grounds, deduplicates, ranks and escalates the merged
//! findings.

pub mod aggregate;
pub mod change_set;
pub mod config;
pub mod error;
pub mod finding;
pub mod obs;
pub mod pipeline;
pub mod provider;
pub mod reporting;
pub mod reviewers;
pub mod task;
pub mod telemetry;

pub use aggregate::{
    aggregate, deduplicate, evaluate_escalation, filter_grounded, rank_and_truncate,
    AggregatedResult, EscalationDecision,
};
pub use change_set::{ChangeDelta, ChangeSet, ChangedFile, FileStatus, RiskLevel};
pub use config::{PipelineMode, ReviewConfig};
pub use error::{ProviderError, ReviewError, ReviewResult};
pub use finding::{Finding, Severity};
pub use pipeline::{run_pipeline, PipelineResult};
pub use provider::{FixtureProvider, ModelProvider, ModelReply, ModelRequest};
pub use reporting::{render_review_md, write_review_json, write_review_md};
pub use reviewers::{default_reviewers, ModelReviewer, ReviewStrategy};
pub use task::{CapabilityTier, ReviewerTask, TaskInput, TaskOutput};
pub use telemetry::init_tracing;

/// Crate version, reported by the CLI.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
