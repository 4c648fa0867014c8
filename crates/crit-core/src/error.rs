//! Error taxonomy for the review pipeline.

/// Errors raised by a model-provider call.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("network error: {0}")]
    Network(String),

    #[error("provider returned status {code}: {body}")]
    Status { code: u16, body: String },

    #[error("malformed provider content: {0}")]
    MalformedContent(String),
}

/// Errors produced by the review core.
///
/// Task-level variants never escape the scheduler; they are folded into a
/// degraded task output. Only configuration and artifact I/O surface to callers.
#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    #[error("model provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("task {task} failed: {detail}")]
    TaskFailed { task: String, detail: String },

    #[error("task {task} timed out after {timeout_ms}ms")]
    TaskTimedOut { task: String, timeout_ms: u64 },

    #[error("task {task} panicked")]
    TaskPanicked { task: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for review operations.
pub type ReviewResult<T> = std::result::Result<T, ReviewError>;
