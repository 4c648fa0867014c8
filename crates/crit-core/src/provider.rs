//! Model-provider capability consumed by reviewer tasks.
//!
//! Transport concerns (HTTP clients, retries, auth, per-call timeouts) live
//! behind this trait and are not implemented here. [`FixtureProvider`]
//! replays canned replies so the pipeline can run without a network.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::task::CapabilityTier;

/// A single request/response call to a model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelRequest {
    /// Name of the reviewer issuing the call.
    pub task: String,
    pub tier: CapabilityTier,
    pub system: String,
    pub prompt: String,
    /// JSON schema the reply content is expected to follow.
    pub schema: serde_json::Value,
}

/// Raw reply content plus token accounting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelReply {
    pub content: String,
    #[serde(default)]
    pub input_tokens: u64,
    #[serde(default)]
    pub output_tokens: u64,
}

impl ModelReply {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn total_tokens(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }
}

/// Async request/response model call. May fail on network errors, non-2xx
/// status, or malformed content.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    async fn complete(&self, request: ModelRequest) -> Result<ModelReply, ProviderError>;
}

/// Replays canned replies keyed by reviewer task name.
///
/// A task with no recorded reply fails with [`ProviderError::Network`], which
/// exercises the scheduler's failure isolation.
#[derive(Debug, Clone, Default)]
pub struct FixtureProvider {
    replies: HashMap<String, ModelReply>,
}

impl FixtureProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reply(mut self, task: impl Into<String>, reply: ModelReply) -> Self {
        self.replies.insert(task.into(), reply);
        self
    }

    /// Load from a JSON object mapping task name to either reply text or a
    /// full [`ModelReply`] object.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        let map: HashMap<String, serde_json::Value> = serde_json::from_str(raw)?;
        let mut replies = HashMap::with_capacity(map.len());
        for (task, value) in map {
            let reply = match &value {
                serde_json::Value::String(content) => ModelReply::text(content.clone()),
                serde_json::Value::Object(obj) if obj.contains_key("content") => {
                    serde_json::from_value(value.clone())?
                }
                other => ModelReply::text(other.to_string()),
            };
            replies.insert(task, reply);
        }
        Ok(Self { replies })
    }

    pub fn len(&self) -> usize {
        self.replies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.replies.is_empty()
    }
}

#[async_trait]
impl ModelProvider for FixtureProvider {
    async fn complete(&self, request: ModelRequest) -> Result<ModelReply, ProviderError> {
        self.replies
            .get(&request.task)
            .cloned()
            .ok_or_else(|| ProviderError::Network(format!("no recorded reply for {}", request.task)))
    }
}
