//! Explicit review configuration.
//!
//! The configuration is a plain value passed into [`crate::run_pipeline`] and
//! [`crate::aggregate`]. Environment variables are read only when the caller
//! asks for it via [`ReviewConfig::from_env`].

use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ReviewError, ReviewResult};

pub const ENV_PIPELINE_MODE: &str = "PIPELINE_MODE";
pub const ENV_DEDUP_THRESHOLD: &str = "DEDUP_THRESHOLD";
pub const ENV_STOP_ON_CRITICAL: &str = "STOP_ON_CRITICAL";
pub const ENV_TASK_TIMEOUT_SECS: &str = "TASK_TIMEOUT_SECS";
pub const ENV_VERBOSE: &str = "REVIEW_VERBOSE";

pub const DEFAULT_DEDUP_THRESHOLD: f64 = 0.8;
pub const DEFAULT_MAX_FINDINGS: usize = 10;
pub const DEFAULT_ESCALATION_CONFIDENCE_FLOOR: f64 = 0.5;

/// How reviewer tasks are scheduled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineMode {
    /// One at a time; later tasks see earlier findings.
    Sequential,
    /// All at once; no cross-visibility.
    #[default]
    Concurrent,
}

impl FromStr for PipelineMode {
    type Err = ReviewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequential" => Ok(Self::Sequential),
            "parallel" | "concurrent" => Ok(Self::Concurrent),
            other => Err(ReviewError::InvalidConfig(format!(
                "unknown pipeline mode '{other}' (expected sequential or parallel)"
            ))),
        }
    }
}

impl std::fmt::Display for PipelineMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sequential => write!(f, "sequential"),
            Self::Concurrent => write!(f, "concurrent"),
        }
    }
}

/// Configuration for one review invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewConfig {
    pub mode: PipelineMode,
    /// Sequential mode only: skip not-yet-started tasks once a critical
    /// finding has been produced.
    pub stop_on_critical: bool,
    /// Minimum combined similarity at which two findings are duplicates.
    pub dedup_threshold: f64,
    /// Cap on the number of findings in the aggregated result.
    pub max_findings: usize,
    /// Tasks with confidence strictly below this trigger escalation.
    pub escalation_confidence_floor: f64,
    /// Per-task deadline. `None` lets a slow task run until its provider
    /// call returns.
    pub task_timeout: Option<Duration>,
    /// Promote step-by-step pipeline events from debug to info.
    pub verbose: bool,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            mode: PipelineMode::default(),
            stop_on_critical: false,
            dedup_threshold: DEFAULT_DEDUP_THRESHOLD,
            max_findings: DEFAULT_MAX_FINDINGS,
            escalation_confidence_floor: DEFAULT_ESCALATION_CONFIDENCE_FLOOR,
            task_timeout: None,
            verbose: false,
        }
    }
}

impl ReviewConfig {
    /// Read recognized options from the process environment.
    pub fn from_env() -> ReviewResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    ///
    /// Unset keys keep their defaults; set-but-malformed keys are an error.
    pub fn from_lookup<F>(lookup: F) -> ReviewResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_PIPELINE_MODE) {
            config.mode = raw.parse()?;
        }

        if let Some(raw) = lookup(ENV_DEDUP_THRESHOLD) {
            config.dedup_threshold = raw.trim().parse::<f64>().map_err(|e| {
                ReviewError::InvalidConfig(format!("{ENV_DEDUP_THRESHOLD}='{raw}': {e}"))
            })?;
        }

        if let Some(raw) = lookup(ENV_STOP_ON_CRITICAL) {
            config.stop_on_critical = parse_flag(ENV_STOP_ON_CRITICAL, &raw)?;
        }

        if let Some(raw) = lookup(ENV_TASK_TIMEOUT_SECS) {
            let secs = raw.trim().parse::<u64>().map_err(|e| {
                ReviewError::InvalidConfig(format!("{ENV_TASK_TIMEOUT_SECS}='{raw}': {e}"))
            })?;
            config.task_timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }

        if let Some(raw) = lookup(ENV_VERBOSE) {
            config.verbose = parse_flag(ENV_VERBOSE, &raw)?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ReviewResult<()> {
        if !(0.0..=1.0).contains(&self.dedup_threshold) {
            return Err(ReviewError::InvalidConfig(format!(
                "dedup threshold must be within [0, 1], got {}",
                self.dedup_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.escalation_confidence_floor) {
            return Err(ReviewError::InvalidConfig(format!(
                "escalation confidence floor must be within [0, 1], got {}",
                self.escalation_confidence_floor
            )));
        }
        if self.max_findings == 0 {
            return Err(ReviewError::InvalidConfig(
                "max findings must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_flag(key: &str, raw: &str) -> ReviewResult<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(ReviewError::InvalidConfig(format!(
            "{key}='{other}' is not a boolean"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ReviewConfig::default();
        assert_eq!(config.mode, PipelineMode::Concurrent);
        assert_eq!(config.dedup_threshold, 0.8);
        assert_eq!(config.max_findings, 10);
        assert_eq!(config.escalation_confidence_floor, 0.5);
        assert!(config.task_timeout.is_none());
        assert!(!config.stop_on_critical);
    }

    #[test]
    fn test_mode_parsing_accepts_parallel_alias() {
        assert_eq!("parallel".parse::<PipelineMode>().unwrap(), PipelineMode::Concurrent);
        assert_eq!("Sequential".parse::<PipelineMode>().unwrap(), PipelineMode::Sequential);
        assert!("batch".parse::<PipelineMode>().is_err());
    }

    #[test]
    fn test_from_lookup_reads_recognized_keys() {
        let config = ReviewConfig::from_lookup(lookup(&[
            ("PIPELINE_MODE", "sequential"),
            ("DEDUP_THRESHOLD", "0.65"),
            ("STOP_ON_CRITICAL", "true"),
            ("TASK_TIMEOUT_SECS", "30"),
            ("REVIEW_VERBOSE", "1"),
        ]))
        .unwrap();

        assert_eq!(config.mode, PipelineMode::Sequential);
        assert_eq!(config.dedup_threshold, 0.65);
        assert!(config.stop_on_critical);
        assert_eq!(config.task_timeout, Some(Duration::from_secs(30)));
        assert!(config.verbose);
    }

    #[test]
    fn test_from_lookup_empty_is_default() {
        let config = ReviewConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, ReviewConfig::default());
    }

    #[test]
    fn test_out_of_range_threshold_is_rejected() {
        let err = ReviewConfig::from_lookup(lookup(&[("DEDUP_THRESHOLD", "1.5")])).unwrap_err();
        assert!(matches!(err, ReviewError::InvalidConfig(_)));

        let err = ReviewConfig::from_lookup(lookup(&[("DEDUP_THRESHOLD", "high")])).unwrap_err();
        assert!(err.to_string().contains("DEDUP_THRESHOLD"));
    }

    #[test]
    fn test_zero_timeout_disables_deadline() {
        let config = ReviewConfig::from_lookup(lookup(&[("TASK_TIMEOUT_SECS", "0")])).unwrap();
        assert!(config.task_timeout.is_none());
    }

    #[test]
    fn test_bad_flag_is_rejected() {
        let err = ReviewConfig::from_lookup(lookup(&[("STOP_ON_CRITICAL", "maybe")])).unwrap_err();
        assert!(err.to_string().contains("STOP_ON_CRITICAL"));
    }
}
