//! Change set under review and its delta summary.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Status of a file within the change set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    Added,
    Modified,
    Removed,
    Renamed,
}

impl std::fmt::Display for FileStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Added => write!(f, "added"),
            Self::Modified => write!(f, "modified"),
            Self::Removed => write!(f, "removed"),
            Self::Renamed => write!(f, "renamed"),
        }
    }
}

/// One file touched by the change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangedFile {
    pub filename: String,
    pub status: FileStatus,
    #[serde(default)]
    pub additions: u32,
    #[serde(default)]
    pub deletions: u32,
    /// Unified diff hunk text; may be empty for binary or very large files.
    #[serde(default)]
    pub patch: String,
}

impl ChangedFile {
    pub fn modified(filename: impl Into<String>, patch: impl Into<String>) -> Self {
        let patch = patch.into();
        let additions = patch.lines().filter(|l| l.starts_with('+')).count() as u32;
        let deletions = patch.lines().filter(|l| l.starts_with('-')).count() as u32;
        Self {
            filename: filename.into(),
            status: FileStatus::Modified,
            additions,
            deletions,
            patch,
        }
    }
}

/// Ordered list of changed files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeSet {
    pub files: Vec<ChangedFile>,
}

impl ChangeSet {
    pub fn new(files: Vec<ChangedFile>) -> Self {
        Self { files }
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Filenames present in the change, used for grounding.
    pub fn filenames(&self) -> HashSet<&str> {
        self.files.iter().map(|f| f.filename.as_str()).collect()
    }

    pub fn total_additions(&self) -> u64 {
        self.files.iter().map(|f| u64::from(f.additions)).sum()
    }

    pub fn total_deletions(&self) -> u64 {
        self.files.iter().map(|f| u64::from(f.deletions)).sum()
    }

    /// Stable sha256 hex digest over filenames, statuses and patches.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        for file in &self.files {
            hasher.update(file.filename.as_bytes());
            hasher.update([0u8]);
            hasher.update(file.status.to_string().as_bytes());
            hasher.update([0u8]);
            hasher.update(file.patch.as_bytes());
            hasher.update([0u8]);
        }
        hex::encode(hasher.finalize())
    }
}

/// Coarse risk classification by churn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// Delta/risk summary handed to every reviewer alongside the change set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeDelta {
    pub files_changed: usize,
    pub additions: u64,
    pub deletions: u64,
    pub risk: RiskLevel,
    pub summary: String,
}

impl ChangeDelta {
    pub fn from_change_set(change_set: &ChangeSet) -> Self {
        let files_changed = change_set.files.len();
        let additions = change_set.total_additions();
        let deletions = change_set.total_deletions();
        let churn = additions + deletions;

        let risk = if churn > 500 || files_changed > 20 {
            RiskLevel::High
        } else if churn > 100 || files_changed > 5 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        };

        let summary = format!(
            "{files_changed} file(s) changed, +{additions}/-{deletions} lines, {risk} risk"
        );

        Self {
            files_changed,
            additions,
            deletions,
            risk,
            summary,
        }
    }
}
