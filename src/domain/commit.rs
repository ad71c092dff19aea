use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::Serialize;

/// A commit as listed by the version-control backend, before its diff is fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    pub hash: String,
    pub author: String,
    pub timestamp: DateTime<FixedOffset>,
    pub message: String,
}

impl CommitInfo {
    /// Calendar day in the offset the timestamp was recorded with; never normalized to UTC.
    pub fn day(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }

    pub fn short_hash(&self) -> &str {
        self.hash.get(..10).unwrap_or(self.hash.as_str())
    }
}

/// Raw diff summary between a commit and its parent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffSummary {
    pub insertions: u64,
    pub deletions: u64,
    pub files: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiffMetrics {
    pub lines_added: u64,
    pub lines_deleted: u64,
    pub files_changed: u64,
}

/// A fully fetched commit. Fields are fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    info: CommitInfo,
    diff: String,
    metrics: DiffMetrics,
}

impl CommitRecord {
    pub fn new(info: CommitInfo, diff: String, metrics: DiffMetrics) -> Self {
        Self {
            info,
            diff,
            metrics,
        }
    }

    pub fn hash(&self) -> &str {
        &self.info.hash
    }

    pub fn author(&self) -> &str {
        &self.info.author
    }

    pub fn timestamp(&self) -> DateTime<FixedOffset> {
        self.info.timestamp
    }

    pub fn day(&self) -> NaiveDate {
        self.info.day()
    }

    pub fn message(&self) -> &str {
        &self.info.message
    }

    pub fn diff(&self) -> &str {
        &self.diff
    }

    pub fn metrics(&self) -> DiffMetrics {
        self.metrics
    }
}
