use async_trait::async_trait;

use crate::domain::commit::{CommitInfo, DiffSummary};
use crate::domain::range::DateRange;
use crate::error::AppResult;

/// Read-only view of a repository's history.
#[async_trait]
pub trait VersionControlService: Send + Sync {
    /// Commits whose timestamp falls inside `range` (both ends inclusive), in backend order.
    async fn list_commits(&self, range: &DateRange) -> AppResult<Vec<CommitInfo>>;
    /// Diff text between the commit and its first parent.
    async fn commit_diff(&self, hash: &str) -> AppResult<String>;
    /// Insertions, deletions and touched paths between the commit and its first parent.
    async fn diff_summary(&self, hash: &str) -> AppResult<DiffSummary>;
}
