use std::collections::HashSet;

use crate::domain::commit::DiffMetrics;
use crate::error::AppResult;
use crate::services::VersionControlService;

/// Change statistics of `hash` against its parent.
///
/// Backend failures (including a root commit with no parent) propagate; a
/// zeroed fallback would silently corrupt the aggregate totals.
pub async fn compute_metrics(
    version_control: &dyn VersionControlService,
    hash: &str,
) -> AppResult<DiffMetrics> {
    let summary = version_control.diff_summary(hash).await?;
    let distinct_files = summary.files.iter().collect::<HashSet<_>>().len();

    Ok(DiffMetrics {
        lines_added: summary.insertions,
        lines_deleted: summary.deletions,
        files_changed: distinct_files as u64,
    })
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::domain::commit::{CommitInfo, DiffSummary};
    use crate::domain::range::DateRange;
    use crate::error::AppError;
    use crate::testing::{FakeHistory, commit};

    struct RepeatedPaths;

    #[async_trait]
    impl VersionControlService for RepeatedPaths {
        async fn list_commits(&self, _range: &DateRange) -> AppResult<Vec<CommitInfo>> {
            Ok(Vec::new())
        }

        async fn commit_diff(&self, _hash: &str) -> AppResult<String> {
            Ok(String::new())
        }

        async fn diff_summary(&self, _hash: &str) -> AppResult<DiffSummary> {
            Ok(DiffSummary {
                insertions: 4,
                deletions: 1,
                files: vec![
                    "src/main.rs".to_string(),
                    "src/lib.rs".to_string(),
                    "src/main.rs".to_string(),
                ],
            })
        }
    }

    #[tokio::test]
    async fn maps_diff_summary_to_metrics() {
        let history = FakeHistory::new().with_commit(
            commit("abc", "alice", "2024-09-23T09:00:00Z", "Add parser"),
            10,
            2,
            3,
        );
        let metrics = compute_metrics(&history, "abc").await.unwrap();
        assert_eq!(
            metrics,
            DiffMetrics {
                lines_added: 10,
                lines_deleted: 2,
                files_changed: 3,
            }
        );
    }

    #[tokio::test]
    async fn counts_each_path_once() {
        let metrics = compute_metrics(&RepeatedPaths, "abc").await.unwrap();
        assert_eq!(metrics.files_changed, 2);
        assert_eq!(metrics.lines_added, 4);
    }

    #[tokio::test]
    async fn propagates_backend_failure() {
        let history = FakeHistory::new()
            .with_commit(
                commit("root", "alice", "2024-09-23T09:00:00Z", "Initial commit"),
                1,
                0,
                1,
            )
            .with_broken("root");
        let err = compute_metrics(&history, "root").await.unwrap_err();
        assert!(matches!(err, AppError::HistoryBackend(_)));
    }
}
