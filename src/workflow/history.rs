use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, info};

use crate::context::AppContext;
use crate::domain::commit::{CommitInfo, CommitRecord};
use crate::domain::history::GroupedHistory;
use crate::domain::range::{DateRange, format_day};
use crate::error::{AppError, AppResult};
use crate::services::VersionControlService;
use crate::workflow::metrics::compute_metrics;

type FetchOutcome = Result<(usize, AppResult<CommitRecord>), JoinError>;

/// Collects every commit in `range` and groups it by calendar day and author.
///
/// Diffs and metrics are fetched concurrently, but records are inserted in the
/// order the backend listed the commits. Any single commit failing aborts the
/// whole grouping; no partial history is returned.
pub async fn group_by_author_and_date(
    ctx: &AppContext,
    range: &DateRange,
) -> AppResult<GroupedHistory> {
    if ctx.cancellation.is_cancelled() {
        return Err(AppError::Cancelled);
    }
    let commits = ctx.version_control.list_commits(range).await?;
    info!(count = commits.len(), %range, "listed commits");
    if commits.is_empty() {
        return Ok(GroupedHistory::new());
    }

    let limiter = Arc::new(Semaphore::new(ctx.config.fetch_concurrency));
    let mut tasks = JoinSet::new();
    let mut slots: Vec<Option<CommitRecord>> = (0..commits.len()).map(|_| None).collect();

    for (index, info) in commits.into_iter().enumerate() {
        let permit = Arc::clone(&limiter)
            .acquire_owned()
            .await
            .map_err(|_| AppError::HistoryBackend("fetch limiter closed".to_string()))?;
        if ctx.cancellation.is_cancelled() {
            return Err(AppError::Cancelled);
        }
        while let Some(done) = tasks.try_join_next() {
            store(&mut slots, done)?;
        }

        let version_control = Arc::clone(&ctx.version_control);
        tasks.spawn(async move {
            let record = fetch_commit(version_control.as_ref(), info).await;
            drop(permit);
            (index, record)
        });
    }

    while let Some(done) = tasks.join_next().await {
        store(&mut slots, done)?;
    }

    let mut history = GroupedHistory::new();
    for record in slots.into_iter().flatten() {
        history.insert(&format_day(record.day()), record);
    }
    debug!(groups = history.group_count(), "grouped history");
    Ok(history)
}

async fn fetch_commit(
    version_control: &dyn VersionControlService,
    info: CommitInfo,
) -> AppResult<CommitRecord> {
    let context = format!("commit {}", info.short_hash());
    let diff = version_control
        .commit_diff(&info.hash)
        .await
        .map_err(|err| err.in_context(&context))?;
    let metrics = compute_metrics(version_control, &info.hash)
        .await
        .map_err(|err| err.in_context(&context))?;
    Ok(CommitRecord::new(info, diff, metrics))
}

fn store(slots: &mut [Option<CommitRecord>], done: FetchOutcome) -> AppResult<()> {
    let (index, record) = done
        .map_err(|err| AppError::HistoryBackend(format!("commit fetch task failed: {err}")))?;
    slots[index] = Some(record?);
    Ok(())
}
