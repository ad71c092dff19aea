use tracing::info;

use crate::context::AppContext;
use crate::domain::history::GroupedHistory;
use crate::domain::range::{DateRange, RangeRequest};
use crate::domain::summary::SummaryResult;
use crate::error::AppResult;
use crate::workflow::history::group_by_author_and_date;
use crate::workflow::summarize::summarize_groups;

/// How commits are bucketed before summarizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grouping {
    /// One summary per author per calendar day.
    Daily,
    /// One summary per author for the whole range.
    WholeRange,
}

pub struct WorkReport {
    pub range: DateRange,
    pub history: GroupedHistory,
    pub summaries: Vec<SummaryResult>,
}

impl WorkReport {
    pub fn failed_summaries(&self) -> usize {
        self.summaries.iter().filter(|s| s.is_failed()).count()
    }
}

pub async fn summarize_work(
    ctx: &AppContext,
    request: &RangeRequest,
    grouping: Grouping,
) -> AppResult<WorkReport> {
    let range = request.resolve()?;
    let mut history = group_by_author_and_date(ctx, &range).await?;
    if grouping == Grouping::WholeRange {
        history = history.merge_periods(&range.to_string());
    }

    info!(
        periods = history.period_count(),
        groups = history.group_count(),
        ?grouping,
        "dispatching summaries"
    );
    let summaries = summarize_groups(ctx, &history).await?;

    Ok(WorkReport {
        range,
        history,
        summaries,
    })
}
