use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};
use tokio::time::{sleep, timeout};
use tracing::{info, warn};

use crate::cancel::Cancellation;
use crate::config::FailurePolicy;
use crate::context::AppContext;
use crate::domain::history::GroupedHistory;
use crate::domain::summary::{SummaryOutcome, SummaryResult};
use crate::error::{AppError, AppResult};
use crate::services::LanguageModelService;

type CallOutcome = Result<(usize, AppResult<String>), JoinError>;

#[derive(Debug, Clone, Copy)]
struct CallPolicy {
    timeout: Duration,
    retries: u32,
    backoff: Duration,
}

/// Summarizes every (period, author) group with one backend call each.
///
/// Calls run concurrently up to the configured limit; results come back in the
/// history's iteration order regardless of completion order. Under
/// [`FailurePolicy::Isolate`] a failed group is recorded and the rest still
/// run; under [`FailurePolicy::FailFast`] the first failure is returned.
pub async fn summarize_groups(
    ctx: &AppContext,
    history: &GroupedHistory,
) -> AppResult<Vec<SummaryResult>> {
    let jobs: Vec<(String, String, String)> = history
        .groups()
        .map(|(period, author, aggregate)| {
            (
                period.to_string(),
                author.to_string(),
                aggregate.combined_diff_text(),
            )
        })
        .collect();

    let policy = CallPolicy {
        timeout: ctx.config.summary_timeout,
        retries: ctx.config.summary_retries,
        backoff: ctx.config.retry_backoff,
    };
    let limiter = Arc::new(Semaphore::new(ctx.config.summary_concurrency));
    let mut tasks = JoinSet::new();
    let mut slots: Vec<Option<SummaryOutcome>> = (0..jobs.len()).map(|_| None).collect();

    for (index, (period, author, text)) in jobs.iter().enumerate() {
        let permit = Arc::clone(&limiter)
            .acquire_owned()
            .await
            .map_err(|_| AppError::Summarization("dispatch limiter closed".to_string()))?;
        if ctx.cancellation.is_cancelled() {
            return Err(AppError::Cancelled);
        }
        while let Some(done) = tasks.try_join_next() {
            record(ctx.config.failure_policy, &jobs, &mut slots, done)?;
        }

        info!(%period, %author, bytes = text.len(), "summarizing group");
        let model = Arc::clone(&ctx.language_model);
        let cancellation = ctx.cancellation.clone();
        let text = text.clone();
        tasks.spawn(async move {
            let summary = call_with_policy(model.as_ref(), &text, policy, &cancellation).await;
            drop(permit);
            (index, summary)
        });
    }

    while let Some(done) = tasks.join_next().await {
        record(ctx.config.failure_policy, &jobs, &mut slots, done)?;
    }

    Ok(jobs
        .into_iter()
        .zip(slots)
        .map(|((period, author, _), outcome)| SummaryResult {
            period,
            author,
            outcome: outcome.unwrap_or_else(|| SummaryOutcome::Failed("not attempted".to_string())),
        })
        .collect())
}

fn record(
    policy: FailurePolicy,
    jobs: &[(String, String, String)],
    slots: &mut [Option<SummaryOutcome>],
    done: CallOutcome,
) -> AppResult<()> {
    let (index, summary) = done
        .map_err(|err| AppError::Summarization(format!("summarization task failed: {err}")))?;
    let (period, author, _) = &jobs[index];

    slots[index] = Some(match summary {
        Ok(text) => SummaryOutcome::Completed(text),
        Err(AppError::Cancelled) => return Err(AppError::Cancelled),
        Err(err) => {
            let err = err.in_context(&format!("{period}/{author}"));
            if policy == FailurePolicy::FailFast {
                return Err(err);
            }
            warn!(%period, %author, %err, "summary failed, continuing with remaining groups");
            SummaryOutcome::Failed(err.to_string())
        }
    });
    Ok(())
}

async fn call_with_policy(
    model: &dyn LanguageModelService,
    text: &str,
    policy: CallPolicy,
    cancellation: &Cancellation,
) -> AppResult<String> {
    let mut attempt = 0;
    loop {
        let result = match timeout(policy.timeout, model.summarize(text)).await {
            Ok(result) => result,
            Err(_) => Err(AppError::Summarization(format!("timed out after {:?}", policy.timeout))),
        };

        match result {
            Ok(summary) => return Ok(summary),
            Err(err) if attempt < policy.retries && !cancellation.is_cancelled() => {
                let delay = policy.backoff.saturating_mul(2u32.saturating_pow(attempt));
                attempt += 1;
                warn!(attempt, %err, ?delay, "summarization failed, retrying");
                tokio::select! {
                    _ = sleep(delay) => {}
                    _ = cancellation.cancelled() => return Err(AppError::Cancelled),
                }
            }
            Err(err) => return Err(err),
        }
    }
}
