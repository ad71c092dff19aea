use std::collections::HashMap;
use std::fmt::Write as _;

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use crate::domain::commit::DiffMetrics;
use crate::domain::history::{AuthorTotals, GroupedHistory};
use crate::domain::range::DateRange;
use crate::domain::summary::{SummaryOutcome, SummaryResult};
use crate::error::AppResult;

const UNAVAILABLE: &str = "[summary unavailable]";

fn index(summaries: &[SummaryResult]) -> HashMap<(&str, &str), &SummaryOutcome> {
    summaries
        .iter()
        .map(|s| ((s.period.as_str(), s.author.as_str()), &s.outcome))
        .collect()
}

/// Console report: one block per period, one entry per author.
pub fn render_text(history: &GroupedHistory, summaries: &[SummaryResult]) -> String {
    if history.is_empty() {
        return "No commits found in range.\n".to_string();
    }
    let lookup = index(summaries);
    let mut out = String::new();

    for (period, authors) in history.periods() {
        let _ = writeln!(out, "--- Summary for {period} ---");
        for (author, aggregate) in authors {
            let totals = aggregate.totals();
            let _ = writeln!(out, "Author: {author}");
            let _ = writeln!(out, "Total Commits: {}", totals.total_commits);
            let _ = writeln!(
                out,
                "Lines Added: {}, Lines Deleted: {}",
                totals.total_lines_added, totals.total_lines_deleted
            );
            let _ = writeln!(out, "Files Changed: {}\n", totals.total_files_changed);
            let _ = writeln!(out, "Summary of work done on {period}:");
            match lookup.get(&(period, author.as_str())) {
                Some(SummaryOutcome::Completed(text)) => {
                    let _ = writeln!(out, "{text}\n");
                }
                Some(SummaryOutcome::Failed(reason)) => {
                    let _ = writeln!(out, "[summary unavailable: {reason}]\n");
                }
                None => {
                    let _ = writeln!(out, "{UNAVAILABLE}\n");
                }
            }
        }
    }
    out
}

#[derive(Serialize)]
struct JsonReport<'a> {
    range: &'a DateRange,
    periods: Vec<JsonPeriod<'a>>,
}

#[derive(Serialize)]
struct JsonPeriod<'a> {
    period: &'a str,
    authors: Vec<JsonAuthor<'a>>,
}

#[derive(Serialize)]
struct JsonAuthor<'a> {
    author: &'a str,
    totals: AuthorTotals,
    commits: Vec<JsonCommit<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

#[derive(Serialize)]
struct JsonCommit<'a> {
    hash: &'a str,
    message: &'a str,
    timestamp: DateTime<FixedOffset>,
    metrics: DiffMetrics,
}

pub fn render_json(
    range: &DateRange,
    history: &GroupedHistory,
    summaries: &[SummaryResult],
) -> AppResult<String> {
    let lookup = index(summaries);
    let periods = history
        .periods()
        .map(|(period, authors)| JsonPeriod {
            period,
            authors: authors
                .iter()
                .map(|(author, aggregate)| {
                    let (summary, error) = match lookup.get(&(period, author.as_str())) {
                        Some(SummaryOutcome::Completed(text)) => (Some(text.as_str()), None),
                        Some(SummaryOutcome::Failed(reason)) => (None, Some(reason.as_str())),
                        None => (None, Some(UNAVAILABLE)),
                    };
                    JsonAuthor {
                        author,
                        totals: aggregate.totals(),
                        commits: aggregate
                            .commits()
                            .iter()
                            .map(|commit| JsonCommit {
                                hash: commit.hash(),
                                message: commit.message(),
                                timestamp: commit.timestamp(),
                                metrics: commit.metrics(),
                            })
                            .collect(),
                        summary,
                        error,
                    }
                })
                .collect(),
        })
        .collect();

    Ok(serde_json::to_string_pretty(&JsonReport { range, periods })?)
}
