use clap::{Args, ValueEnum};

use crate::context::AppContext;
use crate::domain::range::RangeRequest;
use crate::error::{AppError, AppResult};
use crate::report::{render_json, render_text};
use crate::workflow::work::{Grouping, WorkReport, summarize_work};

#[derive(Args, Debug, Clone)]
pub struct SummarizeArgs {
    /// First day of the range (YYYY-MM-DD), inclusive.
    #[arg(long)]
    pub since: Option<String>,
    /// Last day of the range (YYYY-MM-DD), inclusive.
    #[arg(long)]
    pub until: Option<String>,
    /// ISO week number; requires --year.
    #[arg(long)]
    pub week: Option<u32>,
    /// Month number (1-12); requires --year.
    #[arg(long)]
    pub month: Option<u32>,
    #[arg(long)]
    pub year: Option<i32>,
    /// Summarize each author's work per day instead of once for the whole range.
    #[arg(long)]
    pub daily: bool,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

pub struct SummarizeOutcome {
    pub report: WorkReport,
    pub rendered: String,
}

impl SummarizeOutcome {
    /// Failed groups were already rendered; this turns them into a non-zero exit.
    pub fn into_result(self) -> AppResult<()> {
        match self.report.failed_summaries() {
            0 => Ok(()),
            failed => Err(AppError::Summarization(format!(
                "{failed} of {} summaries failed",
                self.report.summaries.len()
            ))),
        }
    }
}

pub async fn run(ctx: &AppContext, args: SummarizeArgs) -> AppResult<SummarizeOutcome> {
    let request = RangeRequest {
        since: args.since,
        until: args.until,
        week: args.week,
        month: args.month,
        year: args.year,
    };
    let grouping = if args.daily {
        Grouping::Daily
    } else {
        Grouping::WholeRange
    };

    let report = summarize_work(ctx, &request, grouping).await?;
    let rendered = match args.format {
        OutputFormat::Text => render_text(&report.history, &report.summaries),
        OutputFormat::Json => {
            let mut json = render_json(&report.range, &report.history, &report.summaries)?;
            json.push('\n');
            json
        }
    };

    Ok(SummarizeOutcome { report, rendered })
}
