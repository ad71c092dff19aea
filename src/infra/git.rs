use std::path::PathBuf;

use async_trait::async_trait;
use chrono::DateTime;
use tokio::process::Command;
use tracing::debug;

use crate::domain::commit::{CommitInfo, DiffSummary};
use crate::domain::range::DateRange;
use crate::error::{AppError, AppResult};
use crate::services::VersionControlService;

const FIELD_SEPARATOR: char = '\u{1f}';
const RECORD_SEPARATOR: char = '\u{1e}';
const LOG_FORMAT: &str = "--format=%H%x1f%aN%x1f%aI%x1f%s%x1e";

pub struct GitCli {
    workspace_root: PathBuf,
}

impl GitCli {
    pub fn new(workspace_root: PathBuf) -> Self {
        Self { workspace_root }
    }

    async fn run(&self, args: &[String]) -> AppResult<String> {
        debug!(?args, "running git");
        let output = Command::new("git")
            .arg("--no-pager")
            .args(args)
            .current_dir(&self.workspace_root)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|err| AppError::HistoryBackend(format!("failed to run git: {err}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AppError::HistoryBackend(format!(
                "git {} failed: {}",
                args.first().map(String::as_str).unwrap_or_default(),
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn parent_range(hash: &str) -> [String; 2] {
        [format!("{hash}^"), hash.to_string()]
    }
}

#[async_trait]
impl VersionControlService for GitCli {
    async fn list_commits(&self, range: &DateRange) -> AppResult<Vec<CommitInfo>> {
        let args = vec![
            "log".to_string(),
            format!("--since={} 00:00:00", range.start_str()),
            format!("--until={} 23:59:59", range.end_str()),
            LOG_FORMAT.to_string(),
        ];
        let stdout = self.run(&args).await?;
        parse_log_output(&stdout)
    }

    async fn commit_diff(&self, hash: &str) -> AppResult<String> {
        let mut args = diff_args("--no-color");
        args.extend(Self::parent_range(hash));
        self.run(&args).await
    }

    async fn diff_summary(&self, hash: &str) -> AppResult<DiffSummary> {
        let mut args = diff_args("--numstat");
        args.extend(Self::parent_range(hash));
        let stdout = self.run(&args).await?;
        parse_numstat(&stdout)
    }
}

/// `git diff` with the user's external diff driver disabled.
fn diff_args(mode: &str) -> Vec<String> {
    vec!["diff".to_string(), "--no-ext-diff".to_string(), mode.to_string()]
}

/// Parses records produced with [`LOG_FORMAT`].
pub fn parse_log_output(output: &str) -> AppResult<Vec<CommitInfo>> {
    output
        .split(RECORD_SEPARATOR)
        .map(str::trim_start)
        .filter(|record| !record.is_empty())
        .map(parse_log_record)
        .collect()
}

fn parse_log_record(record: &str) -> AppResult<CommitInfo> {
    let mut fields = record.splitn(4, FIELD_SEPARATOR);
    let (Some(hash), Some(author), Some(timestamp), Some(message)) =
        (fields.next(), fields.next(), fields.next(), fields.next())
    else {
        return Err(AppError::HistoryBackend(format!("malformed log record: {record:?}")));
    };

    let timestamp = DateTime::parse_from_rfc3339(timestamp).map_err(|err| {
        AppError::HistoryBackend(format!("commit {hash} has invalid date {timestamp:?}: {err}"))
    })?;

    Ok(CommitInfo {
        hash: hash.to_string(),
        author: author.to_string(),
        timestamp,
        message: message.trim_end().to_string(),
    })
}

/// Parses `git diff --numstat`. Binary entries report `-` and count as zero lines.
pub fn parse_numstat(output: &str) -> AppResult<DiffSummary> {
    let mut summary = DiffSummary::default();
    for line in output.lines().filter(|line| !line.trim().is_empty()) {
        let mut parts = line.splitn(3, '\t');
        let (Some(added), Some(deleted), Some(path)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(AppError::HistoryBackend(format!("malformed numstat line: {line:?}")));
        };
        summary.insertions += parse_count(added, line)?;
        summary.deletions += parse_count(deleted, line)?;
        summary.files.push(path.to_string());
    }
    Ok(summary)
}

fn parse_count(value: &str, line: &str) -> AppResult<u64> {
    if value == "-" {
        return Ok(0);
    }
    value
        .parse()
        .map_err(|_| AppError::HistoryBackend(format!("malformed numstat line: {line:?}")))
}
