use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::error::{AppError, AppResult};

const DEFAULT_COMMAND: &str = "gh copilot summarize";
const DEFAULT_TIMEOUT_SECS: u64 = 120;
const DEFAULT_SUMMARY_CONCURRENCY: usize = 4;
const DEFAULT_FETCH_CONCURRENCY: usize = 8;
const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub workspace_root: PathBuf,
    pub summarizer: SummarizerProvider,
    pub summary_timeout: Duration,
    pub summary_retries: u32,
    pub retry_backoff: Duration,
    pub summary_concurrency: usize,
    pub fetch_concurrency: usize,
    pub failure_policy: FailurePolicy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummarizerProvider {
    Command { program: String, args: Vec<String> },
    Http { endpoint: String },
}

/// What the dispatcher does when one group's summary fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Record the failure and keep summarizing the remaining groups.
    Isolate,
    /// Stop at the first failure.
    FailFast,
}

/// Values supplied on the command line; each one beats its environment variable.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub repo: Option<PathBuf>,
    pub summarizer: Option<String>,
    pub summarizer_command: Option<String>,
    pub summarizer_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub retries: Option<u32>,
    pub concurrency: Option<usize>,
    pub fetch_concurrency: Option<usize>,
    pub fail_fast: bool,
}

impl AppConfig {
    pub fn load(workspace_hint: &Path, overrides: ConfigOverrides) -> AppResult<Self> {
        Self::from_lookup(workspace_hint, overrides, |key| env::var(key).ok())
    }

    pub fn from_lookup(
        workspace_hint: &Path,
        overrides: ConfigOverrides,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> AppResult<Self> {
        let provider = overrides
            .summarizer
            .or_else(|| lookup("WORKLOG_SUMMARIZER"))
            .unwrap_or_else(|| "command".to_string());

        let summarizer = match provider.trim().to_lowercase().as_str() {
            "command" => {
                let command = overrides
                    .summarizer_command
                    .or_else(|| lookup("WORKLOG_SUMMARIZER_COMMAND"))
                    .unwrap_or_else(|| DEFAULT_COMMAND.to_string());
                let mut words = command.split_whitespace().map(str::to_string);
                let program = words.next().ok_or_else(|| {
                    AppError::Configuration("summarizer command is empty".to_string())
                })?;
                SummarizerProvider::Command {
                    program,
                    args: words.collect(),
                }
            }
            "http" => {
                let endpoint = overrides
                    .summarizer_url
                    .or_else(|| lookup("WORKLOG_SUMMARIZER_URL"))
                    .filter(|url| !url.trim().is_empty())
                    .ok_or_else(|| {
                        AppError::Configuration(
                            "http summarizer selected but no URL configured".to_string(),
                        )
                    })?;
                SummarizerProvider::Http { endpoint }
            }
            other => {
                return Err(AppError::Configuration(format!(
                    "unknown summarizer '{other}' (expected 'command' or 'http')"
                )));
            }
        };

        let timeout_secs = pick(overrides.timeout_secs, &lookup, "WORKLOG_TIMEOUT_SECS")?
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(AppError::Configuration(
                "summary timeout must be at least one second".to_string(),
            ));
        }

        let summary_concurrency = pick(overrides.concurrency, &lookup, "WORKLOG_CONCURRENCY")?
            .unwrap_or(DEFAULT_SUMMARY_CONCURRENCY);
        let fetch_concurrency = pick(
            overrides.fetch_concurrency,
            &lookup,
            "WORKLOG_FETCH_CONCURRENCY",
        )?
        .unwrap_or(DEFAULT_FETCH_CONCURRENCY);
        if summary_concurrency == 0 || fetch_concurrency == 0 {
            return Err(AppError::Configuration(
                "concurrency limits must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            workspace_root: overrides
                .repo
                .unwrap_or_else(|| workspace_hint.to_path_buf()),
            summarizer,
            summary_timeout: Duration::from_secs(timeout_secs),
            summary_retries: pick(overrides.retries, &lookup, "WORKLOG_RETRIES")?.unwrap_or(0),
            retry_backoff: DEFAULT_RETRY_BACKOFF,
            summary_concurrency,
            fetch_concurrency,
            failure_policy: if overrides.fail_fast {
                FailurePolicy::FailFast
            } else {
                FailurePolicy::Isolate
            },
        })
    }
}

fn pick<T>(
    flag: Option<T>,
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> AppResult<Option<T>>
where
    T: FromStr,
{
    if flag.is_some() {
        return Ok(flag);
    }
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| AppError::Configuration(format!("{key} has invalid value '{raw}'"))),
        None => Ok(None),
    }
}
