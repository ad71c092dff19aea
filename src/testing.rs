//! In-memory collaborators for exercising the workflow without git or a model.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;

use crate::cancel::{CancelHandle, Cancellation};
use crate::config::{AppConfig, ConfigOverrides};
use crate::context::AppContext;
use crate::domain::commit::{CommitInfo, DiffSummary};
use crate::domain::range::DateRange;
use crate::error::{AppError, AppResult};
use crate::services::{LanguageModelService, VersionControlService};

pub fn commit(hash: &str, author: &str, timestamp: &str, message: &str) -> CommitInfo {
    CommitInfo {
        hash: hash.to_string(),
        author: author.to_string(),
        timestamp: DateTime::parse_from_rfc3339(timestamp).unwrap(),
        message: message.to_string(),
    }
}

#[derive(Default)]
pub struct FakeHistory {
    commits: Vec<CommitInfo>,
    summaries: HashMap<String, DiffSummary>,
    delays: HashMap<String, Duration>,
    broken: HashSet<String>,
    pub list_calls: AtomicUsize,
    pub diff_calls: AtomicUsize,
}

impl FakeHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a commit whose diff touches `files` distinct paths.
    pub fn with_commit(mut self, info: CommitInfo, added: u64, deleted: u64, files: usize) -> Self {
        let summary = DiffSummary {
            insertions: added,
            deletions: deleted,
            files: (0..files).map(|n| format!("{}/file{n}.rs", info.hash)).collect(),
        };
        self.summaries.insert(info.hash.clone(), summary);
        self.commits.push(info);
        self
    }

    pub fn with_delay(mut self, hash: &str, delay: Duration) -> Self {
        self.delays.insert(hash.to_string(), delay);
        self
    }

    /// Makes every diff-summary request for `hash` fail.
    pub fn with_broken(mut self, hash: &str) -> Self {
        self.broken.insert(hash.to_string());
        self
    }

    /// The week of 2024-09-23, newest first: bob on Tuesday, then three commits by alice on Monday.
    pub fn week_39() -> Self {
        Self::new()
            .with_commit(
                commit("b1", "bob", "2024-09-24T11:00:00+02:00", "Add exporter"),
                7,
                0,
                3,
            )
            .with_commit(
                commit("a3", "alice", "2024-09-23T17:00:00+02:00", "Tidy imports"),
                0,
                3,
                1,
            )
            .with_commit(
                commit("a2", "alice", "2024-09-23T12:00:00+02:00", "Handle empty input"),
                5,
                1,
                2,
            )
            .with_commit(
                commit("a1", "alice", "2024-09-23T09:00:00+02:00", "Add parser"),
                10,
                2,
                1,
            )
    }
}

#[async_trait]
impl VersionControlService for FakeHistory {
    async fn list_commits(&self, range: &DateRange) -> AppResult<Vec<CommitInfo>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .commits
            .iter()
            .filter(|c| c.day() >= range.start && c.day() <= range.end)
            .cloned()
            .collect())
    }

    async fn commit_diff(&self, hash: &str) -> AppResult<String> {
        self.diff_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delays.get(hash) {
            tokio::time::sleep(*delay).await;
        }
        Ok(format!("+changes from {hash}"))
    }

    async fn diff_summary(&self, hash: &str) -> AppResult<DiffSummary> {
        if self.broken.contains(hash) {
            return Err(AppError::HistoryBackend(format!("unknown revision {hash}^")));
        }
        self.summaries
            .get(hash)
            .cloned()
            .ok_or_else(|| AppError::HistoryBackend(format!("no such commit {hash}")))
    }
}

#[derive(Default)]
pub struct FakeModel {
    pub texts: Mutex<Vec<String>>,
    fail_containing: Option<String>,
    transient_failures: AtomicU32,
    delay: Option<Duration>,
    cancel_on_first_call: Mutex<Option<CancelHandle>>,
    in_flight: AtomicUsize,
    pub peak_in_flight: AtomicUsize,
}

impl FakeModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails every call whose text contains `needle`.
    pub fn failing_on(mut self, needle: &str) -> Self {
        self.fail_containing = Some(needle.to_string());
        self
    }

    /// Fails the first `count` calls, then succeeds.
    pub fn flaky(self, count: u32) -> Self {
        self.transient_failures.store(count, Ordering::SeqCst);
        self
    }

    pub fn slow(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn cancelling(self, handle: CancelHandle) -> Self {
        *self.cancel_on_first_call.lock().unwrap() = Some(handle);
        self
    }

    pub fn call_count(&self) -> usize {
        self.texts.lock().unwrap().len()
    }
}

#[async_trait]
impl LanguageModelService for FakeModel {
    async fn summarize(&self, text: &str) -> AppResult<String> {
        self.texts.lock().unwrap().push(text.to_string());
        let cancel = self.cancel_on_first_call.lock().unwrap().take();
        if let Some(handle) = cancel {
            handle.cancel();
        }

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let remaining = self.transient_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.transient_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(AppError::Summarization("503 service unavailable".to_string()));
        }
        if let Some(needle) = &self.fail_containing {
            if text.contains(needle.as_str()) {
                return Err(AppError::Summarization("model refused input".to_string()));
            }
        }
        let first_line = text.lines().next().unwrap_or_default();
        Ok(format!("summary of {first_line}"))
    }
}

pub fn test_config(overrides: ConfigOverrides) -> AppConfig {
    let mut config = AppConfig::from_lookup(Path::new("/work"), overrides, |_| None).unwrap();
    config.retry_backoff = Duration::from_millis(1);
    config
}

pub fn context(
    history: Arc<FakeHistory>,
    model: Arc<FakeModel>,
    config: AppConfig,
    cancellation: Cancellation,
) -> AppContext {
    AppContext::new(config, history, model, cancellation)
}
