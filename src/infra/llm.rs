use std::process::Stdio;

use async_trait::async_trait;
use reqwest::{
    Client,
    header::{ACCEPT, CONTENT_TYPE},
};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::services::LanguageModelService;

/// Runs an external program per call and feeds it the text on stdin.
///
/// The text never becomes part of the command line, so diff content cannot
/// inject arguments or shell syntax.
pub struct CommandSummarizer {
    program: String,
    args: Vec<String>,
}

impl CommandSummarizer {
    pub fn new(program: String, args: Vec<String>) -> Self {
        Self { program, args }
    }
}

#[async_trait]
impl LanguageModelService for CommandSummarizer {
    async fn summarize(&self, text: &str) -> AppResult<String> {
        debug!(program = %self.program, bytes = text.len(), "spawning summarizer");
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|err| {
                AppError::Summarization(format!("failed to start '{}': {err}", self.program))
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| AppError::Summarization("summarizer stdin unavailable".to_string()))?;
        let payload = text.as_bytes().to_vec();
        let feed = async move {
            let result = stdin.write_all(&payload).await;
            drop(stdin);
            result
        };

        // Feed and drain concurrently so a chatty child cannot block on a full pipe.
        let (fed, output) = tokio::join!(feed, child.wait_with_output());
        let output = output.map_err(|err| {
            AppError::Summarization(format!("failed waiting for '{}': {err}", self.program))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AppError::Summarization(format!(
                "'{}' exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }
        if let Err(err) = fed {
            debug!(%err, "summarizer closed stdin early");
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

/// Posts the text as JSON to a summarization endpoint.
pub struct HttpSummarizer {
    http: Client,
    endpoint: String,
}

impl HttpSummarizer {
    pub fn new(endpoint: String) -> Self {
        Self {
            http: Client::new(),
            endpoint,
        }
    }
}

#[async_trait]
impl LanguageModelService for HttpSummarizer {
    async fn summarize(&self, text: &str) -> AppResult<String> {
        let response = self
            .http
            .post(&self.endpoint)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .json(&SummarizeRequest { text })
            .send()
            .await
            .map_err(|err| {
                AppError::Summarization(format!("failed to call {}: {err}", self.endpoint))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unable to read response>".to_string());
            return Err(AppError::Summarization(format!(
                "endpoint responded with {status}: {body}"
            )));
        }

        let payload: SummarizeResponse = response.json().await.map_err(|err| {
            AppError::Summarization(format!("failed to parse summarizer response: {err}"))
        })?;

        Ok(payload.summary.trim().to_string())
    }
}

#[derive(Serialize)]
struct SummarizeRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct SummarizeResponse {
    summary: String,
}
