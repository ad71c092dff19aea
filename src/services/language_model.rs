use async_trait::async_trait;

use crate::error::AppResult;

/// Turns a block of commit messages and diffs into prose.
///
/// Implementations report backend failures as `AppError::Summarization`
/// carrying whatever diagnostic the backend produced.
#[async_trait]
pub trait LanguageModelService: Send + Sync {
    async fn summarize(&self, text: &str) -> AppResult<String>;
}
