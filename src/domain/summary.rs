/// What the summarization backend produced for one group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryOutcome {
    Completed(String),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryResult {
    pub period: String,
    pub author: String,
    pub outcome: SummaryOutcome,
}

impl SummaryResult {
    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, SummaryOutcome::Failed(_))
    }
}
