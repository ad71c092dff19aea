use indexmap::IndexMap;
use serde::Serialize;

use crate::domain::commit::CommitRecord;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AuthorTotals {
    pub total_lines_added: u64,
    pub total_lines_deleted: u64,
    pub total_files_changed: u64,
    pub total_commits: u64,
}

/// One author's commits within one period, with running totals.
///
/// Totals are only ever updated by [`AuthorDayAggregate::push`], once per
/// commit, so they always equal the sum over `commits`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorDayAggregate {
    totals: AuthorTotals,
    commits: Vec<CommitRecord>,
}

impl AuthorDayAggregate {
    pub fn push(&mut self, record: CommitRecord) {
        let metrics = record.metrics();
        self.totals.total_lines_added += metrics.lines_added;
        self.totals.total_lines_deleted += metrics.lines_deleted;
        self.totals.total_files_changed += metrics.files_changed;
        self.totals.total_commits += 1;
        self.commits.push(record);
    }

    pub fn totals(&self) -> AuthorTotals {
        self.totals
    }

    pub fn commits(&self) -> &[CommitRecord] {
        &self.commits
    }

    /// Text handed to the summarization backend for this group.
    pub fn combined_diff_text(&self) -> String {
        let mut combined = String::new();
        for commit in &self.commits {
            combined.push_str("Commit: ");
            combined.push_str(commit.message());
            combined.push_str("\nDiff:\n");
            combined.push_str(commit.diff());
            combined.push_str("\n\n");
        }
        combined
    }
}

/// period -> author -> aggregate, both levels in first-occurrence order.
///
/// In daily mode a period is a `YYYY-MM-DD` date; in whole-range mode there is
/// a single period labelled with the range.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupedHistory {
    periods: IndexMap<String, IndexMap<String, AuthorDayAggregate>>,
}

impl GroupedHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a commit to its (period, author) group, creating the group on first sight.
    pub fn insert(&mut self, period: &str, record: CommitRecord) {
        let authors = self.periods.entry(period.to_string()).or_default();
        authors
            .entry(record.author().to_string())
            .or_default()
            .push(record);
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    pub fn period_count(&self) -> usize {
        self.periods.len()
    }

    pub fn group_count(&self) -> usize {
        self.periods.values().map(IndexMap::len).sum()
    }

    #[cfg(test)]
    pub fn get(&self, period: &str, author: &str) -> Option<&AuthorDayAggregate> {
        self.periods.get(period)?.get(author)
    }

    pub fn periods(&self) -> impl Iterator<Item = (&str, &IndexMap<String, AuthorDayAggregate>)> {
        self.periods
            .iter()
            .map(|(period, authors)| (period.as_str(), authors))
    }

    /// Every (period, author, aggregate) in fixed iteration order.
    pub fn groups(&self) -> impl Iterator<Item = (&str, &str, &AuthorDayAggregate)> {
        self.periods.iter().flat_map(|(period, authors)| {
            authors
                .iter()
                .map(move |(author, aggregate)| (period.as_str(), author.as_str(), aggregate))
        })
    }

    /// Folds every period into a single one, keeping author first-occurrence
    /// order and each author's commit order.
    pub fn merge_periods(self, label: &str) -> Self {
        let mut merged = GroupedHistory::new();
        for (_, authors) in self.periods {
            for (_, aggregate) in authors {
                for record in aggregate.commits {
                    merged.insert(label, record);
                }
            }
        }
        merged
    }
}
