use chrono::{DateTime, Utc};

use crate::report::{CollectionSummary, DetailSource};

/// One distinct (test, message) pair under a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupedEntry {
    pub test: String,
    pub message: String,
    pub count: usize,
}

/// All failing checks of one request, in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupedFailure {
    pub request: String,
    /// first non-empty anchor seen for this request
    pub anchor: Option<String>,
    pub entries: Vec<GroupedEntry>,
}

impl GroupedFailure {
    pub fn new(request: impl Into<String>) -> Self {
        Self {
            request: request.into(),
            anchor: None,
            entries: Vec::new(),
        }
    }

    /// Number of failing checks, repeats included.
    pub fn total(&self) -> usize {
        self.entries.iter().map(|e| e.count).sum()
    }
}

/// A collection ready for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionDigest {
    pub summary: CollectionSummary,
    /// normalized failed count
    pub failed: usize,
    pub groups: Vec<GroupedFailure>,
}

impl CollectionDigest {
    pub fn name(&self) -> &str {
        &self.summary.name
    }

    pub fn source(&self) -> DetailSource {
        self.summary.detail_source
    }
}

/// The whole run.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedReport {
    pub collections: Vec<CollectionDigest>,
    pub total_failed: usize,
    pub generated_at: DateTime<Utc>,
}

impl AggregatedReport {
    /// Whether any collection reports a positive skipped metric.
    pub fn has_skipped(&self) -> bool {
        self.collections
            .iter()
            .any(|c| c.summary.skipped_count() > 0)
    }

    pub fn failing(&self) -> impl Iterator<Item = &CollectionDigest> {
        self.collections.iter().filter(|c| c.failed > 0)
    }
}
