use crate::aggregate::types::{AggregatedReport, CollectionDigest, GroupedEntry, GroupedFailure};
use crate::report::{CollectionSummary, DetailSource, FailureRecord, UNKNOWN_ASSERTION, UNKNOWN_REQUEST};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Placeholder for a failure without any message text.
pub const EMPTY_MESSAGE: &str = "Error";

fn or_placeholder<'a>(text: &'a str, placeholder: &'a str) -> &'a str {
    if text.is_empty() { placeholder } else { text }
}

/// Group records by request, then by (test, message), counting repeats.
///
/// Request order and entry order follow the first occurrence in `records`.
pub fn group_failures(records: &[FailureRecord]) -> Vec<GroupedFailure> {
    let mut groups: Vec<GroupedFailure> = Vec::new();
    let mut request_index: HashMap<String, usize> = HashMap::new();
    let mut entry_index: HashMap<(usize, String, String), usize> = HashMap::new();

    for record in records {
        let request = or_placeholder(&record.request, UNKNOWN_REQUEST);
        let test = or_placeholder(&record.test, UNKNOWN_ASSERTION);
        let message = or_placeholder(&record.message, EMPTY_MESSAGE);

        let gi = *request_index.entry(request.to_string()).or_insert_with(|| {
            groups.push(GroupedFailure::new(request));
            groups.len() - 1
        });
        let group = &mut groups[gi];

        if group.anchor.is_none()
            && let Some(anchor) = record.anchor.as_deref().filter(|a| !a.is_empty())
        {
            group.anchor = Some(anchor.to_string());
        }

        let key = (gi, test.to_string(), message.to_string());
        match entry_index.get(&key) {
            Some(&ei) => group.entries[ei].count += 1,
            None => {
                entry_index.insert(key, group.entries.len());
                group.entries.push(GroupedEntry {
                    test: test.to_string(),
                    message: message.to_string(),
                    count: 1,
                });
            }
        }
    }

    groups
}

/// The failed count shown for a collection.
///
/// A structured log is authoritative. Otherwise the report's own failed
/// metric wins when positive, else the number of harvested rows.
pub fn normalized_failed(summary: &CollectionSummary) -> usize {
    match summary.detail_source {
        DetailSource::StructuredLog { failure_count } => failure_count,
        DetailSource::HtmlFallback | DetailSource::Disabled => match summary.failed_metric() {
            Some(n) if n > 0 => usize::try_from(n).unwrap_or(usize::MAX),
            _ => summary.failures.len(),
        },
    }
}

pub fn aggregate(collections: Vec<CollectionSummary>, generated_at: DateTime<Utc>) -> AggregatedReport {
    let collections: Vec<CollectionDigest> = collections
        .into_iter()
        .map(|summary| CollectionDigest {
            failed: normalized_failed(&summary),
            groups: group_failures(&summary.failures),
            summary,
        })
        .collect();

    let total_failed = collections
        .iter()
        .fold(0usize, |total, c| total.saturating_add(c.failed));

    AggregatedReport {
        collections,
        total_failed,
        generated_at,
    }
}
