use crate::html::harvest::Harvester;
use crate::html::query::{Query, closest_with_class, text_of};
use crate::report::{FailureRecord, UNKNOWN_REQUEST};
use crate::utils::collapse_whitespace;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;

static FAILED_CARD_ANCHORS: Lazy<Query> =
    Lazy::new(|| Query::new(&[r#"#pills-failed .card-header a[id^="fails-"]"#]));
static CARD_BODY: Lazy<Query> = Lazy::new(|| Query::new(&[".card-body"]));
static FAILED_TEST_HEADING: Lazy<Query> = Lazy::new(|| Query::new(&["h5"]));
static MESSAGE_BLOCK: Lazy<Query> = Lazy::new(|| Query::new(&["pre code", "pre"]));
static FAILED_TEST_LABEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^\s*Failed\s*Test:\s*").unwrap());

/// Card pass over the "Failed" tab.
///
/// Returns how many failure cards the document has, whether or not they
/// produced records; the table pass only runs when this is zero.
pub fn harvest_failure_cards(doc: &Html, harvester: &mut Harvester<'_>) -> usize {
    let anchors = FAILED_CARD_ANCHORS.all_in_document(doc);

    for anchor in &anchors {
        if harvester.is_full() {
            break;
        }

        let title = collapse_whitespace(&text_of(*anchor));
        let request = request_from_title(&title);

        let body = closest_with_class(*anchor, "card").and_then(|card| CARD_BODY.first_in(card));
        let (test, message) = match body {
            Some(body) => {
                let heading = FAILED_TEST_HEADING
                    .first_in(body)
                    .map(text_of)
                    .unwrap_or_default();
                let test = FAILED_TEST_LABEL.replace(&heading, "").trim().to_string();
                let message = MESSAGE_BLOCK
                    .first_in(body)
                    .map(text_of)
                    .unwrap_or_default();
                (test, message)
            }
            None => (String::new(), String::new()),
        };

        if test.is_empty() && message.is_empty() {
            continue;
        }

        let anchor_ref = anchor.value().attr("id").map(|id| format!("#{}", id));
        harvester.offer(FailureRecord::new(request, test, message).with_anchor(anchor_ref));
    }

    anchors.len()
}

/// `Iteration - ErrorType - Request Name` -> `Request Name`
///
/// Everything after the first two segments is the request; shorter titles
/// fall back to their last segment.
pub fn request_from_title(title: &str) -> String {
    let parts: Vec<&str> = title
        .split(" - ")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    if parts.len() >= 3 {
        parts[2..].join(" - ")
    } else {
        parts
            .last()
            .map(|s| s.to_string())
            .unwrap_or_else(|| UNKNOWN_REQUEST.to_string())
    }
}
