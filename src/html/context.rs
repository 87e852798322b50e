use crate::html::query::{parent_element, prev_elements, text_of};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::ElementRef;
use url::Url;

static ITERATION_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)iteration\s*:\s*\d+\s*-\s*(.+)$").unwrap());
static HTTP_VERB: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b(get|post|put|delete|patch)\b").unwrap());
static PATH_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"/[A-Za-z0-9/_\-?&=%.:]+").unwrap());
static ABSOLUTE_URL: Lazy<Regex> = Lazy::new(|| Regex::new(r#"(?i)\bhttps?://[^\s'"]+"#).unwrap());

/// Lines longer than this are prose, not a "VERB /path" request line.
const MAX_REQUEST_LINE_CHARS: usize = 120;

/// Bounds of the context search around a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchLimits {
    /// preceding siblings of the node itself
    pub max_steps: usize,
    /// ancestor levels
    pub max_depth: usize,
    /// preceding siblings inspected per ancestor
    pub max_ancestor_steps: usize,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            max_steps: 12,
            max_depth: 5,
            max_ancestor_steps: 6,
        }
    }
}

/// Request name and URL found near a node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub request: Option<String>,
    pub url: Option<String>,
}

impl RequestContext {
    pub fn is_complete(&self) -> bool {
        self.request.is_some() && self.url.is_some()
    }

    /// Inspects one block of text; already-found values are never overwritten.
    pub fn sniff(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }

        if self.request.is_none()
            && let Some(caps) = ITERATION_HEADING.captures(text)
        {
            self.request = Some(caps[1].trim().to_string());
        }

        if self.request.is_none()
            && text.chars().count() <= MAX_REQUEST_LINE_CHARS
            && HTTP_VERB.is_match(text)
            && PATH_TOKEN.is_match(text)
        {
            self.request = Some(text.to_string());
        }

        if self.url.is_none() {
            self.url = ABSOLUTE_URL
                .find_iter(text)
                .map(|m| m.as_str())
                .find(|candidate| Url::parse(candidate).is_ok())
                .map(|s| s.to_string());
        }
    }
}

/// Bounded search for the request a failures table belongs to.
///
/// Walks `limits.max_steps` preceding siblings of `node`, then up to
/// `limits.max_depth` ancestors; each ancestor's own text is inspected followed by
/// `limits.max_ancestor_steps` of its preceding siblings. Stops as soon as both a
/// request and a URL are known.
pub fn infer_request_context(node: ElementRef<'_>, limits: SearchLimits) -> RequestContext {
    let mut ctx = RequestContext::default();

    for sibling in prev_elements(node).take(limits.max_steps) {
        if ctx.is_complete() {
            return ctx;
        }
        ctx.sniff(&text_of(sibling));
    }

    let mut parent = parent_element(node);
    let mut depth = 0;
    while let Some(ancestor) = parent {
        if depth >= limits.max_depth || ctx.is_complete() {
            break;
        }
        ctx.sniff(&text_of(ancestor));

        for sibling in prev_elements(ancestor).take(limits.max_ancestor_steps) {
            if ctx.is_complete() {
                break;
            }
            ctx.sniff(&text_of(sibling));
        }

        parent = parent_element(ancestor);
        depth += 1;
    }

    ctx
}
