use crate::config::DigestSettings;
use crate::filter::redact::redact_sensitive;
use crate::report::FailureRecord;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// HTTP header / request metadata names that show up as "assertions" in
/// generated tables but never are one.
pub const NOISE_ASSERTION_NAMES: &[&str] = &[
    "accept",
    "accept-encoding",
    "accept-language",
    "cache-control",
    "connection",
    "content-length",
    "content-type",
    "cookie",
    "date",
    "host",
    "pragma",
    "referer",
    "sec-ch-ua",
    "sec-fetch-dest",
    "sec-fetch-mode",
    "sec-fetch-site",
    "user-agent",
    "postman-token",
    "x-forwarded-for",
    "x-forwarded-proto",
    "x-powered-by",
    "authorization",
    "x-auth-token",
    "x-correlation-id",
];

static NOISE_MESSAGES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // empty
        r"^\s*$",
        // "Header-Name: value"
        r"^[A-Za-z\-]+:\s?.*$",
        // bearer token only
        r"(?i)^Bearer\s+[A-Za-z0-9\-._]+$",
        // a single long token/blob
        r"^[A-Za-z0-9+/_\-]{32,}$",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Drops non-failure rows and redacts the survivors.
#[derive(Debug, Clone)]
pub struct NoiseFilter {
    exclude_patterns: Vec<Regex>,
    noise_names: HashSet<String>,
}

impl NoiseFilter {
    pub fn new(exclude_patterns: Vec<Regex>, extra_noise_headers: &[String]) -> Self {
        let noise_names = NOISE_ASSERTION_NAMES
            .iter()
            .map(|s| s.to_string())
            .chain(extra_noise_headers.iter().map(|h| h.trim().to_lowercase()))
            .collect();

        Self {
            exclude_patterns,
            noise_names,
        }
    }

    pub fn from_settings(settings: &DigestSettings) -> Self {
        Self::new(
            settings.exclude_patterns.clone(),
            &settings.extra_noise_headers,
        )
    }

    /// Whether the (test, message) pair is noise rather than a failed check.
    pub fn is_noise(&self, test: &str, message: &str) -> bool {
        let test = test.trim();
        let message = message.trim();

        if self
            .exclude_patterns
            .iter()
            .any(|rx| rx.is_match(test) || rx.is_match(message))
        {
            return true;
        }

        if self.noise_names.contains(&test.to_lowercase()) {
            return true;
        }

        NOISE_MESSAGES.iter().any(|rx| rx.is_match(message))
    }

    /// Filters one record; survivors come back with test and message redacted.
    pub fn admit(&self, record: FailureRecord) -> Option<FailureRecord> {
        if self.is_noise(&record.test, &record.message) {
            return None;
        }

        Some(FailureRecord {
            test: redact_sensitive(&record.test),
            message: redact_sensitive(&record.message),
            ..record
        })
    }

    /// Filter stage over a batch of raw records, order preserved.
    pub fn apply(&self, records: Vec<FailureRecord>) -> Vec<FailureRecord> {
        records.into_iter().filter_map(|r| self.admit(r)).collect()
    }
}

impl Default for NoiseFilter {
    fn default() -> Self {
        Self::from_settings(&DigestSettings::default())
    }
}
