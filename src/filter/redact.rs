use once_cell::sync::Lazy;
use regex::Regex;

const REDACTED: &str = "***redacted***";

// 词边界按 ASCII 判断，token 紧挨非 ASCII 字符时也能匹配
static BEARER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?-u:\b)Bearer\s+[A-Za-z0-9\-._]+(?-u:\b)").unwrap());
static JWT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?-u:\b)eyJ[A-Za-z0-9_\-]{10,}\.[A-Za-z0-9_\-]{10,}\.[A-Za-z0-9_\-]{10,}(?-u:\b)",
    )
    .unwrap()
});
static LONG_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?-u:\b)[A-Za-z0-9+/_\-]{32,}(?-u:\b)").unwrap());
static API_KEY_VALUE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(api[-_\s]?key\s*[:=]\s*)(\S+)").unwrap());
static AUTHORIZATION_VALUE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(authorization\s*[:=]\s*)(\S+)").unwrap());

/// Masks credential-like substrings: bearer tokens, JWTs, long opaque tokens and
/// the value part of `api-key:` / `authorization:` pairs.
///
/// Idempotent: redacting an already redacted string returns it unchanged.
pub fn redact_sensitive(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let out = BEARER.replace_all(text, format!("Bearer {}", REDACTED).as_str());
    let out = JWT.replace_all(&out, "***redacted.jwt***");
    let out = LONG_TOKEN.replace_all(&out, REDACTED);
    let out = API_KEY_VALUE.replace_all(&out, format!("${{1}}{}", REDACTED).as_str());
    let out = AUTHORIZATION_VALUE.replace_all(&out, format!("${{1}}{}", REDACTED).as_str());

    out.into_owned()
}

/// Whether `text` still carries a bearer token or a long opaque token.
pub fn contains_secret(text: &str) -> bool {
    BEARER.is_match(text) || LONG_TOKEN.is_match(text)
}
