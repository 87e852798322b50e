use once_cell::sync::Lazy;
use regex::Regex;

static FIRST_INTEGER: Lazy<Regex> = Lazy::new(|| Regex::new(r"-?\d+").unwrap());
static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// 读取文本中的第一个整数（忽略千位分隔符）
///
/// "1,024 failed" -> Some(1024)，没有数字时返回 None
pub fn parse_count(text: &str) -> Option<i64> {
    let cleaned = text.replace(',', "");
    FIRST_INTEGER
        .find(&cleaned)
        .and_then(|m| m.as_str().parse::<i64>().ok())
}

/// 同 parse_count，但缺失时返回默认值
pub fn count_or(text: &str, fallback: i64) -> i64 {
    parse_count(text).unwrap_or(fallback)
}

/// 将 KPI 标签规范化为 metrics 键
///
/// 小写化，非 [a-z0-9] 字符替换为 `_`，合并连续的 `_`，去掉首尾 `_`
pub fn clean_key(label: &str) -> String {
    let mut key = String::with_capacity(label.len());
    for c in label.to_lowercase().chars() {
        let c = if c.is_ascii_lowercase() || c.is_ascii_digit() {
            c
        } else {
            '_'
        };
        if c == '_' && key.ends_with('_') {
            continue;
        }
        key.push(c);
    }
    key.trim_matches('_').to_string()
}

/// 合并连续空白为单个空格并去掉首尾空白
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RUN.replace_all(text.trim(), " ").into_owned()
}

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
