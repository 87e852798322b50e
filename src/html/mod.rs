//! HTML 回退解析：没有 report.json 时从 report.html 中提取失败断言

pub mod cards;
pub mod context;
pub mod harvest;
pub mod query;
pub mod tables;

pub use cards::{harvest_failure_cards, request_from_title};
pub use context::{RequestContext, SearchLimits, infer_request_context};
pub use harvest::Harvester;
pub use query::Query;
pub use tables::{ColumnMap, HeaderRow, harvest_failure_tables, harvest_table};

use crate::filter::NoiseFilter;
use crate::report::FailureRecord;
use scraper::Html;
use tracing::debug;

/// 从 HTML 报告中提取失败记录（已过滤、已脱敏、已去重）
///
/// 先尝试 Failed 标签页的卡片；只有文档中完全没有失败卡片时才扫描表格。
pub fn extract_failures(html: &str, filter: &NoiseFilter, max_rows: usize) -> Vec<FailureRecord> {
    let doc = Html::parse_document(html);
    extract_failures_from_document(&doc, filter, max_rows)
}

/// 同 extract_failures，使用已解析的文档
pub fn extract_failures_from_document(
    doc: &Html,
    filter: &NoiseFilter,
    max_rows: usize,
) -> Vec<FailureRecord> {
    let mut harvester = Harvester::new(filter, max_rows);

    let cards = harvest_failure_cards(doc, &mut harvester);
    if cards > 0 {
        debug!("{} failure cards, {} rows kept", cards, harvester.len());
        return harvester.into_records();
    }

    harvest_failure_tables(doc, &mut harvester);
    debug!("table pass kept {} rows", harvester.len());
    harvester.into_records()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cards_take_precedence_over_tables() {
        let html = r##"<html><body>
            <div id="pills-failed">
                <div class="card">
                    <div class="card-header"><a id="fails-1" href="#">1 - AssertionError - Login</a></div>
                    <div class="card-body">
                        <h5><strong>Failed Test:</strong> Status code is 200</h5>
                        <pre><code>expected 500 to equal 200</code></pre>
                    </div>
                </div>
            </div>
            <table>
                <thead><tr><th>Request</th><th>Assertion</th><th>Message</th></tr></thead>
                <tbody><tr><td>GET /other</td><td>t</td><td>from table</td></tr></tbody>
            </table>
        </body></html>"##;

        let records = extract_failures(html, &NoiseFilter::default(), 100);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].request, "Login");
        assert_eq!(records[0].anchor.as_deref(), Some("#fails-1"));
    }

    #[test]
    fn test_tables_used_without_cards() {
        let html = r#"<table>
            <thead><tr><th>Request</th><th>Assertion</th><th>Message</th></tr></thead>
            <tbody><tr><td>GET /other</td><td>t</td><td>from table</td></tr></tbody>
        </table>"#;

        let records = extract_failures(html, &NoiseFilter::default(), 100);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].message, "from table");
    }

    #[test]
    fn test_malformed_markup_degrades() {
        let html = "<table><tr><td>unclosed <b>markup";
        assert!(extract_failures(html, &NoiseFilter::default(), 100).is_empty());
        assert!(extract_failures("", &NoiseFilter::default(), 100).is_empty());
    }
}
