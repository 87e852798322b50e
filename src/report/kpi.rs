use crate::html::query::{Query, text_of};
use crate::report::types::{CollectionSummary, FAILED_KEYS, Metrics};
use crate::utils::parse_count;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html};

static KPI_CARDS: Lazy<Query> = Lazy::new(|| Query::new(&[".card-body"]));
static KPI_LABEL: Lazy<Query> = Lazy::new(|| Query::new(&["h6.text-uppercase"]));
// 不同版本的 htmlextra 使用不同的 display 类
static KPI_VALUE_DISPLAY_1: Lazy<Query> = Lazy::new(|| Query::new(&["h1.display-1"]));
static KPI_VALUE_DISPLAY_4: Lazy<Query> = Lazy::new(|| Query::new(&["h1.display-4"]));

static TABLES: Lazy<Query> = Lazy::new(|| Query::new(&["table"]));
static HEAD_CELLS: Lazy<Query> = Lazy::new(|| Query::new(&["thead tr th, thead tr td"]));
static BODY_ROWS: Lazy<Query> = Lazy::new(|| Query::new(&["tbody tr"]));
static ROW_CELLS: Lazy<Query> = Lazy::new(|| Query::new(&["td, th"]));
static FAILED_HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bfailed?\b").unwrap());

/// 从 report.html 提取 KPI 指标
///
/// 从不因为畸形的 HTML 失败：找不到的指标在渲染时显示为占位符。
pub fn extract_kpis(html: &str, collection_name: &str) -> CollectionSummary {
    let doc = Html::parse_document(html);
    extract_kpis_from_document(&doc, collection_name)
}

pub fn extract_kpis_from_document(doc: &Html, collection_name: &str) -> CollectionSummary {
    let mut metrics = Metrics::new();

    for card in KPI_CARDS.all_in_document(doc) {
        let label = KPI_LABEL.text_in(card);
        let mut value = KPI_VALUE_DISPLAY_1.text_in(card);
        if value.is_empty() {
            value = KPI_VALUE_DISPLAY_4.text_in(card);
        }
        if !label.is_empty() && !value.is_empty() {
            metrics.insert_label(&label, value);
        }
    }

    if let Some(sum) = failed_from_tables(doc) {
        let reported = metrics.first_count(FAILED_KEYS);
        if reported.is_none_or(|n| n == 0) {
            metrics.insert("total_failed_tests", sum.to_string());
        }
    }

    CollectionSummary::new(collection_name, metrics)
}

/// 对所有带 "Failed" 表头的表格求该列之和，取最大值
pub fn failed_from_tables(doc: &Html) -> Option<i64> {
    TABLES
        .all_in_document(doc)
        .into_iter()
        .filter_map(failed_column_sum)
        .max()
}

fn failed_column_sum(table: ElementRef<'_>) -> Option<i64> {
    let headers: Vec<String> = HEAD_CELLS
        .all_in(table)
        .into_iter()
        .map(|cell| text_of(cell).trim().to_lowercase())
        .collect();

    let failed_idx = headers.iter().position(|h| FAILED_HEADER.is_match(h))?;

    let mut sum = 0i64;
    let mut rows = 0usize;
    for row in BODY_ROWS.all_in(table) {
        let cells = ROW_CELLS.all_in(row);
        if let Some(cell) = cells.get(failed_idx) {
            sum = sum.saturating_add(parse_count(&text_of(*cell)).unwrap_or(0));
            rows += 1;
        }
    }

    (rows > 0 && sum >= 0).then_some(sum)
}
