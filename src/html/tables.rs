use crate::html::context::{SearchLimits, infer_request_context};
use crate::html::harvest::Harvester;
use crate::html::query::{Query, is_heading, is_tag, next_elements, text_of};
use crate::report::{FailureRecord, UNKNOWN_ASSERTION, UNKNOWN_REQUEST};
use crate::utils::{collapse_whitespace, count_or};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html};

static TABLES: Lazy<Query> = Lazy::new(|| Query::new(&["table"]));
static HEADINGS: Lazy<Query> = Lazy::new(|| Query::new(&["h1, h2, h3, h4, h5, h6"]));
static HEAD_ROW: Lazy<Query> = Lazy::new(|| Query::new(&["thead tr"]));
static BODY_ROWS: Lazy<Query> = Lazy::new(|| Query::new(&["tbody tr"]));
static CELLS: Lazy<Query> = Lazy::new(|| Query::new(&["th, td"]));

static FAILURE_SECTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)fail|assertion").unwrap());
static HAS_SCHEME: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)https?://").unwrap());

const REQUEST_HEADERS: &[&str] = &["request", "endpoint", "url", "item", "request name", "api", "path"];
const TEST_HEADERS: &[&str] = &["assertion", "test", "test name", "check", "rule"];
const MESSAGE_HEADERS: &[&str] = &[
    "error",
    "message",
    "detail",
    "details",
    "reason",
    "failure",
    "error message",
];
const FAILED_HEADERS: &[&str] = &["failed", "fails"];

const ASSERTION_HINTS: &[&str] = &["assertion", "test", "check", "rule"];
const MESSAGE_HINTS: &[&str] = &["error", "message", "detail", "details", "reason", "failure"];

const DEFAULT_MESSAGE: &str = "Failed";

/// 表头行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderRow {
    /// 规范化后的表头文本（小写、合并空白）
    pub cells: Vec<String>,
    /// 表头取自 tbody 的第一行，收集数据时需跳过该行
    pub synthetic: bool,
}

impl HeaderRow {
    /// 读取表头：优先第一行 thead，否则把 tbody 第一行当作表头
    pub fn read(table: ElementRef<'_>) -> Option<Self> {
        let explicit = HEAD_ROW
            .first_in(table)
            .map(|row| header_cells(row))
            .filter(|cells| !cells.is_empty());

        if let Some(cells) = explicit {
            return Some(Self {
                cells,
                synthetic: false,
            });
        }

        let cells = BODY_ROWS.first_in(table).map(header_cells)?;
        if cells.is_empty() {
            return None;
        }
        Some(Self {
            cells,
            synthetic: true,
        })
    }

    /// 通用的 Name/Value 两列表（请求元数据），不是失败表
    pub fn is_name_value(&self) -> bool {
        self.cells.len() == 2
            && (self.cells[0] == "name" || self.cells[0] == "key")
            && self.cells[1] == "value"
    }
}

fn header_cells(row: ElementRef<'_>) -> Vec<String> {
    CELLS
        .all_in(row)
        .into_iter()
        .map(|cell| collapse_whitespace(&text_of(cell)).to_lowercase())
        .collect()
}

/// 失败表中各语义列的位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub request: Option<usize>,
    pub test: usize,
    pub message: usize,
    pub failed: Option<usize>,
}

impl ColumnMap {
    /// 按表头词汇模糊匹配列；无法识别为失败表时返回 None
    pub fn detect(headers: &[String]) -> Option<Self> {
        let find = |vocab: &[&str]| {
            headers
                .iter()
                .position(|h| vocab.iter().any(|k| h.contains(k)))
        };

        let request = find(REQUEST_HEADERS);
        let failed = find(FAILED_HEADERS);

        let (test, message) = match (find(TEST_HEADERS), find(MESSAGE_HEADERS)) {
            (Some(test), Some(message)) => (test, message),
            _ => {
                let looks_like = |hints: &[&str]| {
                    headers
                        .iter()
                        .any(|h| hints.iter().any(|k| h.contains(k)))
                };
                if headers.len() == 2 && (looks_like(ASSERTION_HINTS) || looks_like(MESSAGE_HINTS)) {
                    (0, 1)
                } else {
                    return None;
                }
            }
        };

        Some(Self {
            request,
            test,
            message,
            failed,
        })
    }
}

/// Table pass: headed failure sections first, then every table in the document.
pub fn harvest_failure_tables(doc: &Html, harvester: &mut Harvester<'_>) {
    for heading in HEADINGS.all_in_document(doc) {
        if harvester.is_full() {
            return;
        }
        if !FAILURE_SECTION.is_match(&text_of(heading)) {
            continue;
        }

        for node in next_elements(heading) {
            if is_heading(node) {
                break;
            }
            if is_tag(node, "table") {
                harvest_table(node, harvester);
            } else {
                for table in TABLES.all_in(node) {
                    harvest_table(table, harvester);
                }
            }
            if harvester.is_full() {
                break;
            }
        }
    }

    for table in TABLES.all_in_document(doc) {
        if harvester.is_full() {
            return;
        }
        harvest_table(table, harvester);
    }
}

/// Harvests failure rows from one table; tables of any other shape are skipped.
pub fn harvest_table(table: ElementRef<'_>, harvester: &mut Harvester<'_>) {
    if harvester.is_full() {
        return;
    }

    let Some(header) = HeaderRow::read(table) else {
        return;
    };
    if header.is_name_value() {
        return;
    }
    let Some(columns) = ColumnMap::detect(&header.cells) else {
        return;
    };

    let context = infer_request_context(table, SearchLimits::default());

    let rows = BODY_ROWS.all_in(table);
    let skip = usize::from(header.synthetic && !rows.is_empty());

    for row in rows.into_iter().skip(skip) {
        if harvester.is_full() {
            break;
        }

        let cells: Vec<String> = CELLS.all_in(row).into_iter().map(text_of).collect();
        if cells.is_empty() {
            continue;
        }

        // 显式标记为 0 次失败的行
        if let Some(idx) = columns.failed
            && idx < cells.len()
            && count_or(&cells[idx], 0) == 0
        {
            continue;
        }

        let mut request = match columns.request {
            Some(idx) if idx < cells.len() => cells[idx].clone(),
            _ => context
                .request
                .clone()
                .unwrap_or_else(|| UNKNOWN_REQUEST.to_string()),
        };
        if let Some(url) = &context.url
            && !HAS_SCHEME.is_match(&request)
        {
            request = format!("{} — {}", request, url);
        }

        let test = cells
            .get(columns.test)
            .cloned()
            .unwrap_or_else(|| UNKNOWN_ASSERTION.to_string());
        let message = cells
            .get(columns.message)
            .cloned()
            .unwrap_or_else(|| DEFAULT_MESSAGE.to_string());

        if test.is_empty() && message.is_empty() {
            continue;
        }

        harvester.offer(FailureRecord::new(request, test, message));
    }
}
