use std::collections::HashMap;
use std::path::PathBuf;

use crate::utils::{clean_key, parse_count};

/// 失败数指标的候选键（按优先级）
pub const FAILED_KEYS: &[&str] = &["total_failed_tests", "failed_tests", "failed"];
/// 跳过数指标的候选键
pub const SKIPPED_KEYS: &[&str] = &["total_skipped_tests", "skipped_tests", "skipped"];
/// 断言总数指标的键
pub const ASSERTION_KEYS: &[&str] = &["total_assertions"];
/// 迭代次数指标的键
pub const ITERATION_KEYS: &[&str] = &["total_iterations"];

pub const UNKNOWN_REQUEST: &str = "Unknown request";
pub const UNKNOWN_ASSERTION: &str = "Unknown assertion";

/// 单条失败断言记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureRecord {
    /// 发起请求的描述（显式列、上下文推断或 "Unknown request"）
    pub request: String,

    /// 断言名称
    pub test: String,

    /// 失败消息
    pub message: String,

    /// 原始 HTML 报告中的锚点（如 "#fails-3"）
    pub anchor: Option<String>,
}

impl FailureRecord {
    pub fn new(
        request: impl Into<String>,
        test: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            request: request.into(),
            test: test.into(),
            message: message.into(),
            anchor: None,
        }
    }

    pub fn with_anchor(mut self, anchor: Option<String>) -> Self {
        self.anchor = anchor;
        self
    }

    /// 去重标识：request||test||message
    pub fn dedup_key(&self) -> String {
        format!("{}||{}||{}", self.request, self.test, self.message)
    }
}

/// KPI 指标表，键已规范化
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metrics {
    values: HashMap<String, String>,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// 以原始标签插入（自动规范化键）；空标签被忽略
    pub fn insert_label(&mut self, label: &str, value: impl Into<String>) {
        let key = clean_key(label);
        if !key.is_empty() {
            self.values.insert(key, value.into());
        }
    }

    /// 以已规范化的键插入
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(|s| s.as_str())
    }

    /// 返回第一个存在且非空的指标值
    pub fn first(&self, keys: &[&str]) -> Option<&str> {
        keys.iter()
            .filter_map(|k| self.get(k))
            .find(|v| !v.is_empty())
    }

    /// 第一个存在的指标，按数字解释；没有数字时视为 0
    pub fn first_count(&self, keys: &[&str]) -> Option<i64> {
        self.first(keys).map(|v| parse_count(v).unwrap_or(0))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// 失败详情的来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailSource {
    /// 来自 report.json；failure_count 为日志中的失败断言数（截断后、过滤前）
    StructuredLog { failure_count: usize },
    /// 从 HTML 报告启发式解析
    HtmlFallback,
    /// HTML 回退被配置关闭
    Disabled,
}

impl DetailSource {
    pub fn label(&self) -> &'static str {
        match self {
            DetailSource::StructuredLog { .. } => "report.json",
            DetailSource::HtmlFallback => "html",
            DetailSource::Disabled => "none",
        }
    }
}

/// 单个 collection 的汇总
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionSummary {
    /// collection 名称（报告所在目录名）
    pub name: String,

    /// KPI 指标
    pub metrics: Metrics,

    /// 已过滤、已脱敏的失败记录
    pub failures: Vec<FailureRecord>,

    /// 原始 report.html 路径（用于生成链接）
    pub source_html_path: Option<PathBuf>,

    /// 失败详情来源
    pub detail_source: DetailSource,
}

impl CollectionSummary {
    pub fn new(name: impl Into<String>, metrics: Metrics) -> Self {
        Self {
            name: name.into(),
            metrics,
            failures: Vec::new(),
            source_html_path: None,
            detail_source: DetailSource::HtmlFallback,
        }
    }

    pub fn assertions(&self) -> &str {
        self.metrics.first(ASSERTION_KEYS).unwrap_or("-")
    }

    pub fn iterations(&self) -> &str {
        self.metrics.first(ITERATION_KEYS).unwrap_or("-")
    }

    pub fn skipped(&self) -> &str {
        self.metrics.first(SKIPPED_KEYS).unwrap_or("0")
    }

    pub fn skipped_count(&self) -> i64 {
        self.metrics.first_count(SKIPPED_KEYS).unwrap_or(0)
    }

    /// 报告中显式给出的失败数
    pub fn failed_metric(&self) -> Option<i64> {
        self.metrics.first_count(FAILED_KEYS)
    }
}
