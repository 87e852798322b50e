use crate::aggregate::AggregatedReport;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// 单个报告处理失败（不影响其他报告）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportFailure {
    pub path: PathBuf,
    pub message: String,
}

/// 一次汇总运行的结果
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub report: AggregatedReport,

    /// 被跳过的报告及原因
    pub errors: Vec<ReportFailure>,

    /// 定位到的报告数量
    pub located: usize,
}

impl RunOutcome {
    pub fn processed(&self) -> usize {
        self.report.collections.len()
    }
}

/// 状态文件：供上游状态/邮件工具读取
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusFile {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub total_failed: usize,
    pub collections: Vec<CollectionStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionStatus {
    pub name: String,
    pub failed: usize,
    pub assertions: String,
    /// "report.json" | "html" | "none"
    pub source: String,
}

impl StatusFile {
    pub fn from_report(run_id: Uuid, report: &AggregatedReport) -> Self {
        Self {
            run_id,
            generated_at: report.generated_at,
            total_failed: report.total_failed,
            collections: report
                .collections
                .iter()
                .map(|c| CollectionStatus {
                    name: c.name().to_string(),
                    failed: c.failed,
                    assertions: c.summary.assertions().to_string(),
                    source: c.source().label().to_string(),
                })
                .collect(),
        }
    }
}
