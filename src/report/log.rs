use crate::error::{Result, RudigestError};
use crate::report::types::{FailureRecord, UNKNOWN_REQUEST};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::debug;

/// 读取并解析 report.json
pub fn load_run_log(path: &Path) -> Result<Value> {
    let bytes = fs::read(path).map_err(|e| RudigestError::ReportError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let raw = String::from_utf8_lossy(&bytes);

    serde_json::from_str(&raw).map_err(|e| RudigestError::ReportError {
        path: path.to_path_buf(),
        message: format!("无效的 JSON: {}", e),
    })
}

/// Failing assertions from a Newman run log, in log order.
///
/// Only assertions whose `error` carries a `message` count as failures.
/// Repeats are kept; the output is cut at `max_rows`.
pub fn failures_from_log(log: &Value, max_rows: usize) -> Vec<FailureRecord> {
    let Some(executions) = log.pointer("/run/executions").and_then(Value::as_array) else {
        return Vec::new();
    };

    let mut records = Vec::new();
    for execution in executions {
        let request = execution
            .pointer("/item/name")
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())
            .unwrap_or(UNKNOWN_REQUEST);

        let assertions = execution
            .get("assertions")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();

        for assertion in assertions {
            let Some(message) = assertion.pointer("/error/message").filter(|m| !m.is_null()) else {
                continue;
            };

            if records.len() >= max_rows {
                debug!("report.json failure rows capped at {}", max_rows);
                return records;
            }

            let test = assertion
                .get("assertion")
                .and_then(Value::as_str)
                .unwrap_or_default();
            records.push(FailureRecord::new(request, test, value_text(message)));
        }
    }

    records
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
