use crate::filter::NoiseFilter;
use crate::report::FailureRecord;
use std::collections::HashSet;
use tracing::debug;

/// 单次 HTML 解析的收集器：过滤噪声、脱敏、去重，并限制总行数
pub struct Harvester<'f> {
    filter: &'f NoiseFilter,
    max_rows: usize,
    seen: HashSet<String>,
    records: Vec<FailureRecord>,
    truncated: bool,
}

impl<'f> Harvester<'f> {
    pub fn new(filter: &'f NoiseFilter, max_rows: usize) -> Self {
        Self {
            filter,
            max_rows,
            seen: HashSet::new(),
            records: Vec::new(),
            truncated: false,
        }
    }

    /// 是否已达到行数上限
    pub fn is_full(&self) -> bool {
        self.records.len() >= self.max_rows
    }

    /// 提交一条候选记录，返回是否被收录
    pub fn offer(&mut self, candidate: FailureRecord) -> bool {
        if self.is_full() {
            if !self.truncated {
                debug!("HTML failure rows capped at {}", self.max_rows);
                self.truncated = true;
            }
            return false;
        }

        let Some(record) = self.filter.admit(candidate) else {
            return false;
        };

        if !self.seen.insert(record.dedup_key()) {
            return false;
        }

        self.records.push(record);
        true
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<FailureRecord> {
        self.records
    }
}
