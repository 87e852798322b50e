/// 按请求分组失败记录并计算归一化失败数
pub mod aggregator;
pub mod types;

pub use aggregator::{EMPTY_MESSAGE, aggregate, group_failures, normalized_failed};
pub use types::{AggregatedReport, CollectionDigest, GroupedEntry, GroupedFailure};
