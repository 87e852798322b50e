pub mod kpi;
pub mod locator;
pub mod log;
pub mod types;

pub use kpi::{extract_kpis, extract_kpis_from_document, failed_from_tables};
pub use locator::{LOG_FILE, REPORT_FILE, ReportLocation, find_reports};
pub use log::{failures_from_log, load_run_log};
pub use types::{
    ASSERTION_KEYS, CollectionSummary, DetailSource, FAILED_KEYS, FailureRecord, ITERATION_KEYS,
    Metrics, SKIPPED_KEYS, UNKNOWN_ASSERTION, UNKNOWN_REQUEST,
};
