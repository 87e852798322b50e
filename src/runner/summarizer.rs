use crate::Result;
use crate::aggregate::aggregate;
use crate::error::RudigestError;
use crate::html::extract_failures_from_document;
use crate::report::{
    CollectionSummary, DetailSource, ReportLocation, extract_kpis_from_document, failures_from_log,
    find_reports, load_run_log,
};
use crate::runner::context::RunContext;
use crate::runner::types::{ReportFailure, RunOutcome};
use chrono::Utc;
use scraper::Html;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, info_span, warn};

/// Walks the pipeline for every report under the run's root.
#[derive(Debug, Clone)]
pub struct Summarizer {
    ctx: Arc<RunContext>,
}

impl Summarizer {
    pub fn new(ctx: RunContext) -> Self {
        Self { ctx: Arc::new(ctx) }
    }

    pub fn context(&self) -> &RunContext {
        &self.ctx
    }

    /// Located reports, in locator order.
    pub fn locate(&self) -> Vec<ReportLocation> {
        find_reports(&self.ctx.root)
            .into_iter()
            .map(ReportLocation::from_html_path)
            .collect()
    }

    /// KPIs plus failure details for one report.
    ///
    /// The structured log wins when present; otherwise the HTML fallback runs
    /// unless it is switched off.
    pub fn process_report(&self, location: &ReportLocation) -> Result<CollectionSummary> {
        let settings = &self.ctx.settings;
        let bytes = fs::read(&location.html_path).map_err(|e| RudigestError::ReportError {
            path: location.html_path.clone(),
            message: e.to_string(),
        })?;
        // 报告不保证是合法 UTF-8
        let html = String::from_utf8_lossy(&bytes);

        let doc = Html::parse_document(&html);
        let mut summary = extract_kpis_from_document(&doc, &location.collection_name);

        if let Some(log_path) = &location.log_path {
            let log = load_run_log(log_path)?;
            let records = failures_from_log(&log, settings.json_max_rows);
            let failure_count = records.len();
            summary.failures = self.ctx.filter.apply(records);
            summary.detail_source = DetailSource::StructuredLog { failure_count };
        } else if settings.html_fallback {
            summary.failures = extract_failures_from_document(&doc, &self.ctx.filter, settings.html_max_rows);
            summary.source_html_path = Some(source_link_path(location));
            summary.detail_source = DetailSource::HtmlFallback;
        } else {
            summary.source_html_path = Some(source_link_path(location));
            summary.detail_source = DetailSource::Disabled;
        }

        debug!(
            "{}: {} metrics, {} failure rows ({})",
            summary.name,
            summary.metrics.len(),
            summary.failures.len(),
            summary.detail_source.label()
        );
        Ok(summary)
    }

    /// Sequential run over all located reports.
    pub fn summarize(&self) -> RunOutcome {
        let span = info_span!("summarize", run_id = %self.ctx.run_id);
        let _guard = span.enter();

        let locations = self.locate();
        info!("Found {} report(s) under {}", locations.len(), self.ctx.root.display());

        let mut collector = Collector::new(locations.len());
        for location in &locations {
            collector.push(location, self.process_report(location));
        }
        collector.finish()
    }

    /// Same as [`Summarizer::summarize`], one blocking task per report.
    ///
    /// Results are re-assembled in locator order.
    pub async fn summarize_parallel(&self) -> Result<RunOutcome> {
        let span = info_span!("summarize", run_id = %self.ctx.run_id, parallel = true);

        let locations = span.in_scope(|| {
            let locations = self.locate();
            info!("Found {} report(s) under {}", locations.len(), self.ctx.root.display());
            locations
        });

        let handles: Vec<_> = locations
            .into_iter()
            .map(|location| {
                let summarizer = self.clone();
                let span = span.clone();
                tokio::task::spawn_blocking(move || {
                    let result = span.in_scope(|| summarizer.process_report(&location));
                    (location, result)
                })
            })
            .collect();

        let mut collector = Collector::new(handles.len());
        for handle in handles {
            let (location, result) = handle.await?;
            span.in_scope(|| collector.push(&location, result));
        }
        Ok(span.in_scope(|| collector.finish()))
    }
}

/// Absolute report path, so links survive an output file written elsewhere.
fn source_link_path(location: &ReportLocation) -> PathBuf {
    fs::canonicalize(&location.html_path).unwrap_or_else(|_| location.html_path.clone())
}

/// Gathers per-report results, isolating failures.
struct Collector {
    located: usize,
    summaries: Vec<CollectionSummary>,
    errors: Vec<ReportFailure>,
}

impl Collector {
    fn new(located: usize) -> Self {
        Self {
            located,
            summaries: Vec::with_capacity(located),
            errors: Vec::new(),
        }
    }

    fn push(&mut self, location: &ReportLocation, result: Result<CollectionSummary>) {
        match result {
            Ok(summary) => self.summaries.push(summary),
            Err(e) => {
                warn!("跳过报告 {}: {}", location.html_path.display(), e);
                self.errors.push(ReportFailure {
                    path: location.html_path.clone(),
                    message: e.to_string(),
                });
            }
        }
    }

    fn finish(self) -> RunOutcome {
        let report = aggregate(self.summaries, Utc::now());
        info!(
            "Summarized {} collection(s), {} failed test(s), {} skipped report(s)",
            report.collections.len(),
            report.total_failed,
            self.errors.len()
        );
        if !self.errors.is_empty() {
            debug!("skipped: {:?}", self.errors);
        }

        RunOutcome {
            report,
            errors: self.errors,
            located: self.located,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DigestSettings;
    use std::path::Path;
    use tempfile::TempDir;

    const KPI_HTML: &str = r#"<html><body>
        <div class="card-body"><h6 class="text-uppercase">Total Assertions</h6><h1 class="display-1">4</h1></div>
        <div class="card-body"><h6 class="text-uppercase">Total Failed Tests</h6><h1 class="display-1">2</h1></div>
    </body></html>"#;

    const LOG_JSON: &str = r#"{"run":{"executions":[
        {"item":{"name":"Create"},"assertions":[
            {"assertion":"Status code is 201","error":{"message":"expected 400 to equal 201"}},
            {"assertion":"user-agent","error":{"message":"PostmanRuntime/7.36"}}
        ]}
    ]}}"#;

    fn write(root: &Path, rel: &str, body: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, body).unwrap();
    }

    fn summarizer(root: &Path, settings: DigestSettings) -> Summarizer {
        Summarizer::new(RunContext::new(root, settings))
    }

    #[test]
    fn test_structured_log_counts_before_filtering() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "Users/report.html", KPI_HTML);
        write(dir.path(), "Users/report.json", LOG_JSON);

        let outcome = summarizer(dir.path(), DigestSettings::default()).summarize();
        let collection = &outcome.report.collections[0];

        assert_eq!(collection.summary.detail_source, DetailSource::StructuredLog { failure_count: 2 });
        assert_eq!(collection.failed, 2);
        assert_eq!(collection.summary.failures.len(), 1);
        assert_eq!(collection.summary.source_html_path, None);
    }

    #[test]
    fn test_html_fallback_disabled() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "Users/report.html", KPI_HTML);

        let settings = DigestSettings {
            html_fallback: false,
            ..DigestSettings::default()
        };
        let outcome = summarizer(dir.path(), settings).summarize();
        let collection = &outcome.report.collections[0];

        assert_eq!(collection.source(), DetailSource::Disabled);
        assert_eq!(collection.failed, 2);
        assert!(collection.summary.source_html_path.is_some());
    }

    #[test]
    fn test_source_path_is_absolute_for_relative_root() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "unzipped/Users/report.html", KPI_HTML);
        let cwd = std::env::current_dir().unwrap();
        let root = pathdiff(dir.path().join("unzipped"), &cwd);

        let outcome = summarizer(&root, DigestSettings::default()).summarize();
        let source = outcome.report.collections[0].summary.source_html_path.clone().unwrap();
        assert!(source.is_absolute());
        assert!(source.ends_with("Users/report.html"));
    }

    /// `target` expressed relative to `base` through `..` components
    fn pathdiff(target: PathBuf, base: &Path) -> PathBuf {
        let target = fs::canonicalize(target).unwrap();
        let base = fs::canonicalize(base).unwrap();
        let common = target
            .components()
            .zip(base.components())
            .take_while(|(a, b)| a == b)
            .count();
        let mut rel = PathBuf::new();
        for _ in base.components().skip(common) {
            rel.push("..");
        }
        for part in target.components().skip(common) {
            rel.push(part);
        }
        rel
    }

    #[test]
    fn test_non_utf8_report_is_decoded_lossily() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Latin1/report.html");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(
            &path,
            b"<html><body><div class=\"card-body\"><h6 class=\"text-uppercase\">Total Assertions</h6><h1 class=\"display-1\">3</h1></div><p>caf\xE9</p></body></html>",
        )
        .unwrap();

        let outcome = summarizer(dir.path(), DigestSettings::default()).summarize();
        assert!(outcome.errors.is_empty());
        assert_eq!(outcome.report.collections.len(), 1);
        assert_eq!(outcome.report.collections[0].summary.assertions(), "3");
    }

    #[test]
    fn test_bad_log_is_isolated() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "A/report.html", KPI_HTML);
        write(dir.path(), "A/report.json", "{ broken");
        write(dir.path(), "B/report.html", KPI_HTML);

        let outcome = summarizer(dir.path(), DigestSettings::default()).summarize();
        assert_eq!(outcome.located, 2);
        assert_eq!(outcome.processed(), 1);
        assert_eq!(outcome.errors.len(), 1);
        assert!(outcome.errors[0].path.ends_with("A/report.html"));
        assert_eq!(outcome.report.collections[0].name(), "B");
    }
}
