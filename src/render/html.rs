use crate::aggregate::{AggregatedReport, CollectionDigest, GroupedFailure};
use crate::report::DetailSource;
use crate::utils::html_escape;
use std::path::Path;
use url::Url;

const STYLE: &str = r#"
      body { font-family: Arial, sans-serif; margin: 2rem; background: #f9f9f9; color: #222; }
      h1, h2, h3 { color: #333; }
      table { width: 100%; border-collapse: collapse; margin-top: 2rem; }
      th, td { padding: 12px; border: 1px solid #ccc; text-align: left; }
      th { background: #333; color: white; }
      tr:nth-child(even) { background: #f2f2f2; }
      .fail { color: #c9372c; font-weight: bold; }
      .card { background: #fff; border: 1px solid #ddd; border-radius: 10px; margin: 20px 0; box-shadow: 0 2px 6px rgba(0,0,0,0.05); }
      .card-header { padding: 14px 18px; border-bottom: 1px solid #eee; display: flex; justify-content: space-between; align-items: center; }
      .card-title { margin: 0; font-size: 18px; font-weight: 600; }
      .badge { padding: 2px 8px; border-radius: 6px; font-size: 12px; font-weight: 600; }
      .badge-fail { background: #fdecea; color: #c9372c; }
      summary { cursor: pointer; }
      .note { padding: 12px 16px; color: #555; }
      code { background: #eee; padding: 2px 4px; border-radius: 3px; }
      .req { margin: 10px 0; border-radius: 8px; border-left: 6px solid #c9372c; background: #fdecea; }
      .req > summary { padding: 10px 12px; font-weight: 600; display: flex; justify-content: space-between; align-items: center; }
      .req > summary .count { font-size: 12px; background: #fff; color: #c9372c; border: 1px solid #f3c0ba; padding: 2px 6px; border-radius: 999px; }
      .checks { margin: 0 0 6px 0; padding: 0 16px 12px 22px; }
      .checks li { margin: 8px 0; }
      .assert { font-weight: 600; }
      .msg { margin: 4px 0 0 0; padding: 6px 8px; background: #fff; border: 1px solid #f3c0ba; border-radius: 6px; white-space: pre-wrap; font-family: monospace; font-size: 12px; }
      .generated { margin-top: 2rem; color: #888; font-size: 12px; }
"#;

const NO_DETAIL_ROWS: &str = "No detailed assertion rows found for failed requests.";
const NO_DETAIL_AFTER_FILTER: &str = "No failed request details after filtering.";
const NO_FAILING_COLLECTIONS: &str = "No collections with failures.";

/// Render the self-contained summary document.
pub fn render_html(report: &AggregatedReport) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html>\n  <head>\n    <meta charset=\"utf-8\" />\n");
    html.push_str("    <title>Newman Test Summary</title>\n");
    html.push_str(&format!("    <style>{}    </style>\n", STYLE));
    html.push_str("  </head>\n  <body>\n");

    html.push_str(&summary_table(report));

    html.push_str("    <h2>Failed requests</h2>\n");
    let blocks: Vec<String> = report.failing().map(collection_block).collect();
    if blocks.is_empty() {
        html.push_str(&format!("    <div class=\"note\">{}</div>\n", NO_FAILING_COLLECTIONS));
    } else {
        for block in blocks {
            html.push_str(&block);
        }
    }

    if report.total_failed == 0 {
        html.push_str("    <p><strong>No failed tests 🎉</strong></p>\n");
    }

    html.push_str(&format!(
        "    <p class=\"generated\">Generated {}</p>\n",
        html_escape(&report.generated_at.format("%Y-%m-%d %H:%M:%S UTC").to_string())
    ));
    html.push_str("  </body>\n</html>\n");
    html
}

fn summary_table(report: &AggregatedReport) -> String {
    let show_skipped = report.has_skipped();
    let mut table = String::new();

    table.push_str("    <h1>Newman Test Results Summary</h1>\n    <table>\n");
    table.push_str("      <tr><th>Collection</th><th>Assertions</th><th>Failed</th>");
    if show_skipped {
        table.push_str("<th>Skipped</th>");
    }
    table.push_str("</tr>\n");

    for collection in &report.collections {
        table.push_str(&format!(
            "      <tr><td>{}</td><td>{}</td><td class=\"fail\">{}</td>",
            html_escape(collection.name()),
            html_escape(collection.summary.assertions()),
            collection.failed
        ));
        if show_skipped {
            table.push_str(&format!("<td>{}</td>", html_escape(collection.summary.skipped())));
        }
        table.push_str("</tr>\n");
    }

    table.push_str("    </table>\n");
    table
}

fn collection_block(collection: &CollectionDigest) -> String {
    let mut block = String::new();

    block.push_str("    <details class=\"card\" open>\n");
    block.push_str(&format!(
        "      <summary class=\"card-header summary\"><h3 class=\"card-title\">Failures — {}</h3><span class=\"badge badge-fail\">{}</span></summary>\n",
        html_escape(collection.name()),
        collection.failed
    ));

    if collection.groups.is_empty() {
        let note = match collection.source() {
            DetailSource::StructuredLog { failure_count } if failure_count > 0 => NO_DETAIL_AFTER_FILTER,
            _ => NO_DETAIL_ROWS,
        };
        block.push_str(&format!("      <div class=\"note\">{}</div>\n", note));
    } else {
        let base = collection.summary.source_html_path.as_deref().map(link_base);
        for group in &collection.groups {
            block.push_str(&request_block(group, base.as_deref()));
        }
    }

    block.push_str(&format!("      <div class=\"note\">{}</div>\n", source_note(collection.source())));
    block.push_str("    </details>\n");
    block
}

fn request_block(group: &GroupedFailure, base: Option<&str>) -> String {
    let mut block = String::new();

    let label = html_escape(&group.request);
    let title = match base {
        Some(base) => {
            let href = format!("{}{}", base, group.anchor.as_deref().unwrap_or_default());
            format!(
                "<a href=\"{}\" target=\"_blank\" rel=\"noopener\">{}</a>",
                html_escape(&href),
                label
            )
        }
        None => label,
    };

    block.push_str("      <details class=\"req\" open>\n");
    block.push_str(&format!(
        "        <summary><span>{}</span><span class=\"count\">{} failing check(s)</span></summary>\n",
        title,
        group.total()
    ));
    block.push_str("        <ul class=\"checks\">\n");
    for entry in &group.entries {
        block.push_str(&format!(
            "          <li><div class=\"assert\">{} <span class=\"count\">×{}</span></div><pre class=\"msg\">{}</pre></li>\n",
            html_escape(&entry.test),
            entry.count,
            html_escape(&entry.message)
        ));
    }
    block.push_str("        </ul>\n      </details>\n");
    block
}

/// Link target for a report path.
///
/// Absolute paths become `file://` URLs; relative ones keep `/` separators.
fn link_base(path: &Path) -> String {
    if path.is_absolute()
        && let Ok(url) = Url::from_file_path(path)
    {
        return url.to_string();
    }
    path.to_string_lossy().replace('\\', "/")
}

fn source_note(source: DetailSource) -> &'static str {
    match source {
        DetailSource::StructuredLog { .. } => "From <code>report.json</code>.",
        DetailSource::HtmlFallback => {
            "Parsed from HTML (no <code>report.json</code> present). Secrets redacted; headers/metadata filtered. Request name/URL inferred from nearby headings."
        }
        DetailSource::Disabled => {
            "No <code>report.json</code> present and HTML parsing is disabled; see the original report."
        }
    }
}
