use crate::aggregate::AggregatedReport;
use colored::Colorize;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, Table};

/// 构建终端汇总表
pub fn summary_table(report: &AggregatedReport) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Collection", "Assertions", "Failed", "Details"]);

    for collection in &report.collections {
        let failed_color = if collection.failed > 0 {
            Color::Red
        } else {
            Color::Green
        };

        table.add_row(vec![
            Cell::new(collection.name()),
            Cell::new(collection.summary.assertions()),
            Cell::new(collection.failed).fg(failed_color),
            Cell::new(collection.source().label()).add_attribute(Attribute::Dim),
        ]);
    }

    table
}

/// 打印汇总表和总计行
pub fn print_summary(report: &AggregatedReport) {
    if !report.collections.is_empty() {
        println!("{}", summary_table(report));
    }

    let total = if report.total_failed == 0 {
        "0 failed".green()
    } else {
        format!("{} failed", report.total_failed).red().bold()
    };

    println!(
        "  {}: {} collection(s), {}",
        "Summary".bold(),
        report.collections.len(),
        total
    );
}
