use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use rudigest::config::{CliOverrides, ConfigLoader};
use rudigest::render::{print_summary, render_html};
use rudigest::report::find_reports;
use rudigest::runner::{RunContext, RunOutcome, StatusFile, Summarizer, write_report, write_status};

pub type Result<T> = std::result::Result<T, anyhow::Error>;

/// 默认的报告根目录
const DEFAULT_ROOT: &str = "unzipped";

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 汇总目录下所有 Newman 报告，生成 summary.html
    Summarize(SummarizeArgs),

    /// 列出目录下找到的 report.html
    Locate {
        #[arg(default_value = DEFAULT_ROOT)]
        root: PathBuf,
    },
}

#[derive(Args)]
pub struct SummarizeArgs {
    /// 报告根目录
    #[arg(default_value = DEFAULT_ROOT)]
    pub root: PathBuf,

    /// 输出文件（默认 summary.html）
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// 额外写出状态 JSON
    #[arg(long)]
    pub status: Option<PathBuf>,

    /// 配置文件路径（默认查找 rudigest.toml）
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 额外的排除规则（正则，大小写不敏感），可重复
    #[arg(long = "exclude", value_name = "REGEX")]
    pub exclude: Vec<String>,

    /// 没有 report.json 时不解析 HTML 失败详情
    #[arg(long)]
    pub no_html_fallback: bool,

    #[arg(long, value_name = "N")]
    pub max_html_rows: Option<usize>,

    #[arg(long, value_name = "N")]
    pub max_json_rows: Option<usize>,

    /// 并行处理报告
    #[arg(long)]
    pub parallel: bool,

    /// 不打印终端汇总
    #[arg(short, long)]
    pub quiet: bool,
}

impl SummarizeArgs {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            output: self.output.clone(),
            status: self.status.clone(),
            exclude: self.exclude.clone(),
            no_html_fallback: self.no_html_fallback,
            max_html_rows: self.max_html_rows,
            max_json_rows: self.max_json_rows,
        }
    }
}

pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Summarize(args) => summarize(args).await,
        Commands::Locate { root } => {
            locate(&root);
            Ok(())
        }
    }
}

async fn summarize(args: SummarizeArgs) -> Result<()> {
    let config = ConfigLoader::load(args.config.as_deref())?;
    let settings = ConfigLoader::build_settings(&config, &args.overrides())?;

    let output_path = settings.output_path.clone();
    let status_path = settings.status_path.clone();

    let summarizer = Summarizer::new(RunContext::new(&args.root, settings));
    let outcome = if args.parallel {
        summarizer.summarize_parallel().await?
    } else {
        summarizer.summarize()
    };

    write_report(&output_path, &render_html(&outcome.report))?;
    if let Some(path) = &status_path {
        let status = StatusFile::from_report(summarizer.context().run_id, &outcome.report);
        write_status(path, &status)?;
    }

    if !args.quiet {
        print_outcome(&outcome, &output_path);
    }

    Ok(())
}

fn print_outcome(outcome: &RunOutcome, output_path: &Path) {
    println!(
        "\n{} {} report(s)\n",
        "Found".bold(),
        outcome.located
    );
    print_summary(&outcome.report);

    for failure in &outcome.errors {
        println!(
            "  {}: {} ({})",
            "Skipped".yellow(),
            failure.path.display(),
            failure.message
        );
    }

    println!("\n{} {}", "✓".green(), output_path.display().to_string().bold());
}

fn locate(root: &Path) {
    let reports = find_reports(root);
    if reports.is_empty() {
        println!("{}", format!("No reports under {}", root.display()).dimmed());
        return;
    }
    for report in reports {
        println!("{}", report.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summarize_defaults() {
        let cli = Cli::try_parse_from(["rudigest", "summarize"]).unwrap();
        let Commands::Summarize(args) = cli.command else {
            panic!("expected summarize");
        };
        assert_eq!(args.root, PathBuf::from("unzipped"));
        assert!(!args.parallel);
        assert!(args.exclude.is_empty());
    }

    #[test]
    fn test_summarize_flags() {
        let cli = Cli::try_parse_from([
            "rudigest",
            "summarize",
            "reports",
            "-o",
            "out.html",
            "--status",
            "status.json",
            "--exclude",
            "flaky",
            "--exclude",
            "timeout",
            "--no-html-fallback",
            "--max-html-rows",
            "10",
            "--parallel",
            "-q",
        ])
        .unwrap();
        let Commands::Summarize(args) = cli.command else {
            panic!("expected summarize");
        };

        let overrides = args.overrides();
        assert_eq!(args.root, PathBuf::from("reports"));
        assert_eq!(overrides.output, Some(PathBuf::from("out.html")));
        assert_eq!(overrides.status, Some(PathBuf::from("status.json")));
        assert_eq!(overrides.exclude, vec!["flaky", "timeout"]);
        assert!(overrides.no_html_fallback);
        assert_eq!(overrides.max_html_rows, Some(10));
        assert_eq!(overrides.max_json_rows, None);
        assert!(args.parallel && args.quiet);
    }

    #[test]
    fn test_locate_root() {
        let cli = Cli::try_parse_from(["rudigest", "locate", "some/dir"]).unwrap();
        assert!(matches!(cli.command, Commands::Locate { root } if root == Path::new("some/dir")));
    }
}
