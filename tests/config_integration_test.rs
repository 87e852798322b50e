use rudigest::config::{CliOverrides, ConfigLoader};
use rudigest::runner::{RunContext, Summarizer};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const FAILURES_TABLE: &str = r#"<html><body>
    <table>
        <thead><tr><th>Request</th><th>Assertion</th><th>Message</th></tr></thead>
        <tbody>
            <tr><td>GET /slow</td><td>Response time is below threshold</td><td>took 900ms</td></tr>
            <tr><td>GET /flaky</td><td>Eventually consistent</td><td>stale read</td></tr>
            <tr><td>GET /users</td><td>X-Trace-Id</td><td>abc</td></tr>
            <tr><td>GET /users</td><td>Status code is 200</td><td>got 500</td></tr>
        </tbody>
    </table>
</body></html>"#;

fn write(root: &Path, rel: &str, body: &str) -> PathBuf {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, body).unwrap();
    path
}

/// 配置文件中的排除规则和额外噪声头作用于 HTML 回退解析
#[test]
fn test_config_file_drives_filtering() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = write(
        temp_dir.path(),
        "rudigest.toml",
        r#"
[output]
path = "reports/digest.html"

[filter]
exclude_patterns = ["Response time is below threshold", "eventually"]
extra_noise_headers = ["X-Trace-Id"]
"#,
    );
    let root = temp_dir.path().join("unzipped");
    write(&root, "Api/report.html", FAILURES_TABLE);

    let config = ConfigLoader::load(Some(&config_path)).unwrap();
    let settings = ConfigLoader::build_settings(&config, &CliOverrides::default()).unwrap();
    assert_eq!(settings.output_path, PathBuf::from("reports/digest.html"));

    let outcome = Summarizer::new(RunContext::new(&root, settings)).summarize();
    let failures = &outcome.report.collections[0].summary.failures;

    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].test, "Status code is 200");
}

/// CLI 覆盖优先于配置文件，排除规则为追加
#[test]
fn test_cli_overrides_config() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = write(
        temp_dir.path(),
        "rudigest.toml",
        r#"
[extract]
html_max_rows = 100
"#,
    );
    let root = temp_dir.path().join("unzipped");
    write(&root, "Api/report.html", FAILURES_TABLE);

    let config = ConfigLoader::load(Some(&config_path)).unwrap();
    let overrides = CliOverrides {
        exclude: vec!["status code".to_string()],
        max_html_rows: Some(1),
        ..CliOverrides::default()
    };
    let settings = ConfigLoader::build_settings(&config, &overrides).unwrap();
    assert_eq!(settings.html_max_rows, 1);
    assert_eq!(settings.exclude_patterns.len(), 2);

    let outcome = Summarizer::new(RunContext::new(&root, settings)).summarize();
    let failures = &outcome.report.collections[0].summary.failures;

    // 默认规则仍然生效，上限为 1 行
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].request, "GET /flaky");
}

#[test]
fn test_invalid_config_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = write(temp_dir.path(), "rudigest.toml", "[extract]\nhtml_max_rows = \"many\"\n");
    assert!(ConfigLoader::load(Some(&config_path)).is_err());

    let config_path = write(temp_dir.path(), "bad-pattern.toml", "[filter]\nexclude_patterns = [\"(\"]\n");
    let config = ConfigLoader::load(Some(&config_path)).unwrap();
    assert!(ConfigLoader::build_settings(&config, &CliOverrides::default()).is_err());

    assert!(ConfigLoader::load(Some(&temp_dir.path().join("missing.toml"))).is_err());
}
