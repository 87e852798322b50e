use crate::error::{Result, RudigestError};
use regex::{Regex, RegexBuilder};
use serde::Deserialize;
use std::path::PathBuf;

/// HTML 回退解析的默认行数上限
pub const DEFAULT_HTML_MAX_ROWS: usize = 5_000;
/// report.json 解析的默认行数上限
pub const DEFAULT_JSON_MAX_ROWS: usize = 20_000;
/// 默认输出文件
pub const DEFAULT_OUTPUT_FILE: &str = "summary.html";
/// 默认排除的断言（不可操作的响应时间断言）
pub const DEFAULT_EXCLUDE_PATTERNS: &[&str] = &["Response time is below threshold"];

/// 完整的配置文件 (rudigest.toml)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct DigestConfig {
    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub extract: ExtractConfig,

    #[serde(default)]
    pub filter: FilterConfig,
}

/// [output] 段
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// 汇总 HTML 的输出路径
    #[serde(default = "default_output_path")]
    pub path: PathBuf,

    /// 可选的状态 JSON 输出路径
    #[serde(default)]
    pub status_path: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            status_path: None,
        }
    }
}

/// [extract] 段
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractConfig {
    /// 没有 report.json 时是否从 HTML 中解析失败详情
    #[serde(default = "default_true")]
    pub html_fallback: bool,

    #[serde(default = "default_html_max_rows")]
    pub html_max_rows: usize,

    #[serde(default = "default_json_max_rows")]
    pub json_max_rows: usize,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            html_fallback: true,
            html_max_rows: DEFAULT_HTML_MAX_ROWS,
            json_max_rows: DEFAULT_JSON_MAX_ROWS,
        }
    }
}

/// [filter] 段
#[derive(Debug, Clone, Deserialize)]
pub struct FilterConfig {
    /// 排除规则（正则，大小写不敏感）
    #[serde(default = "default_exclude_patterns")]
    pub exclude_patterns: Vec<String>,

    /// 额外的 header/元数据名称，等同于内置噪声列表
    #[serde(default)]
    pub extra_noise_headers: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            exclude_patterns: default_exclude_patterns(),
            extra_noise_headers: Vec::new(),
        }
    }
}

fn default_output_path() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_FILE)
}

fn default_true() -> bool {
    true
}

fn default_html_max_rows() -> usize {
    DEFAULT_HTML_MAX_ROWS
}

fn default_json_max_rows() -> usize {
    DEFAULT_JSON_MAX_ROWS
}

fn default_exclude_patterns() -> Vec<String> {
    DEFAULT_EXCLUDE_PATTERNS
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// 运行期设置：配置文件 + CLI 覆盖合并后的结果，正则已编译
#[derive(Debug, Clone)]
pub struct DigestSettings {
    pub output_path: PathBuf,
    pub status_path: Option<PathBuf>,
    pub html_fallback: bool,
    pub html_max_rows: usize,
    pub json_max_rows: usize,
    pub exclude_patterns: Vec<Regex>,
    pub extra_noise_headers: Vec<String>,
}

impl DigestSettings {
    /// 从配置构建设置，编译排除规则
    pub fn from_config(config: &DigestConfig) -> Result<Self> {
        let exclude_patterns = config
            .filter
            .exclude_patterns
            .iter()
            .map(|p| compile_pattern(p))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            output_path: config.output.path.clone(),
            status_path: config.output.status_path.clone(),
            html_fallback: config.extract.html_fallback,
            html_max_rows: config.extract.html_max_rows,
            json_max_rows: config.extract.json_max_rows,
            exclude_patterns,
            extra_noise_headers: config
                .filter
                .extra_noise_headers
                .iter()
                .map(|h| h.trim().to_lowercase())
                .collect(),
        })
    }

    /// 追加一条排除规则
    pub fn add_exclude_pattern(&mut self, pattern: &str) -> Result<()> {
        self.exclude_patterns.push(compile_pattern(pattern)?);
        Ok(())
    }
}

impl Default for DigestSettings {
    fn default() -> Self {
        Self {
            output_path: default_output_path(),
            status_path: None,
            html_fallback: true,
            html_max_rows: DEFAULT_HTML_MAX_ROWS,
            json_max_rows: DEFAULT_JSON_MAX_ROWS,
            exclude_patterns: DEFAULT_EXCLUDE_PATTERNS
                .iter()
                .filter_map(|p| compile_pattern(p).ok())
                .collect(),
            extra_noise_headers: Vec::new(),
        }
    }
}

fn compile_pattern(pattern: &str) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| RudigestError::ConfigError(format!("exclude pattern '{}': {}", pattern, e)))
}
