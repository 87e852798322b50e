use crate::config::types::{DigestConfig, DigestSettings};
use crate::error::{Result, RudigestError};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// 配置文件加载器
pub struct ConfigLoader;

/// CLI 传入的覆盖项（优先级高于配置文件）
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub output: Option<PathBuf>,
    pub status: Option<PathBuf>,
    pub exclude: Vec<String>,
    pub no_html_fallback: bool,
    pub max_html_rows: Option<usize>,
    pub max_json_rows: Option<usize>,
}

impl ConfigLoader {
    /// 配置文件名
    const CONFIG_FILE: &'static str = "rudigest.toml";

    /// 从指定路径加载配置文件
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<DigestConfig> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            RudigestError::ConfigError(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        Ok(toml::from_str(&content)?)
    }

    /// 查找并加载配置文件
    /// 查找顺序：
    /// 1. 当前目录及其父目录
    /// 2. 用户配置目录 ~/.config/rudigest/
    ///
    /// 找到但无法解析的配置文件是错误，不会静默回退到默认值
    pub fn find_and_load() -> Result<Option<DigestConfig>> {
        if let Ok(current) = std::env::current_dir()
            && let Some(config) = Self::find_upwards(&current)?
        {
            return Ok(Some(config));
        }

        Self::try_load_from_user_dir()
    }

    /// 加载配置：显式路径必须存在且可解析，否则按查找顺序尝试，最后使用默认值
    pub fn load(explicit: Option<&Path>) -> Result<DigestConfig> {
        match explicit {
            Some(path) => Self::load_from_path(path),
            None => Ok(Self::find_and_load()?.unwrap_or_default()),
        }
    }

    /// 从 start 开始逐级向上查找 rudigest.toml
    pub fn find_upwards(start: &Path) -> Result<Option<DigestConfig>> {
        let mut current = start.to_path_buf();

        loop {
            let config_path = current.join(Self::CONFIG_FILE);
            if config_path.exists() {
                debug!("Using config {}", config_path.display());
                return Self::load_from_path(&config_path).map(Some);
            }

            if !current.pop() {
                break;
            }
        }

        Ok(None)
    }

    fn try_load_from_user_dir() -> Result<Option<DigestConfig>> {
        let Some(home) = dirs::home_dir() else {
            return Ok(None);
        };
        let config_path = home
            .join(".config")
            .join("rudigest")
            .join(Self::CONFIG_FILE);

        if config_path.exists() {
            debug!("Using config {}", config_path.display());
            Self::load_from_path(&config_path).map(Some)
        } else {
            Ok(None)
        }
    }

    /// 构建运行期设置
    /// 1. 配置文件中的值
    /// 2. CLI 覆盖（优先级最高，排除规则为追加）
    pub fn build_settings(config: &DigestConfig, cli: &CliOverrides) -> Result<DigestSettings> {
        let mut settings = DigestSettings::from_config(config)?;

        if let Some(output) = &cli.output {
            settings.output_path = output.clone();
        }
        if let Some(status) = &cli.status {
            settings.status_path = Some(status.clone());
        }
        if cli.no_html_fallback {
            settings.html_fallback = false;
        }
        if let Some(rows) = cli.max_html_rows {
            settings.html_max_rows = rows;
        }
        if let Some(rows) = cli.max_json_rows {
            settings.json_max_rows = rows;
        }
        for pattern in &cli.exclude {
            settings.add_exclude_pattern(pattern)?;
        }

        Ok(settings)
    }
}
