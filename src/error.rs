use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RudigestError {
    #[error("IO 错误: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON 解析错误: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("配置错误: {0}")]
    ConfigError(String),

    #[error("报告处理失败 {}: {message}", path.display())]
    ReportError { path: PathBuf, message: String },

    #[error("后台任务失败: {0}")]
    TaskError(String),

    #[error("{0}")]
    Other(String),
}

// Add conversion from anyhow::Error
impl From<anyhow::Error> for RudigestError {
    fn from(err: anyhow::Error) -> Self {
        RudigestError::Other(err.to_string())
    }
}

impl From<toml::de::Error> for RudigestError {
    fn from(err: toml::de::Error) -> Self {
        RudigestError::ConfigError(err.to_string())
    }
}

impl From<tokio::task::JoinError> for RudigestError {
    fn from(err: tokio::task::JoinError) -> Self {
        RudigestError::TaskError(err.to_string())
    }
}

/// Result type for rudigest crate
pub type Result<T> = std::result::Result<T, RudigestError>;
