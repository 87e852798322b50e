use crate::config::DigestSettings;
use crate::filter::NoiseFilter;
use std::path::PathBuf;
use uuid::Uuid;

/// 单次运行的上下文，所有报告共享只读访问
#[derive(Debug, Clone)]
pub struct RunContext {
    pub run_id: Uuid,
    /// 报告根目录
    pub root: PathBuf,
    pub settings: DigestSettings,
    pub filter: NoiseFilter,
}

impl RunContext {
    pub fn new(root: impl Into<PathBuf>, settings: DigestSettings) -> Self {
        let filter = NoiseFilter::from_settings(&settings);
        Self {
            run_id: Uuid::new_v4(),
            root: root.into(),
            settings,
            filter,
        }
    }
}
