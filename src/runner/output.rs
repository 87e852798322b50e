use crate::Result;
use crate::error::RudigestError;
use crate::runner::types::StatusFile;
use fs2::FileExt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use tracing::info;

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent).map_err(RudigestError::IoError)?;
    }
    Ok(())
}

/// 在排他锁下整体写入文件
fn write_locked(path: &Path, contents: &[u8]) -> Result<()> {
    ensure_parent(path)?;

    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(false)
        .open(path)
        .map_err(RudigestError::IoError)?;

    file.lock_exclusive().map_err(RudigestError::IoError)?;

    // 持锁后再截断，避免并发写入者读到半截文件
    file.set_len(0).map_err(RudigestError::IoError)?;
    file.write_all(contents).map_err(RudigestError::IoError)?;
    file.flush().map_err(RudigestError::IoError)?;

    Ok(())
}

/// 写入汇总 HTML
pub fn write_report(path: &Path, html: &str) -> Result<()> {
    write_locked(path, html.as_bytes())?;
    info!("Wrote summary to {}", path.display());
    Ok(())
}

/// 写入状态 JSON
pub fn write_status(path: &Path, status: &StatusFile) -> Result<()> {
    let json = serde_json::to_string_pretty(status)?;
    write_locked(path, json.as_bytes())?;
    info!("Wrote status to {}", path.display());
    Ok(())
}
