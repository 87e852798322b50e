use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Newman htmlextra 报告文件名
pub const REPORT_FILE: &str = "report.html";
/// 同目录下的结构化运行日志
pub const LOG_FILE: &str = "report.json";

/// 递归查找 root 下所有 report.html（文件名大小写不敏感）
///
/// 目录项按字典序访问，结果顺序稳定。root 不存在时返回空列表；
/// 无法读取的子目录记录警告后跳过。不跟随目录符号链接。
pub fn find_reports(root: &Path) -> Vec<PathBuf> {
    let mut found = Vec::new();
    if !root.is_dir() {
        debug!("report root {} does not exist", root.display());
        return found;
    }
    walk(root, &mut found);
    found
}

fn walk(dir: &Path, found: &mut Vec<PathBuf>) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("跳过无法读取的目录 {}: {}", dir.display(), e);
            return;
        }
    };

    let mut entries: Vec<_> = entries.flatten().collect();
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let path = entry.path();
        let Ok(file_type) = entry.file_type() else {
            continue;
        };

        if file_type.is_dir() {
            walk(&path, found);
        } else if is_report_file(&path) && path.is_file() {
            found.push(path);
        }
    }
}

fn is_report_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.eq_ignore_ascii_case(REPORT_FILE))
}

/// 一个已定位的报告及其所在目录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLocation {
    pub html_path: PathBuf,
    pub dir: PathBuf,
    /// 同目录下的 report.json（存在时）
    pub log_path: Option<PathBuf>,
    /// collection 名称，即报告目录名
    pub collection_name: String,
}

impl ReportLocation {
    pub fn from_html_path(html_path: PathBuf) -> Self {
        let dir = html_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        let collection_name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| ".".to_string());

        let log_path = Some(dir.join(LOG_FILE)).filter(|p| p.is_file());

        Self {
            html_path,
            dir,
            log_path,
            collection_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "<html></html>").unwrap();
    }

    #[test]
    fn test_find_reports_recursive_and_sorted() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        touch(&root.join("b/report.html"));
        touch(&root.join("a/nested/deep/REPORT.HTML"));
        touch(&root.join("a/other.html"));
        touch(&root.join("c/report.json"));

        let found = find_reports(root);
        assert_eq!(found.len(), 2);
        assert!(found[0].ends_with("a/nested/deep/REPORT.HTML"));
        assert!(found[1].ends_with("b/report.html"));
    }

    #[test]
    fn test_missing_root_is_empty() {
        let dir = TempDir::new().unwrap();
        assert!(find_reports(&dir.path().join("nope")).is_empty());
    }

    #[test]
    fn test_location_picks_up_log() {
        let dir = TempDir::new().unwrap();
        let html = dir.path().join("Orders/report.html");
        touch(&html);

        let location = ReportLocation::from_html_path(html.clone());
        assert_eq!(location.collection_name, "Orders");
        assert_eq!(location.log_path, None);

        fs::write(dir.path().join("Orders/report.json"), "{}").unwrap();
        let location = ReportLocation::from_html_path(html);
        assert!(location.log_path.unwrap().ends_with("Orders/report.json"));
    }
}
