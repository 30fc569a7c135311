//! 路径工具
//!
//! 处理 `~` 展开以及相对路径解析。

use std::path::{Path, PathBuf};

/// 展开路径开头的 `~`
pub fn expand_tilde<P: AsRef<Path>>(path: P) -> PathBuf {
    let path = path.as_ref();
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match dirs::home_dir() {
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}

/// 服务安装目录（可执行文件所在目录）
///
/// 无法获取时退回当前工作目录。
pub fn install_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// 将相对路径解析到 `base` 下，绝对路径和 `~` 路径保持不变
pub fn resolve_against<P: AsRef<Path>>(base: &Path, path: P) -> PathBuf {
    let expanded = expand_tilde(path);
    if expanded.is_absolute() {
        expanded
    } else {
        base.join(expanded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_tilde() {
        let home = dirs::home_dir().unwrap();
        assert_eq!(expand_tilde("~/.olm/sessions"), home.join(".olm/sessions"));
        assert_eq!(expand_tilde("/var/lib/olm"), PathBuf::from("/var/lib/olm"));
        assert_eq!(expand_tilde("sessions"), PathBuf::from("sessions"));
    }

    #[test]
    fn test_resolve_against_install_dir() {
        let base = Path::new("/opt/olm");
        assert_eq!(
            resolve_against(base, "sessions"),
            PathBuf::from("/opt/olm/sessions")
        );
        assert_eq!(
            resolve_against(base, "/data/sessions"),
            PathBuf::from("/data/sessions")
        );
    }
}
