//! YAML 配置加载
//!
//! 配置文件缺失时使用默认值，随后应用环境变量覆盖。

use std::path::{Path, PathBuf};

use super::path_utils::{expand_tilde, install_dir};
use super::types::Config;

/// 指定配置文件路径
pub const ENV_CONFIG_PATH: &str = "OLM_SESSIONS_CONFIG";
/// 覆盖监听地址
pub const ENV_HOST: &str = "OLM_SESSIONS_HOST";
/// 覆盖监听端口
pub const ENV_PORT: &str = "OLM_SESSIONS_PORT";
/// 覆盖会话目录
pub const ENV_SESSIONS_DIR: &str = "OLM_SESSIONS_DIR";

/// 配置错误
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("读取配置文件失败 {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("解析配置文件失败 {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("环境变量 {name} 无效: {value}")]
    InvalidEnv { name: &'static str, value: String },
}

/// 默认配置文件路径
///
/// 优先使用 `OLM_SESSIONS_CONFIG`，否则为安装目录下的 `config.yaml`。
pub fn default_config_path() -> PathBuf {
    match std::env::var(ENV_CONFIG_PATH) {
        Ok(path) if !path.trim().is_empty() => expand_tilde(path.trim()),
        _ => install_dir().join("config.yaml"),
    }
}

/// 从默认位置加载配置并应用环境变量覆盖
pub fn load_config() -> Result<Config, ConfigError> {
    let mut config = load_config_from(&default_config_path())?;
    apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;
    Ok(config)
}

/// 从指定文件加载配置，文件不存在时返回默认配置
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        tracing::debug!("[CONFIG] 配置文件不存在，使用默认配置: {:?}", path);
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if content.trim().is_empty() {
        return Ok(Config::default());
    }

    serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// 应用环境变量覆盖
///
/// `lookup` 便于测试时注入变量，不修改进程环境。
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(host) = lookup(ENV_HOST) {
        config.server.host = host;
    }
    if let Some(port) = lookup(ENV_PORT) {
        config.server.port = port.trim().parse().map_err(|_| ConfigError::InvalidEnv {
            name: ENV_PORT,
            value: port,
        })?;
    }
    if let Some(dir) = lookup(ENV_SESSIONS_DIR) {
        config.storage.sessions_dir = dir;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let config = load_config_from(&temp.path().join("config.yaml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.server.port, 3001);
        assert_eq!(config.storage.sessions_dir, "sessions");
    }

    #[test]
    fn test_parse_partial_yaml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        std::fs::write(
            &path,
            r#"
server:
  port: 4001
cors:
  allowed_origins:
    - http://localhost:5173
logging:
  level: debug
"#,
        )
        .unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 4001);
        assert_eq!(config.cors.allowed_origins, vec!["http://localhost:5173"]);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.storage.sessions_dir, "sessions");
    }

    #[test]
    fn test_invalid_yaml_is_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        std::fs::write(&path, "server: [unclosed").unwrap();
        assert!(matches!(
            load_config_from(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_HOST, "0.0.0.0"),
            (ENV_PORT, "8088"),
            (ENV_SESSIONS_DIR, "/srv/olm/sessions"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        apply_env_overrides(&mut config, |name| env.get(name).map(|v| v.to_string())).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8088);
        assert_eq!(config.storage.sessions_dir, "/srv/olm/sessions");
    }

    #[test]
    fn test_invalid_port_override() {
        let mut config = Config::default();
        let err = apply_env_overrides(&mut config, |name| {
            (name == ENV_PORT).then(|| "not-a-port".to_string())
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { name: ENV_PORT, .. }));
    }
}
