//! 配置管理模块
//!
//! 提供 YAML 配置文件加载、环境变量覆盖和路径解析。

mod path_utils;
mod types;
mod yaml;

pub use path_utils::{expand_tilde, install_dir, resolve_against};
pub use types::{Config, CorsConfig, LoggingConfig, ServerConfig, StorageConfig};
pub use yaml::{
    apply_env_overrides, default_config_path, load_config, load_config_from, ConfigError,
    ENV_CONFIG_PATH, ENV_HOST, ENV_PORT, ENV_SESSIONS_DIR,
};
