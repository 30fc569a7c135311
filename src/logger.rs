//! 日志初始化
//!
//! 使用 tracing-subscriber 输出到标准错误，`RUST_LOG` 优先于配置文件。

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// 根据配置构建日志过滤器
pub fn build_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// 初始化全局日志（重复调用无副作用）
pub fn init_logging(config: &LoggingConfig) {
    let result = tracing_subscriber::fmt()
        .with_env_filter(build_filter(config))
        .with_writer(std::io::stderr)
        .try_init();

    if result.is_err() {
        tracing::debug!("[LOGGER] 日志系统已初始化，跳过");
    }
}
