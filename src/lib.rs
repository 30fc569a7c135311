//! olm 会话持久化服务
//!
//! 每个会话以一个 JSON 文件保存在会话目录中，通过 HTTP 接口创建、列出、读取和保存。

pub mod config;
pub mod logger;
pub mod server;
pub mod session_files;

use std::sync::Arc;

use anyhow::Context;

use crate::config::{install_dir, resolve_against};
use crate::session_files::SessionFileStorage;

/// 启动服务：加载配置 → 初始化日志 → 创建存储 → 运行 HTTP 服务器
pub async fn run() -> anyhow::Result<()> {
    let config = config::load_config().context("加载配置失败")?;
    logger::init_logging(&config.logging);

    let sessions_dir = resolve_against(&install_dir(), &config.storage.sessions_dir);
    let storage = Arc::new(SessionFileStorage::new(sessions_dir));

    server::run_server(&config, storage, server::shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("HTTP 服务器异常退出: {}", e))
}
