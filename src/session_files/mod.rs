//! 会话文件存储模块
//!
//! 以目录作为数据库：每个会话对应会话目录下的一个 JSON 文件，
//! 文件路径即会话的唯一标识。
//!
//! ## 目录结构
//! ```text
//! <安装目录>/sessions/
//! ├── 新建会话.olm         # 默认名称
//! ├── 新建会话_qz.olm      # 名称冲突时追加两位随机后缀
//! ├── Hello_w.olm          # 由第一条用户消息前 7 个字符派生
//! └── ...
//! ```

pub mod error;
pub mod naming;
pub mod storage;
pub mod types;

pub use error::SessionStoreError;
pub use storage::{SessionFileStorage, SESSION_FILE_EXTENSION};
pub use types::*;
