//! 会话文件存储服务
//!
//! 提供会话文件的创建、列表、读取和保存操作。
//! 目录本身就是唯一的数据来源，不维护索引或内存缓存。

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use super::error::SessionStoreError;
use super::naming::{derive_name_prefix, find_unique_name, generate_session_id};
use super::types::{CreatedSession, SessionRecord};

/// 会话文件扩展名
pub const SESSION_FILE_EXTENSION: &str = "olm";

/// 会话文件存储服务
#[derive(Debug, Clone)]
pub struct SessionFileStorage {
    /// 存储根目录（绝对路径）
    base_dir: PathBuf,
}

impl SessionFileStorage {
    /// 使用指定目录创建存储服务
    ///
    /// 目录创建失败只记录日志，之后的读写操作会返回文件系统错误。
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        let base_dir = base_dir.into();
        let base_dir = std::path::absolute(&base_dir).unwrap_or(base_dir);
        let storage = Self { base_dir };

        match storage.init() {
            Ok(()) => {
                tracing::info!("[SessionFileStorage] 会话存储目录: {:?}", storage.base_dir)
            }
            Err(e) => tracing::error!(
                "[SessionFileStorage] 目录初始化失败: {} (路径: {:?})",
                e,
                storage.base_dir
            ),
        }
        storage
    }

    /// 确保存储目录存在（可重复调用）
    pub fn init(&self) -> Result<(), SessionStoreError> {
        fs::create_dir_all(&self.base_dir)
            .map_err(|e| SessionStoreError::persistence("failed to create sessions directory", e))
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn file_name(base_name: &str) -> String {
        format!("{}.{}", base_name, SESSION_FILE_EXTENSION)
    }

    fn session_path(&self, base_name: &str) -> PathBuf {
        self.base_dir.join(Self::file_name(base_name))
    }

    fn is_session_file(path: &Path) -> bool {
        path.is_file() && path.extension().is_some_and(|ext| ext == SESSION_FILE_EXTENSION)
    }

    fn write_record(path: &Path, record: &SessionRecord) -> Result<(), String> {
        let content = serde_json::to_string_pretty(record).map_err(|e| e.to_string())?;
        fs::write(path, content).map_err(|e| e.to_string())
    }

    // ========================================================================
    // 会话操作
    // ========================================================================

    /// 创建新会话
    ///
    /// 分配 ID、派生唯一文件名并写入磁盘。
    pub fn create_session(
        &self,
        mut record: SessionRecord,
    ) -> Result<CreatedSession, SessionStoreError> {
        if record.created_at().is_none() {
            return Err(SessionStoreError::validation("missing valid timestamp"));
        }

        record.set_id(generate_session_id());

        let prefix = derive_name_prefix(record.first_user_content());
        let session_name = find_unique_name(&prefix, &mut rand::thread_rng(), |name| {
            self.session_path(name).exists()
        })
        .inspect_err(|_| {
            tracing::error!("[SessionFileStorage] 无法为前缀生成唯一文件名: {}", prefix)
        })?;

        let path = self.session_path(&session_name);
        record.set_session_name(session_name);
        record.set_file_path(path.to_string_lossy());

        Self::write_record(&path, &record).map_err(|e| {
            tracing::error!("[SessionFileStorage] 创建会话失败: {} ({:?})", e, path);
            SessionStoreError::persistence("failed to create session", e)
        })?;

        tracing::info!("[SessionFileStorage] 创建会话: {:?}", path);
        Ok(CreatedSession {
            message: format!("session created at {}", path.display()),
            session: record,
        })
    }

    /// 列出所有会话
    ///
    /// 单个文件解析失败时跳过该文件，按 lastUpdated 倒序排列（缺失或非数值视为 0）。
    pub fn list_sessions(&self) -> Result<Vec<SessionRecord>, SessionStoreError> {
        let entries = fs::read_dir(&self.base_dir).map_err(|e| {
            tracing::error!("[SessionFileStorage] 读取会话目录失败: {}", e);
            SessionStoreError::persistence("failed to read sessions", e)
        })?;

        let mut sessions = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if !Self::is_session_file(&path) {
                continue;
            }
            match Self::load_listed(&path) {
                Ok(record) => sessions.push(record),
                Err(e) => tracing::warn!("[SessionFileStorage] 文件解析失败: {:?}: {}", path, e),
            }
        }

        sessions.sort_by(|a, b| {
            b.last_updated_sort_key()
                .total_cmp(&a.last_updated_sort_key())
        });
        Ok(sessions)
    }

    fn load_listed(path: &Path) -> Result<SessionRecord, String> {
        let content = fs::read_to_string(path).map_err(|e| e.to_string())?;
        let mut record: SessionRecord =
            serde_json::from_str(&content).map_err(|e| e.to_string())?;

        if let Some(stem) = path.file_stem() {
            record.ensure_id(stem.to_string_lossy());
        }
        record.set_file_path(path.to_string_lossy());
        Ok(record)
    }

    /// 按路径读取会话
    ///
    /// 兼容旧版本写入的二次编码文件：若解析结果是 JSON 字符串，再解析一次。
    pub fn get_session(&self, file_path: &str) -> Result<Value, SessionStoreError> {
        if file_path.is_empty() {
            return Err(SessionStoreError::validation("missing filePath parameter"));
        }

        let not_found = |detail: String| {
            tracing::debug!("[SessionFileStorage] 读取会话失败: {} ({})", file_path, detail);
            SessionStoreError::NotFound { detail }
        };

        let content = fs::read_to_string(file_path).map_err(|e| not_found(e.to_string()))?;
        let value: Value = serde_json::from_str(&content).map_err(|e| not_found(e.to_string()))?;

        match value {
            Value::String(inner) => {
                serde_json::from_str(&inner).map_err(|e| not_found(e.to_string()))
            }
            other => Ok(other),
        }
    }

    /// 保存会话（整体覆盖写入 filePath）
    ///
    /// 不校验路径是否位于存储目录内，也不要求文件已存在。
    pub fn save_session(&self, record: &SessionRecord) -> Result<(), SessionStoreError> {
        let file_path = record
            .file_path()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| SessionStoreError::validation("missing filePath parameter"))?;

        Self::write_record(Path::new(file_path), record).map_err(|e| {
            tracing::error!("[SessionFileStorage] 保存会话失败: {} ({})", e, file_path);
            SessionStoreError::persistence("failed to save session", e)
        })?;

        tracing::debug!("[SessionFileStorage] 保存会话: {}", file_path);
        Ok(())
    }
}
