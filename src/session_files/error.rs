//! 会话存储错误类型

/// 会话存储操作失败的原因
///
/// 与传输层无关，HTTP 状态码映射见 `server.rs`。
#[derive(Debug, thiserror::Error)]
pub enum SessionStoreError {
    /// 请求缺少必需字段或字段类型不正确
    #[error("{0}")]
    Validation(String),

    /// 会话文件不存在、不可读或内容无法解析
    ///
    /// 内部原因只用于诊断，不返回给调用方。
    #[error("session does not exist")]
    NotFound { detail: String },

    /// 重试次数用尽仍无法生成唯一文件名
    #[error("could not generate unique filename")]
    NameGeneration,

    /// 底层读写或序列化失败
    #[error("{context}: {detail}")]
    Persistence {
        context: &'static str,
        detail: String,
    },
}

impl SessionStoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn persistence(context: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Persistence {
            context,
            detail: err.to_string(),
        }
    }

    /// 返回给调用方的简短错误信息
    pub fn message(&self) -> String {
        match self {
            Self::Persistence { context, .. } => (*context).to_string(),
            other => other.to_string(),
        }
    }

    /// 可公开的诊断细节
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Persistence { detail, .. } => Some(detail),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_hides_detail() {
        let err = SessionStoreError::NotFound {
            detail: "No such file or directory (os error 2)".to_string(),
        };
        assert_eq!(err.message(), "session does not exist");
        assert!(err.detail().is_none());
    }

    #[test]
    fn test_persistence_keeps_detail() {
        let err = SessionStoreError::persistence("failed to save session", "disk full");
        assert_eq!(err.message(), "failed to save session");
        assert_eq!(err.detail(), Some("disk full"));
        assert_eq!(err.to_string(), "failed to save session: disk full");
    }
}
