//! 会话存储类型定义

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::SessionStoreError;

pub const FIELD_ID: &str = "id";
pub const FIELD_CREATED_AT: &str = "createdAt";
pub const FIELD_LAST_UPDATED: &str = "lastUpdated";
pub const FIELD_SESSION_NAME: &str = "sessionName";
pub const FIELD_FILE_PATH: &str = "filePath";
pub const FIELD_MESSAGES: &str = "messages";

/// 会话记录
///
/// 以原始 JSON 对象保存，已知字段通过类型化访问器读写。
/// 类型不符的字段不会被丢弃，写回磁盘时保持原值。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionRecord {
    fields: Map<String, Value>,
}

impl SessionRecord {
    /// 从请求体 JSON 构造会话记录
    pub fn from_value(value: Value) -> Result<Self, SessionStoreError> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            _ => Err(SessionStoreError::validation(
                "session record must be a JSON object",
            )),
        }
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.fields.insert(key.into(), value);
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    /// 8 位小写字母 ID，创建时由存储分配
    pub fn id(&self) -> Option<&str> {
        self.str_field(FIELD_ID)
    }

    /// 创建时间（Unix 时间戳，毫秒），非整数视为缺失
    pub fn created_at(&self) -> Option<i64> {
        self.fields.get(FIELD_CREATED_AT).and_then(Value::as_i64)
    }

    /// 最后更新时间，仅用于列表排序
    pub fn last_updated(&self) -> Option<i64> {
        self.fields.get(FIELD_LAST_UPDATED).and_then(Value::as_i64)
    }

    /// 会话文件名（不含扩展名）
    pub fn session_name(&self) -> Option<&str> {
        self.str_field(FIELD_SESSION_NAME)
    }

    /// 会话文件的绝对路径
    pub fn file_path(&self) -> Option<&str> {
        self.str_field(FIELD_FILE_PATH)
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.insert(FIELD_ID, Value::String(id.into()));
    }

    pub fn set_last_updated(&mut self, timestamp: i64) {
        self.insert(FIELD_LAST_UPDATED, Value::from(timestamp));
    }

    pub fn set_session_name(&mut self, name: impl Into<String>) {
        self.insert(FIELD_SESSION_NAME, Value::String(name.into()));
    }

    pub fn set_file_path(&mut self, path: impl Into<String>) {
        self.insert(FIELD_FILE_PATH, Value::String(path.into()));
    }

    /// 缺少 id（或为 null）时才补上
    pub fn ensure_id(&mut self, fallback: impl Into<String>) {
        if self.fields.get(FIELD_ID).map_or(true, Value::is_null) {
            self.set_id(fallback);
        }
    }

    /// 排序用的更新时间，任意数值都参与比较，缺失视为 0
    pub fn last_updated_sort_key(&self) -> f64 {
        self.fields
            .get(FIELD_LAST_UPDATED)
            .and_then(Value::as_f64)
            .unwrap_or(0.0)
    }

    /// 消息列表
    pub fn messages(&self) -> Option<&Vec<Value>> {
        self.fields.get(FIELD_MESSAGES).and_then(Value::as_array)
    }

    /// 第一条用户消息的内容
    ///
    /// 按约定 messages[0] 是系统消息，messages[1] 才是用户输入。
    pub fn first_user_content(&self) -> Option<&str> {
        self.messages()?
            .get(1)?
            .get("content")
            .and_then(Value::as_str)
    }
}

/// 创建会话的返回结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedSession {
    pub session: SessionRecord,
    pub message: String,
}

/// 会话列表响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionListResponse {
    pub sessions: Vec<SessionRecord>,
    pub status: String,
}

/// 通用消息响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}
