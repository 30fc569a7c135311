//! 会话文件命名
//!
//! 文件名由第一条用户消息派生，冲突时追加随机后缀并有限次重试。

use rand::Rng;

use super::error::SessionStoreError;

/// 无法从消息派生名称时使用的默认名称
pub const DEFAULT_SESSION_LABEL: &str = "新建会话";

/// 名称前缀最多保留的字符数
pub const PREFIX_MAX_CHARS: usize = 7;

/// 会话 ID 长度
pub const SESSION_ID_LEN: usize = 8;

/// 冲突后缀长度
pub const SUFFIX_LEN: usize = 2;

/// 追加后缀的最大尝试次数
pub const MAX_NAME_ATTEMPTS: usize = 10;

/// 生成指定长度的随机小写字母串
pub fn random_code<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    (0..len)
        .map(|_| char::from(b'a' + rng.gen_range(0..26u8)))
        .collect()
}

/// 生成会话 ID
pub fn generate_session_id() -> String {
    random_code(&mut rand::thread_rng(), SESSION_ID_LEN)
}

/// 常用汉字区间 U+4E00..=U+9FA5
fn is_cjk_ideograph(c: char) -> bool {
    ('\u{4e00}'..='\u{9fa5}').contains(&c)
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || is_cjk_ideograph(c)
}

/// 根据消息内容派生文件名前缀
///
/// 取前 7 个字符，非法字符替换为下划线，去掉首尾下划线；
/// 结果为空时退回默认名称。
pub fn derive_name_prefix(content: Option<&str>) -> String {
    let Some(content) = content else {
        return DEFAULT_SESSION_LABEL.to_string();
    };

    let sanitized: String = content
        .chars()
        .take(PREFIX_MAX_CHARS)
        .map(|c| if is_name_char(c) { c } else { '_' })
        .collect();
    let trimmed = sanitized.trim_matches('_');

    if trimmed.is_empty() {
        DEFAULT_SESSION_LABEL.to_string()
    } else {
        trimmed.to_string()
    }
}

/// 查找未被占用的文件基础名
///
/// 先尝试前缀本身，被占用时尝试 `<prefix>_<xx>`，最多 `MAX_NAME_ATTEMPTS` 次。
/// `is_taken` 只检查调用瞬间的状态，不防止其他进程并发创建同名文件。
pub fn find_unique_name<R, F>(
    prefix: &str,
    rng: &mut R,
    is_taken: F,
) -> Result<String, SessionStoreError>
where
    R: Rng + ?Sized,
    F: Fn(&str) -> bool,
{
    if !is_taken(prefix) {
        return Ok(prefix.to_string());
    }

    for _ in 0..MAX_NAME_ATTEMPTS {
        let candidate = format!("{}_{}", prefix, random_code(rng, SUFFIX_LEN));
        if !is_taken(&candidate) {
            return Ok(candidate);
        }
    }

    Err(SessionStoreError::NameGeneration)
}
