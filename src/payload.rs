// 媒体数据编解码（base64）

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::{AppError, AppResult};

/// 解码请求中的 base64 媒体数据
///
/// 允许按行折叠的 base64（如 76 列 MIME 输出），空白字符在解码前全部去掉。
/// 空字符串和解码后为空的数据都视为请求无效。
pub fn decode_media(encoded: &str) -> AppResult<Vec<u8>> {
    let compact: String = encoded
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    if compact.is_empty() {
        return Err(AppError::ValidationFailed("media 字段为空".to_string()));
    }

    let bytes = STANDARD
        .decode(&compact)
        .map_err(|e| AppError::ValidationFailed(format!("media 不是有效的 base64: {}", e)))?;

    if bytes.is_empty() {
        return Err(AppError::ValidationFailed("media 解码后为空".to_string()));
    }
    Ok(bytes)
}

pub fn encode_media(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}
