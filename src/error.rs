// 错误处理模块

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::path::PathBuf;
use thiserror::Error;
use tracing::error;

use crate::utils::FailureResponse;

/// 分离结果定位错误
#[derive(Error, Debug)]
pub enum ResolutionError {
    #[error("输出目录中未找到 {target} 文件: {}", .dir.display())]
    NotFound { dir: PathBuf, target: String },
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("请求无效: {0}")]
    ValidationFailed(String),

    #[error("依赖缺失: {0}")]
    ToolUnavailable(String),

    #[error("FFmpeg 失败: {0}")]
    DecodeFailed(String),

    #[error("人声分离失败: {0}")]
    SeparationFailed(String),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error("工作目录错误: {0}")]
    Workspace(String),

    #[error("配置错误: {0}")]
    Config(String),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON 解析错误: {0}")]
    Json(#[from] serde_json::Error),

    #[error("内部错误: {0}")]
    Internal(String),
}

impl AppError {
    /// 客户端输入错误返回 4xx，外部依赖缺失返回 503，其余处理错误返回 500
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationFailed(_) => StatusCode::BAD_REQUEST,
            AppError::ToolUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("[HTTP] 请求处理失败 ({}): {}", status, self);
        }
        (status, Json(FailureResponse::new(self.to_string()))).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_map_to_4xx() {
        let err = AppError::ValidationFailed("media 字段缺失".into());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_processing_errors_map_to_5xx() {
        let not_found = AppError::from(ResolutionError::NotFound {
            dir: PathBuf::from("/tmp/out"),
            target: "vocals".into(),
        });
        assert_eq!(not_found.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            AppError::DecodeFailed("exit 1".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::ToolUnavailable("ffmpeg".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_diagnostic_text_kept_verbatim() {
        let stderr = "Invalid data found when processing input\nline 2";
        let err = AppError::SeparationFailed(stderr.to_string());
        assert!(err.to_string().contains(stderr));
    }
}
