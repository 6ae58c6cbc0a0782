// 人声分离接口

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use tracing::info;

use super::AppState;
use crate::error::{AppError, AppResult};
use crate::utils::{SeparateRequest, SeparateResponse};

/// POST /separate-voice
///
/// 任务在阻塞线程中执行；客户端断开不会终止正在运行的外部进程。
pub async fn separate_voice(
    State(state): State<AppState>,
    payload: Result<Json<SeparateRequest>, JsonRejection>,
) -> AppResult<Json<SeparateResponse>> {
    let Json(request) = payload.map_err(|e| AppError::ValidationFailed(e.body_text()))?;
    info!("[HTTP] POST /separate-voice");

    let orchestrator = state.orchestrator.clone();
    let outcome = tokio::task::spawn_blocking(move || orchestrator.handle(&request))
        .await
        .map_err(|e| AppError::Internal(format!("任务异常终止: {}", e)))
        .and_then(|result| result);

    match outcome {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            if e.status_code().is_server_error() {
                *state.last_error.write() = Some(e.to_string());
            }
            Err(e)
        }
    }
}
