// 系统接口：健康检查、服务信息、依赖检查

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};

use super::AppState;
use crate::config::ToolPaths;
use crate::error::{AppError, AppResult};
use crate::process::ToolRunner;
use crate::utils::DependencyCheck;

const SERVICE_NAME: &str = "voice-separator";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    /// 当前分离模型 ID
    pub model: String,
    pub version: String,
    pub uptime_seconds: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let uptime = Utc::now().signed_duration_since(state.startup_time);

    Json(HealthResponse {
        status: "ok".to_string(),
        service: SERVICE_NAME.to_string(),
        model: state.orchestrator.model_id().to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: uptime.num_seconds().max(0) as u64,
        last_error: state.last_error.read().clone(),
    })
}

/// GET /
pub async fn info() -> Json<Value> {
    Json(json!({
        "name": "Voice Separator API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "从音视频中分离人声（audio-separator / Demucs）",
        "endpoints": {
            "POST /separate-voice": "分离人声 (body: { media: base64, inputFormatHint?: mp4|mkv|wav|..., format?: mp3|wav|ogg|flac })",
            "GET /health": "健康检查",
            "GET /dependencies": "外部工具检查"
        }
    }))
}

/// GET /dependencies
pub async fn dependencies(State(state): State<AppState>) -> AppResult<Json<Vec<DependencyCheck>>> {
    let runner = state.runner.clone();
    let tools = state.tools.clone();
    let checks = tokio::task::spawn_blocking(move || check_dependencies(runner.as_ref(), &tools))
        .await
        .map_err(|e| AppError::Internal(format!("依赖检查异常终止: {}", e)))?;
    Ok(Json(checks))
}

/// 检查 ffmpeg 和 audio-separator 是否可用
pub fn check_dependencies(runner: &dyn ToolRunner, tools: &ToolPaths) -> Vec<DependencyCheck> {
    vec![
        probe(runner, "FFmpeg", &tools.ffmpeg, "-version"),
        probe(runner, "audio-separator", &tools.separator, "--version"),
    ]
}

fn probe(runner: &dyn ToolRunner, name: &str, program: &str, version_flag: &str) -> DependencyCheck {
    match runner.invoke(program, &[version_flag.to_string()]) {
        Ok(output) if output.success() => {
            let version = output
                .stdout
                .lines()
                .chain(output.stderr.lines())
                .map(str::trim)
                .find(|l| !l.is_empty())
                .map(str::to_string);
            DependencyCheck {
                name: name.to_string(),
                available: true,
                version,
                path: Some(program.to_string()),
                message: format!("{} 已安装", name),
            }
        }
        Ok(output) => DependencyCheck {
            name: name.to_string(),
            available: false,
            version: None,
            path: Some(program.to_string()),
            message: format!("{} 无法运行: {}", name, output.diagnostics()),
        },
        Err(e) => DependencyCheck {
            name: name.to_string(),
            available: false,
            version: None,
            path: None,
            message: format!("{} 未安装，请安装并添加到 PATH ({})", name, e),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::test_support::scripted;
    use crate::process::ToolOutput;
    use std::io;

    #[test]
    fn test_probe_reports_version_and_missing() {
        let runner = scripted(|args| {
            if args[0] == "-version" {
                Ok(ToolOutput {
                    exit_code: Some(0),
                    stdout: "ffmpeg version 6.1\nbuilt with gcc".to_string(),
                    stderr: String::new(),
                })
            } else {
                Err(io::Error::new(io::ErrorKind::NotFound, "not found"))
            }
        });
        let tools = ToolPaths {
            ffmpeg: "ffmpeg".to_string(),
            separator: "audio-separator".to_string(),
        };

        let checks = check_dependencies(runner.as_ref(), &tools);
        assert!(checks[0].available);
        assert_eq!(checks[0].version.as_deref(), Some("ffmpeg version 6.1"));
        assert!(!checks[1].available);
        assert!(checks[1].path.is_none());
    }
}
