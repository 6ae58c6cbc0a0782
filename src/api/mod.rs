// HTTP 接口
//
// 路由：
// - POST /separate-voice  人声分离
// - GET  /health          健康检查
// - GET  /dependencies    外部工具检查
// - GET  /                服务信息

pub mod separate;
pub mod system;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::sync::Arc;

use crate::config::{AppConfig, ToolPaths};
use crate::job::JobOrchestrator;
use crate::process::ToolRunner;

/// 请求体上限（base64 后的音视频可能很大）
pub const MAX_BODY_BYTES: usize = 512 * 1024 * 1024;

/// 各 handler 共享的状态
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<JobOrchestrator>,
    pub runner: Arc<dyn ToolRunner>,
    pub tools: ToolPaths,
    /// 启动时间，用于计算运行时长
    pub startup_time: DateTime<Utc>,
    /// 最近一次任务失败信息，便于排查
    pub last_error: Arc<RwLock<Option<String>>>,
}

impl AppState {
    pub fn new(orchestrator: JobOrchestrator, runner: Arc<dyn ToolRunner>, config: &AppConfig) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            runner,
            tools: config.tools.clone(),
            startup_time: Utc::now(),
            last_error: Arc::new(RwLock::new(None)),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(system::info))
        .route("/health", get(system::health))
        .route("/dependencies", get(system::dependencies))
        .route("/separate-voice", post(separate::separate_voice))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}
