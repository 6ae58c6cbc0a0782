// voice-separator - 人声分离服务
//
// 接收 base64 音视频，ffmpeg 提取音轨，audio-separator 分离人声，返回 base64 人声轨。

pub mod api;
pub mod audio;
pub mod config;
pub mod error;
pub mod job;
pub mod logging;
pub mod models;
pub mod payload;
pub mod process;
pub mod utils;
pub mod workspace;

pub use crate::api::{build_router, AppState};
pub use crate::error::{AppError, AppResult};
