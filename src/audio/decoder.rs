// 音轨提取 - 使用 ffmpeg

use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};

use crate::error::{AppError, AppResult};
use crate::process::{tool_unavailable, ToolRunner};

/// 输出 PCM 参数：44.1kHz, 16-bit, 立体声
pub const PCM_CODEC: &str = "pcm_s16le";
pub const SAMPLE_RATE: u32 = 44_100;
pub const CHANNELS: u32 = 2;

pub struct MediaDecoder {
    ffmpeg_path: String,
    runner: Arc<dyn ToolRunner>,
}

impl MediaDecoder {
    pub fn new(ffmpeg_path: impl Into<String>, runner: Arc<dyn ToolRunner>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            runner,
        }
    }

    /// 提取音轨并转为标准 PCM wav
    ///
    /// 容器格式识别完全交给 ffmpeg，这里只检查输出文件存在且非空。
    pub fn decode(&self, input_path: &Path, output_path: &Path) -> AppResult<()> {
        info!("[FFMPEG] 提取音频: {} -> {}", input_path.display(), output_path.display());

        if !is_non_empty_file(input_path) {
            error!("[FFMPEG] 输入文件不存在或为空: {}", input_path.display());
            return Err(AppError::DecodeFailed(format!(
                "输入文件不存在或为空: {}",
                input_path.display()
            )));
        }

        let args = decode_args(input_path, output_path);
        let output = self
            .runner
            .invoke(&self.ffmpeg_path, &args)
            .map_err(|e| {
                error!("[FFMPEG] 启动 ffmpeg 失败: {}", e);
                tool_unavailable(&self.ffmpeg_path, &e)
            })?;

        if !output.success() {
            let diagnostics = output.diagnostics();
            error!("[FFMPEG] 退出码 {:?}: {}", output.exit_code, diagnostics);
            return Err(AppError::DecodeFailed(diagnostics));
        }

        if !is_non_empty_file(output_path) {
            error!("[FFMPEG] 退出码为 0 但未生成音频: {}", output_path.display());
            return Err(AppError::DecodeFailed(format!(
                "ffmpeg 未生成音频文件: {}",
                output_path.display()
            )));
        }

        info!("[FFMPEG] 音频提取完成: {}", output_path.display());
        Ok(())
    }
}

pub(crate) fn decode_args(input_path: &Path, output_path: &Path) -> Vec<String> {
    vec![
        "-y".to_string(),
        "-i".to_string(),
        input_path.to_string_lossy().to_string(),
        "-vn".to_string(),
        "-acodec".to_string(),
        PCM_CODEC.to_string(),
        "-ar".to_string(),
        SAMPLE_RATE.to_string(),
        "-ac".to_string(),
        CHANNELS.to_string(),
        output_path.to_string_lossy().to_string(),
    ]
}

fn is_non_empty_file(path: &Path) -> bool {
    fs::metadata(path)
        .map(|m| m.is_file() && m.len() > 0)
        .unwrap_or(false)
}
