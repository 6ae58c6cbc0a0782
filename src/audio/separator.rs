// 人声分离模块 - 使用 audio-separator

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};

use crate::config::SeparationConfig;
use crate::error::{AppError, AppResult};
use crate::models::{self, ModelInfo};
use crate::process::{tool_unavailable, ToolRunner};
use crate::utils::OutputFormat;

/// audio-separator 调用封装
///
/// 模型在构造时固定；推理耗时由调用方负责控制，这里不设超时。
pub struct Separator {
    separator_path: String,
    model: ModelInfo,
    model_file_dir: Option<PathBuf>,
    runner: Arc<dyn ToolRunner>,
}

impl Separator {
    pub fn new(
        separator_path: impl Into<String>,
        config: &SeparationConfig,
        runner: Arc<dyn ToolRunner>,
    ) -> AppResult<Self> {
        let model = models::get_model_by_id(&config.selected_model_id).ok_or_else(|| {
            AppError::Config(format!("未知的分离模型: {}", config.selected_model_id))
        })?;
        info!("[SEPARATOR] 使用模型: {} ({})", model.name, model.filename);

        Ok(Self {
            separator_path: separator_path.into(),
            model,
            model_file_dir: config.model_file_dir.clone(),
            runner,
        })
    }

    pub fn model(&self) -> &ModelInfo {
        &self.model
    }

    /// 分离音频，结果写入 output_dir（audio-separator 可能创建子目录）
    ///
    /// target_stem 为 None 时输出模型的全部轨道。
    pub fn separate(
        &self,
        audio_path: &Path,
        output_dir: &Path,
        target_stem: Option<&str>,
        output_format: OutputFormat,
    ) -> AppResult<()> {
        info!("[SEPARATOR] 音频路径: {}", audio_path.display());
        info!("[SEPARATOR] 输出目录: {}", output_dir.display());

        if !audio_path.is_file() {
            error!("[SEPARATOR] 音频文件不存在: {}", audio_path.display());
            return Err(AppError::SeparationFailed(format!(
                "音频文件不存在: {}",
                audio_path.display()
            )));
        }
        fs::create_dir_all(output_dir)?;

        let args = self.build_args(audio_path, output_dir, target_stem, output_format);
        info!("[SEPARATOR] 命令: {} {}", self.separator_path, args.join(" "));

        let output = self
            .runner
            .invoke(&self.separator_path, &args)
            .map_err(|e| {
                error!("[SEPARATOR] 启动 audio-separator 失败: {}", e);
                tool_unavailable(&self.separator_path, &e)
            })?;

        if !output.success() {
            let diagnostics = output.diagnostics();
            error!(
                "[SEPARATOR] audio-separator 处理失败，退出码: {:?}",
                output.exit_code
            );
            error!("[SEPARATOR] 错误输出: {}", diagnostics);
            return Err(AppError::SeparationFailed(diagnostics));
        }

        info!("[SEPARATOR] audio-separator 处理成功");
        Ok(())
    }

    pub(crate) fn build_args(
        &self,
        audio_path: &Path,
        output_dir: &Path,
        target_stem: Option<&str>,
        output_format: OutputFormat,
    ) -> Vec<String> {
        let mut args = vec![
            audio_path.to_string_lossy().to_string(),
            "--model_filename".to_string(),
            self.model.filename.clone(),
            "--output_dir".to_string(),
            output_dir.to_string_lossy().to_string(),
            "--output_format".to_string(),
            output_format.as_str().to_string(),
        ];

        if let Some(stem) = target_stem {
            args.push("--single_stem".to_string());
            args.push(stem.to_string());
        }

        if let Some(ref dir) = self.model_file_dir {
            args.push("--model_file_dir".to_string());
            args.push(dir.to_string_lossy().to_string());
        }

        args
    }
}
