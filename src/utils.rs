// 工具模块

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::process::Command;

use crate::error::{AppError, AppResult};

#[cfg(target_os = "windows")]
use std::os::windows::process::CommandExt;

/// Windows 下隐藏控制台窗口的标志
#[cfg(target_os = "windows")]
pub const CREATE_NO_WINDOW: u32 = 0x08000000;

/// 创建一个隐藏控制台窗口的 Command（Windows 专用）
/// 在非 Windows 平台上等同于 Command::new
#[cfg(target_os = "windows")]
pub fn hidden_command(program: &str) -> Command {
    let mut cmd = Command::new(program);
    cmd.creation_flags(CREATE_NO_WINDOW);
    cmd
}

#[cfg(not(target_os = "windows"))]
pub fn hidden_command(program: &str) -> Command {
    Command::new(program)
}

/// 输出音频格式
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Mp3,
    Wav,
    Ogg,
    Flac,
}

impl OutputFormat {
    pub fn parse(value: &str) -> AppResult<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mp3" => Ok(Self::Mp3),
            "wav" => Ok(Self::Wav),
            "ogg" => Ok(Self::Ogg),
            "flac" => Ok(Self::Flac),
            other => Err(AppError::ValidationFailed(format!(
                "不支持的输出格式: {}（可选 mp3, wav, ogg, flac）",
                other
            ))),
        }
    }

    /// audio-separator 的 --output_format 参数，同时也是文件扩展名
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Wav => "wav",
            Self::Ogg => "ogg",
            Self::Flac => "flac",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Mp3 => "audio/mpeg",
            Self::Wav => "audio/wav",
            Self::Ogg => "audio/ogg",
            Self::Flac => "audio/flac",
        }
    }
}

/// POST /separate-voice 请求体
///
/// 兼容旧字段名 `video` / `input_ext`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeparateRequest {
    /// base64 编码的音视频数据
    #[serde(default, alias = "video")]
    pub media: Option<String>,
    /// 输入文件扩展名，仅用于给 ffmpeg 命名输入文件
    #[serde(default, alias = "input_ext")]
    pub input_format_hint: Option<String>,
    /// 输出格式，缺省时使用配置中的格式
    #[serde(default)]
    pub format: Option<String>,
}

/// 分离成功响应
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeparateResponse {
    /// base64 编码的人声轨
    pub vocals: String,
    pub format: String,
    pub mime_type: String,
    pub success: bool,
}

/// 失败响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureResponse {
    pub error: String,
    pub success: bool,
}

impl FailureResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            success: false,
        }
    }
}

/// 依赖检查结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyCheck {
    pub name: String,
    pub available: bool,
    pub version: Option<String>,
    pub path: Option<String>,
    pub message: String,
}

/// 生成 UUID
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// 获取可执行文件所在目录
pub fn get_exe_dir() -> Option<PathBuf> {
    std::env::current_exe().ok()?.parent().map(|p| p.to_path_buf())
}

/// 解析程序路径，优先使用可执行文件同级目录或其 tools 子目录中的版本
pub fn resolve_tool_path(tool_name: &str) -> String {
    let file_name = if cfg!(target_os = "windows") {
        format!("{}.exe", tool_name)
    } else {
        tool_name.to_string()
    };

    if let Some(exe_dir) = get_exe_dir() {
        let tool_path = exe_dir.join("tools").join(&file_name);
        if tool_path.is_file() {
            return tool_path.to_string_lossy().to_string();
        }
        let tool_path = exe_dir.join(&file_name);
        if tool_path.is_file() {
            return tool_path.to_string_lossy().to_string();
        }
    }
    // 回退到系统 PATH
    tool_name.to_string()
}
