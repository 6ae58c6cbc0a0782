// 配置管理模块
//
// 配置在启动时加载一次，显式传入各组件，不使用全局变量。

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};
use crate::models;
use crate::utils::{resolve_tool_path, OutputFormat};

pub const CONFIG_PATH_ENV: &str = "VOICE_SEPARATOR_CONFIG";
const PORT_ENV: &str = "PORT";
const HOST_ENV: &str = "VOICE_SEPARATOR_HOST";
const WORKSPACE_ROOT_ENV: &str = "VOICE_SEPARATOR_TMP";
const MODEL_ENV: &str = "VOICE_SEPARATOR_MODEL";
const LOG_DIR_ENV: &str = "VOICE_SEPARATOR_LOG_DIR";

/// 日志级别
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// 转换为 tracing 过滤器字符串
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// 监听地址
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 外部工具路径
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolPaths {
    pub ffmpeg: String,
    pub separator: String,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            ffmpeg: resolve_tool_path("ffmpeg"),
            separator: resolve_tool_path("audio-separator"),
        }
    }
}

/// 人声分离配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SeparationConfig {
    /// 当前选择的模型 ID
    pub selected_model_id: String,
    /// 请求未指定格式时的输出格式
    pub output_format: String,
    /// 目标轨道在文件名中的标记
    pub target_stem: String,
    /// 包含目标标记但应排除的文件名标记（如 no_vocals）
    pub exclude_marker: String,
    /// 传给 --single_stem，None 时输出全部轨道
    pub single_stem: Option<String>,
    /// 模型缓存目录，None 时由 audio-separator 自行决定
    pub model_file_dir: Option<PathBuf>,
}

impl Default for SeparationConfig {
    fn default() -> Self {
        Self {
            selected_model_id: "htdemucs_ft".to_string(),
            output_format: "mp3".to_string(),
            target_stem: "vocals".to_string(),
            exclude_marker: "no_vocals".to_string(),
            single_stem: Some("Vocals".to_string()),
            model_file_dir: None,
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    /// 任务工作目录根
    pub workspace_root: PathBuf,
    pub tools: ToolPaths,
    pub separation: SeparationConfig,
    pub log_level: LogLevel,
    /// 日志文件目录，None 时只输出到控制台
    pub log_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            workspace_root: std::env::temp_dir().join("voice-separator"),
            tools: ToolPaths::default(),
            separation: SeparationConfig::default(),
            log_level: LogLevel::default(),
            log_dir: None,
        }
    }
}

impl AppConfig {
    /// 配置文件路径：环境变量优先，否则为工作目录下的 config.json
    pub fn default_path() -> PathBuf {
        std::env::var_os(CONFIG_PATH_ENV)
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("config.json"))
    }

    /// 加载配置文件并应用环境变量覆盖
    ///
    /// 此时日志系统尚未初始化，JSON 解析失败不直接打印，作为第二个返回值交给调用方记录。
    pub fn load(config_path: &Path) -> AppResult<(Self, Option<String>)> {
        Self::load_with(config_path, |key| std::env::var(key).ok())
    }

    fn load_with<F>(config_path: &Path, lookup: F) -> AppResult<(Self, Option<String>)>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut warning = None;
        let mut config = if config_path.exists() {
            let content = fs::read_to_string(config_path)?;
            serde_json::from_str(&content).unwrap_or_else(|e| {
                warning = Some(format!(
                    "配置文件 {} JSON 解析失败: {}，使用默认配置",
                    config_path.display(),
                    e
                ));
                AppConfig::default()
            })
        } else {
            AppConfig::default()
        };

        config.apply_env(lookup)?;
        config.validate()?;
        Ok((config, warning))
    }

    /// 环境变量覆盖，lookup 便于测试注入
    pub fn apply_env<F>(&mut self, lookup: F) -> AppResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(port) = lookup(PORT_ENV) {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| AppError::Config(format!("{} 不是有效端口: {}", PORT_ENV, port)))?;
        }
        if let Some(host) = lookup(HOST_ENV) {
            self.server.host = host;
        }
        if let Some(root) = lookup(WORKSPACE_ROOT_ENV) {
            self.workspace_root = PathBuf::from(root);
        }
        if let Some(model) = lookup(MODEL_ENV) {
            self.separation.selected_model_id = model;
        }
        if let Some(dir) = lookup(LOG_DIR_ENV) {
            self.log_dir = Some(PathBuf::from(dir));
        }
        Ok(())
    }

    pub fn validate(&self) -> AppResult<()> {
        let sep = &self.separation;
        if models::get_model_by_id(&sep.selected_model_id).is_none() {
            return Err(AppError::Config(format!(
                "未知的分离模型: {}",
                sep.selected_model_id
            )));
        }
        OutputFormat::parse(&sep.output_format)
            .map_err(|_| AppError::Config(format!("不支持的输出格式: {}", sep.output_format)))?;
        if sep.target_stem.trim().is_empty() {
            return Err(AppError::Config("target_stem 不能为空".to_string()));
        }
        if sep.exclude_marker.eq_ignore_ascii_case(&sep.target_stem) {
            return Err(AppError::Config(
                "exclude_marker 不能与 target_stem 相同".to_string(),
            ));
        }
        Ok(())
    }

    pub fn default_output_format(&self) -> OutputFormat {
        OutputFormat::parse(&self.separation.output_format).unwrap_or(OutputFormat::Mp3)
    }
}
