// 任务编排
//
// 一个请求对应一个任务：
// Received -> WorkspaceAllocated -> AudioDecoded -> SeparationComplete -> Resolved -> Succeeded
// 任一阶段失败直接进入 Failed。工作目录在任何退出路径上都会被删除。

use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::audio::{resolver, MediaDecoder, Separator};
use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::payload;
use crate::process::ToolRunner;
use crate::utils::{generate_id, OutputFormat, SeparateRequest, SeparateResponse};
use crate::workspace::{Workspace, WorkspaceManager};

/// 未指定输入格式时使用的扩展名
pub const DEFAULT_INPUT_EXT: &str = "mp4";

const AUDIO_FILE_NAME: &str = "audio_raw.wav";
const OUTPUT_DIR_NAME: &str = "output";

static INPUT_EXT_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9]{1,10}$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Received,
    WorkspaceAllocated,
    AudioDecoded,
    SeparationComplete,
    Resolved,
    Succeeded,
    Failed,
}

/// 已通过校验的任务输入
#[derive(Debug, Clone)]
pub struct JobRequest {
    pub media: Vec<u8>,
    pub input_ext: String,
    pub output_format: OutputFormat,
}

impl JobRequest {
    /// 请求校验，在分配任何工作目录之前完成
    pub fn from_request(request: &SeparateRequest, default_format: OutputFormat) -> AppResult<Self> {
        let encoded = request
            .media
            .as_deref()
            .ok_or_else(|| AppError::ValidationFailed("需要 media 字段（base64）".to_string()))?;
        let media = payload::decode_media(encoded)?;

        let input_ext = match request.input_format_hint.as_deref().map(str::trim) {
            None | Some("") => DEFAULT_INPUT_EXT.to_string(),
            Some(hint) => {
                let hint = hint.trim_start_matches('.');
                if !INPUT_EXT_REGEX.is_match(hint) {
                    return Err(AppError::ValidationFailed(format!(
                        "inputFormatHint 无效: {:?}",
                        hint
                    )));
                }
                hint.to_ascii_lowercase()
            }
        };

        let output_format = match request.format.as_deref() {
            None => default_format,
            Some(f) => OutputFormat::parse(f)?,
        };

        Ok(Self {
            media,
            input_ext,
            output_format,
        })
    }
}

/// 任务结果
#[derive(Debug, Clone)]
pub struct JobResult {
    /// 同时也是工作目录名
    pub job_id: String,
    pub vocals: Vec<u8>,
    pub format: OutputFormat,
}

impl JobResult {
    pub fn into_response(self) -> SeparateResponse {
        SeparateResponse {
            vocals: payload::encode_media(&self.vocals),
            format: self.format.as_str().to_string(),
            mime_type: self.format.mime_type().to_string(),
            success: true,
        }
    }
}

/// 单个任务，独占自己的工作目录
#[derive(Debug)]
pub struct Job {
    pub id: String,
    pub input_path: PathBuf,
    pub audio_path: PathBuf,
    pub output_dir: PathBuf,
    state: JobState,
    workspace: Workspace,
}

impl Job {
    fn new(id: String, workspace: Workspace, input_ext: &str) -> Self {
        Self {
            input_path: workspace.join(format!("input.{}", input_ext)),
            audio_path: workspace.join(AUDIO_FILE_NAME),
            output_dir: workspace.join(OUTPUT_DIR_NAME),
            state: JobState::WorkspaceAllocated,
            id,
            workspace,
        }
    }

    fn transition(&mut self, next: JobState) {
        debug!("[JOB] {} {:?} -> {:?}", self.id, self.state, next);
        self.state = next;
    }

    /// 结束任务并删除工作目录
    fn finish(self) {
        let Job { id, workspace, .. } = self;
        debug!("[JOB] {} 删除工作目录: {}", id, workspace.path().display());
        workspace.release();
    }
}

pub struct JobOrchestrator {
    workspaces: WorkspaceManager,
    decoder: MediaDecoder,
    separator: Separator,
    target_stem: String,
    exclude_marker: String,
    single_stem: Option<String>,
    default_format: OutputFormat,
}

impl JobOrchestrator {
    pub fn new(config: &AppConfig, runner: Arc<dyn ToolRunner>) -> AppResult<Self> {
        let workspaces = WorkspaceManager::new(&config.workspace_root)?;
        let decoder = MediaDecoder::new(&config.tools.ffmpeg, runner.clone());
        let separator = Separator::new(&config.tools.separator, &config.separation, runner)?;

        Ok(Self {
            workspaces,
            decoder,
            separator,
            target_stem: config.separation.target_stem.clone(),
            exclude_marker: config.separation.exclude_marker.clone(),
            single_stem: config.separation.single_stem.clone(),
            default_format: config.default_output_format(),
        })
    }

    pub fn workspaces(&self) -> &WorkspaceManager {
        &self.workspaces
    }

    pub fn model_id(&self) -> &str {
        &self.separator.model().id
    }

    /// 校验请求、执行任务并编码响应
    pub fn handle(&self, request: &SeparateRequest) -> AppResult<SeparateResponse> {
        let job_request = JobRequest::from_request(request, self.default_format)?;
        let result = self.run(job_request)?;
        debug!("[JOB] {} 编码响应: {} bytes", result.job_id, result.vocals.len());
        Ok(result.into_response())
    }

    /// 执行一个已校验的任务，阻塞直到所有外部工具结束
    pub fn run(&self, request: JobRequest) -> AppResult<JobResult> {
        let job_id = generate_id();
        info!(
            "[JOB] {} 开始: 输入 {} bytes, 格式提示 {}, 输出 {}",
            job_id,
            request.media.len(),
            request.input_ext,
            request.output_format.as_str()
        );

        debug!("[JOB] {} {:?}", job_id, JobState::Received);

        let workspace = self.workspaces.allocate(&job_id)?;
        let mut job = Job::new(job_id, workspace, &request.input_ext);

        let outcome = self.execute(&mut job, &request);
        match &outcome {
            Ok(_) => {
                job.transition(JobState::Succeeded);
                info!("[JOB] {} 完成", job.id);
            }
            Err(e) => {
                job.transition(JobState::Failed);
                error!("[JOB] {} 失败: {}", job.id, e);
            }
        }

        let job_id = job.id.clone();
        job.finish();

        outcome.map(|vocals| JobResult {
            job_id,
            vocals,
            format: request.output_format,
        })
    }

    fn execute(&self, job: &mut Job, request: &JobRequest) -> AppResult<Vec<u8>> {
        fs::write(&job.input_path, &request.media)?;

        self.decoder.decode(&job.input_path, &job.audio_path)?;
        job.transition(JobState::AudioDecoded);

        self.separator.separate(
            &job.audio_path,
            &job.output_dir,
            self.single_stem.as_deref(),
            request.output_format,
        )?;
        job.transition(JobState::SeparationComplete);

        let vocals_path = resolver::resolve(&job.output_dir, &self.target_stem, &self.exclude_marker)?;
        job.transition(JobState::Resolved);

        let vocals = fs::read(&vocals_path)?;
        if vocals.is_empty() {
            return Err(AppError::SeparationFailed(format!(
                "人声文件为空: {}",
                vocals_path.display()
            )));
        }
        info!("[JOB] {} 人声文件 {} bytes", job.id, vocals.len());
        Ok(vocals)
    }
}
