// 测试辅助：可编排的假外部工具

#![allow(dead_code)]

use parking_lot::Mutex;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use voice_separator::config::{AppConfig, ToolPaths};
use voice_separator::job::JobOrchestrator;
use voice_separator::process::{ToolOutput, ToolRunner};

pub const FFMPEG: &str = "ffmpeg";
pub const SEPARATOR: &str = "audio-separator";

/// 假工具的一步行为
#[derive(Debug, Clone)]
pub enum Step {
    /// ffmpeg 写出 PCM 文件；audio-separator 不写任何文件
    Succeed,
    /// 退出码 0，但写出给定文件（相对输出目录）
    SucceedWith(Vec<(String, Vec<u8>)>),
    /// 退出码 0，不写任何文件
    SucceedSilently,
    Fail(i32, String),
    Missing,
    Panic,
}

impl Step {
    pub fn stems(files: &[(&str, &[u8])]) -> Self {
        Step::SucceedWith(
            files
                .iter()
                .map(|(name, bytes)| (name.to_string(), bytes.to_vec()))
                .collect(),
        )
    }
}

#[derive(Debug, Clone)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

pub struct FakeRunner {
    decode: Step,
    separate: Step,
    calls: Mutex<Vec<Invocation>>,
}

impl FakeRunner {
    pub fn new(decode: Step, separate: Step) -> Arc<Self> {
        Arc::new(Self {
            decode,
            separate,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls_to(&self, program: &str) -> usize {
        self.calls.lock().iter().filter(|c| c.program == program).count()
    }

    /// ffmpeg 收到的 -i 参数
    pub fn ffmpeg_inputs(&self) -> Vec<PathBuf> {
        self.calls
            .lock()
            .iter()
            .filter(|c| c.program == FFMPEG)
            .filter_map(|c| arg_after(&c.args, "-i").map(PathBuf::from))
            .collect()
    }

    /// 从 ffmpeg 的输入路径推出任务工作目录
    pub fn workspaces_seen(&self) -> Vec<PathBuf> {
        self.ffmpeg_inputs()
            .iter()
            .filter_map(|p| p.parent().map(Path::to_path_buf))
            .collect()
    }
}

fn arg_after<'a>(args: &'a [String], flag: &str) -> Option<&'a String> {
    let pos = args.iter().position(|a| a == flag)?;
    args.get(pos + 1)
}

impl ToolRunner for FakeRunner {
    fn invoke(&self, program: &str, args: &[String]) -> io::Result<ToolOutput> {
        let step = if program == FFMPEG {
            &self.decode
        } else {
            &self.separate
        };

        // 版本探测
        if args.len() == 1 && args[0].ends_with("version") {
            return match step {
                Step::Missing => Err(io::Error::new(io::ErrorKind::NotFound, "not found")),
                _ => Ok(ToolOutput {
                    exit_code: Some(0),
                    stdout: format!("{} fake 1.0", program),
                    stderr: String::new(),
                }),
            };
        }

        self.calls.lock().push(Invocation {
            program: program.to_string(),
            args: args.to_vec(),
        });

        let ok = ToolOutput {
            exit_code: Some(0),
            ..Default::default()
        };

        match step {
            Step::Missing => Err(io::Error::new(io::ErrorKind::NotFound, "No such file or directory")),
            Step::Panic => panic!("simulated crash in {}", program),
            Step::Fail(code, stderr) => Ok(ToolOutput {
                exit_code: Some(*code),
                stdout: String::new(),
                stderr: stderr.clone(),
            }),
            Step::SucceedSilently => Ok(ok),
            Step::Succeed => {
                if program == FFMPEG {
                    if let Some(output) = args.last() {
                        fs::write(output, b"RIFF fake pcm")?;
                    }
                }
                Ok(ok)
            }
            Step::SucceedWith(files) => {
                let base = if program == FFMPEG {
                    args.last().and_then(|o| Path::new(o).parent().map(Path::to_path_buf))
                } else {
                    arg_after(args, "--output_dir").map(PathBuf::from)
                };
                let base = base.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "no output"))?;
                for (name, bytes) in files {
                    let path = base.join(name);
                    if let Some(parent) = path.parent() {
                        fs::create_dir_all(parent)?;
                    }
                    fs::write(path, bytes)?;
                }
                Ok(ok)
            }
        }
    }
}

pub fn test_config(root: &Path) -> AppConfig {
    AppConfig {
        workspace_root: root.join("jobs"),
        tools: ToolPaths {
            ffmpeg: FFMPEG.to_string(),
            separator: SEPARATOR.to_string(),
        },
        ..AppConfig::default()
    }
}

pub fn orchestrator(root: &Path, runner: Arc<dyn ToolRunner>) -> JobOrchestrator {
    JobOrchestrator::new(&test_config(root), runner).unwrap()
}

/// 工作目录根下剩余的条目数
pub fn leftover_entries(root: &Path) -> usize {
    fs::read_dir(root.join("jobs"))
        .map(|entries| entries.count())
        .unwrap_or(0)
}
