// 外部进程调用
//
// ffmpeg 和 audio-separator 都只通过退出码和输出文本与本服务交互，
// 这里把调用收敛到 ToolRunner，测试时可替换为假实现。

use std::io;
use std::process::Stdio;
use tracing::debug;

use crate::error::AppError;
use crate::utils::hidden_command;

/// 一次外部调用的结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    /// 被信号终止时为 None
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// 失败诊断信息：优先 stderr，其次 stdout，都为空时给出退出码
    pub fn diagnostics(&self) -> String {
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            return stderr.to_string();
        }
        let stdout = self.stdout.trim();
        if !stdout.is_empty() {
            return stdout.to_string();
        }
        match self.exit_code {
            Some(code) => format!("退出码 {}（无详细错误信息）", code),
            None => "进程被信号终止（无详细错误信息）".to_string(),
        }
    }
}

pub trait ToolRunner: Send + Sync {
    /// 同步执行外部程序并等待其结束，完整收集 stdout/stderr。
    /// 只有进程无法启动时才返回 Err。
    fn invoke(&self, program: &str, args: &[String]) -> io::Result<ToolOutput>;
}

/// 基于 std::process 的实现
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ToolRunner for SystemRunner {
    fn invoke(&self, program: &str, args: &[String]) -> io::Result<ToolOutput> {
        debug!("[PROCESS] {} {}", program, args.join(" "));
        let output = hidden_command(program)
            .args(args)
            .stdin(Stdio::null())
            .output()?;

        Ok(ToolOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// 进程无法启动（不存在或不可执行）
pub fn tool_unavailable(program: &str, err: &io::Error) -> AppError {
    AppError::ToolUnavailable(format!("无法启动 {}: {}", program, err))
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use std::sync::Arc;

    pub(crate) struct ScriptedRunner<F>(F);

    impl<F> ToolRunner for ScriptedRunner<F>
    where
        F: Fn(&[String]) -> io::Result<ToolOutput> + Send + Sync,
    {
        fn invoke(&self, _program: &str, args: &[String]) -> io::Result<ToolOutput> {
            (self.0)(args)
        }
    }

    pub(crate) fn scripted<F>(f: F) -> Arc<dyn ToolRunner>
    where
        F: Fn(&[String]) -> io::Result<ToolOutput> + Send + Sync + 'static,
    {
        Arc::new(ScriptedRunner(f))
    }

    pub(crate) fn ok() -> ToolOutput {
        ToolOutput {
            exit_code: Some(0),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_program_is_spawn_error() {
        let result = SystemRunner.invoke("voice-separator-no-such-tool", &[]);
        assert!(result.is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_captures_exit_code_and_output() {
        let args = vec!["-c".to_string(), "echo out; echo err >&2; exit 3".to_string()];
        let output = SystemRunner.invoke("sh", &args).unwrap();
        assert_eq!(output.exit_code, Some(3));
        assert!(!output.success());
        assert_eq!(output.stdout.trim(), "out");
        assert_eq!(output.diagnostics(), "err");
    }

    #[test]
    fn test_diagnostics_fallback() {
        let output = ToolOutput {
            exit_code: Some(1),
            stdout: String::new(),
            stderr: "  \n".to_string(),
        };
        assert!(output.diagnostics().contains('1'));
    }
}
