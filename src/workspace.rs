// 任务工作目录管理
//
// 每个任务在根目录下拥有独立子目录，任务结束时无论成功失败都会被删除。

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};

/// 工作目录根，进程启动时创建一次，之后不会被本服务删除
#[derive(Debug, Clone)]
pub struct WorkspaceManager {
    root: PathBuf,
}

impl WorkspaceManager {
    pub fn new(root: impl Into<PathBuf>) -> AppResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| {
            AppError::Workspace(format!("创建工作目录根失败 {}: {}", root.display(), e))
        })?;
        info!("[WORKSPACE] 工作目录根: {}", root.display());
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 为任务创建全新的工作目录
    ///
    /// 目录已存在视为 ID 冲突，直接失败，不重试。
    pub fn allocate(&self, job_id: &str) -> AppResult<Workspace> {
        if job_id.is_empty() || job_id.contains(['/', '\\']) || job_id == "." || job_id == ".." {
            return Err(AppError::Workspace(format!("非法任务 ID: {:?}", job_id)));
        }

        let path = self.root.join(job_id);
        match fs::create_dir(&path) {
            Ok(()) => {
                debug!("[WORKSPACE] 已分配: {}", path.display());
                Ok(Workspace {
                    path,
                    released: false,
                })
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Err(AppError::Workspace(
                format!("工作目录已存在（任务 ID 冲突）: {}", path.display()),
            )),
            Err(e) => Err(AppError::Workspace(format!(
                "创建工作目录失败 {}: {}",
                path.display(),
                e
            ))),
        }
    }
}

/// 递归删除工作目录，幂等，错误只记录日志
pub fn release(path: &Path) {
    match fs::remove_dir_all(path) {
        Ok(()) => debug!("[WORKSPACE] 已删除: {}", path.display()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!("[WORKSPACE] 删除工作目录失败 {}: {}", path.display(), e),
    }
}

/// 单个任务的工作目录，离开作用域（包括 panic 展开）时自动删除
#[derive(Debug)]
pub struct Workspace {
    path: PathBuf,
    released: bool,
}

impl Workspace {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn join(&self, name: impl AsRef<Path>) -> PathBuf {
        self.path.join(name)
    }

    pub fn release(mut self) {
        self.release_inner();
    }

    fn release_inner(&mut self) {
        if !self.released {
            self.released = true;
            release(&self.path);
        }
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        self.release_inner();
    }
}
