// 分离结果定位
//
// audio-separator 的输出文件名形如 `audio_raw_(Vocals)_htdemucs_ft.mp3`，
// 不同模型/版本可能放在子目录中，也可能同时输出 no_vocals 轨道。
//
// 遍历顺序：深度优先，同一目录内按文件名字典序，目录本身先于其内容。
// 取第一个匹配的普通文件。

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::ResolutionError;

/// 文件名包含目标标记且不包含排除标记（均不区分大小写）
pub fn is_target_stem(file_name: &str, target_stem: &str, exclude_marker: &str) -> bool {
    let name = file_name.to_lowercase();
    let target = target_stem.to_lowercase();
    let exclude = exclude_marker.to_lowercase();

    name.contains(&target) && (exclude.is_empty() || !name.contains(&exclude))
}

/// 在 (路径, 文件名) 列表中按顺序选出第一个目标轨道
pub fn select_stem<I>(entries: I, target_stem: &str, exclude_marker: &str) -> Option<PathBuf>
where
    I: IntoIterator<Item = (PathBuf, String)>,
{
    entries
        .into_iter()
        .find(|(_, name)| is_target_stem(name, target_stem, exclude_marker))
        .map(|(path, _)| path)
}

/// 递归扫描输出目录，返回目标轨道文件路径
pub fn resolve(
    output_dir: &Path,
    target_stem: &str,
    exclude_marker: &str,
) -> Result<PathBuf, ResolutionError> {
    let not_found = || ResolutionError::NotFound {
        dir: output_dir.to_path_buf(),
        target: target_stem.to_string(),
    };

    if !output_dir.is_dir() {
        warn!("[RESOLVER] 输出目录不存在: {}", output_dir.display());
        return Err(not_found());
    }

    let entries: Vec<(PathBuf, String)> = WalkDir::new(output_dir)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("[RESOLVER] 跳过无法读取的条目: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| {
            let name = entry.file_name().to_string_lossy().to_string();
            (entry.into_path(), name)
        })
        .collect();

    debug!(
        "[RESOLVER] 输出目录中的文件: {:?}",
        entries.iter().map(|(_, n)| n).collect::<Vec<_>>()
    );

    let selected = select_stem(entries, target_stem, exclude_marker).ok_or_else(not_found)?;
    if !selected.is_file() {
        return Err(not_found());
    }

    info!("[RESOLVER] 目标轨道: {}", selected.display());
    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn listing(names: &[&str]) -> Vec<(PathBuf, String)> {
        names
            .iter()
            .map(|n| (PathBuf::from("/out").join(n), n.to_string()))
            .collect()
    }

    #[test]
    fn test_no_vocals_never_selected() {
        let picked = select_stem(listing(&["no_vocals.wav", "vocals.wav"]), "vocals", "no_vocals");
        assert_eq!(picked, Some(PathBuf::from("/out/vocals.wav")));

        let picked = select_stem(listing(&["no_vocals.wav"]), "vocals", "no_vocals");
        assert_eq!(picked, None);
    }

    #[test]
    fn test_case_insensitive() {
        let picked = select_stem(
            listing(&[
                "audio_raw_(Instrumental)_htdemucs_ft.mp3",
                "audio_raw_(Vocals)_htdemucs_ft.mp3",
            ]),
            "vocals",
            "no_vocals",
        );
        assert_eq!(
            picked,
            Some(PathBuf::from("/out/audio_raw_(Vocals)_htdemucs_ft.mp3"))
        );
        assert!(!is_target_stem("NO_VOCALS.WAV", "Vocals", "no_vocals"));
    }

    #[test]
    fn test_first_match_wins() {
        let picked = select_stem(listing(&["b_vocals.wav", "a_vocals.wav"]), "vocals", "");
        assert_eq!(picked, Some(PathBuf::from("/out/b_vocals.wav")));
    }

    #[test]
    fn test_resolve_walks_nested_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("htdemucs_ft").join("audio_raw");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("no_vocals.wav"), b"x").unwrap();
        fs::write(nested.join("vocals.wav"), b"x").unwrap();

        let picked = resolve(dir.path(), "vocals", "no_vocals").unwrap();
        assert_eq!(picked, nested.join("vocals.wav"));
    }

    #[test]
    fn test_resolve_ignores_directories_named_like_stem() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("vocals")).unwrap();

        assert!(matches!(
            resolve(dir.path(), "vocals", "no_vocals"),
            Err(ResolutionError::NotFound { .. })
        ));
    }

    #[test]
    fn test_resolve_empty_or_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(resolve(dir.path(), "vocals", "no_vocals").is_err());
        assert!(resolve(&dir.path().join("missing"), "vocals", "no_vocals").is_err());
    }
}
