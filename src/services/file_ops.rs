//! Copy and move primitives used when filing a file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::models::RuleAction;

/// Attempts before falling back to a UUID suffix
const MAX_SUFFIX: u32 = 1000;

/// Copy a file or directory tree, keeping permission bits.
pub fn copy_path(src: &Path, dst: &Path) -> io::Result<()> {
    if fs::metadata(src)?.is_dir() {
        copy_dir_all(src, dst)
    } else {
        // fs::copy carries the permission bits over
        fs::copy(src, dst).map(|_| ())
    }
}

/// Rename, falling back to copy + delete across filesystems.
pub fn move_path(src: &Path, dst: &Path) -> io::Result<()> {
    if fs::rename(src, dst).is_ok() {
        return Ok(());
    }

    copy_path(src, dst)?;
    if fs::metadata(src)?.is_dir() {
        fs::remove_dir_all(src)
    } else {
        fs::remove_file(src)
    }
}

fn copy_dir_all(src: &Path, dst: &Path) -> io::Result<()> {
    fs::create_dir_all(dst)?;
    fs::set_permissions(dst, fs::metadata(src)?.permissions())?;

    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if entry.file_type()?.is_dir() {
            copy_dir_all(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path)?;
        }
    }

    Ok(())
}

/// `path` itself if free, else `stem_N.ext` with the smallest free N
pub fn unique_destination(path: &Path) -> PathBuf {
    if !path.exists() {
        return path.to_path_buf();
    }

    let parent = path.parent().unwrap_or(Path::new("."));
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "file".to_string());
    let ext = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    for counter in 1..=MAX_SUFFIX {
        let candidate = parent.join(format!("{}_{}{}", stem, counter, ext));
        if !candidate.exists() {
            return candidate;
        }
    }
    parent.join(format!("{}_{}{}", stem, uuid::Uuid::new_v4(), ext))
}

/// Copy or move `src` to a free path derived from `dst` on a blocking
/// thread. Returns the path actually written.
pub async fn transfer(src: &Path, dst: &Path, action: RuleAction) -> io::Result<PathBuf> {
    let src = src.to_path_buf();
    let dst = dst.to_path_buf();

    tokio::task::spawn_blocking(move || -> io::Result<PathBuf> {
        let target = unique_destination(&dst);
        match action {
            RuleAction::Move => move_path(&src, &target)?,
            RuleAction::Copy => copy_path(&src, &target)?,
        }
        Ok(target)
    })
    .await
    .map_err(|e| io::Error::other(format!("Task failed: {}", e)))?
}
