//! File access shared by the rewrite engine and the secret store.
//!
//! Every failure is mapped to `FileAccess` with the offending path.
//! Writes go through a temp file in the same directory followed by a
//! rename, so readers see either the old file or the new one.

use std::path::{Path, PathBuf};

use tokio::fs;

use crate::errors::{EnvSealError, Result};

/// Returns `true` if `path` exists. Permission errors count as absent.
pub async fn exists(path: &Path) -> bool {
    fs::try_exists(path).await.unwrap_or(false)
}

/// Read a whole UTF-8 file.
pub async fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .await
        .map_err(|e| EnvSealError::file_access(path, e))
}

/// Replace the contents of `path` atomically.
///
/// If the file already exists its permissions are carried over to the
/// replacement.
pub async fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let tmp_path = temp_path_for(path);

    fs::write(&tmp_path, contents)
        .await
        .map_err(|e| EnvSealError::file_access(&tmp_path, e))?;

    if let Ok(meta) = fs::metadata(path).await {
        if let Err(e) = fs::set_permissions(&tmp_path, meta.permissions()).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(EnvSealError::file_access(&tmp_path, e));
        }
    }

    if let Err(e) = fs::rename(&tmp_path, path).await {
        let _ = fs::remove_file(&tmp_path).await;
        return Err(EnvSealError::file_access(path, e));
    }

    Ok(())
}

/// `dir/.name.envseal.tmp`, next to the target so rename stays on one
/// filesystem.
fn temp_path_for(path: &Path) -> PathBuf {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    parent.join(format!(
        ".{}.envseal.tmp",
        path.file_name().unwrap_or_default().to_string_lossy()
    ))
}
