use anyhow::{Context, Result};
use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "skipgrep";
const INDEX_EXTENSION: &str = "idx";

/// Application data directory for storing built indexes.
pub fn get_app_data_dir() -> Result<PathBuf> {
    let base = if cfg!(target_os = "macos") {
        dirs::home_dir().map(|h| h.join("Library").join("Application Support"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
    } else {
        dirs::data_dir()
    };

    let base = base.context("could not determine app data directory")?;
    let app_dir = base.join(APP_NAME);
    fs::create_dir_all(&app_dir)?;
    Ok(app_dir)
}

/// Default index file for a repository root, keyed by a hash of the
/// canonical root path.
pub fn default_index_path(root: &Path) -> Result<PathBuf> {
    let indexes_dir = get_app_data_dir()?.join("indexes");
    fs::create_dir_all(&indexes_dir)?;
    Ok(indexes_dir.join(format!("{}.{INDEX_EXTENSION}", hash_path(root))))
}

/// Unique, human-scannable file stem for a root path: a sanitized
/// directory name plus the full-path hash.
fn hash_path(path: &Path) -> String {
    let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    let path_str = canonical.to_string_lossy();

    let dir_name = canonical
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown");
    let sanitized: String = dir_name
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '-' || *c == '_')
        .take(16)
        .collect();

    let mut hasher = DefaultHasher::new();
    path_str.hash(&mut hasher);
    format!("{}-{:016x}", sanitized, hasher.finish())
}

/// Stored index files, newest first.
pub fn list_index_files() -> Result<Vec<PathBuf>> {
    let indexes_dir = get_app_data_dir()?.join("indexes");
    if !indexes_dir.exists() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(&indexes_dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) == Some(INDEX_EXTENSION) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Remove the stored index for a repository root, if any.
pub fn remove_index(root: &Path) -> Result<bool> {
    let path = default_index_path(root)?;
    if path.exists() {
        fs::remove_file(&path)
            .with_context(|| format!("failed to remove {}", path.display()))?;
        return Ok(true);
    }
    Ok(false)
}

/// Walk up from `start` looking for a `.git` directory; the repository
/// root anchors the default index location. Falls back to `start`.
pub fn find_repo_root(start: &Path) -> Result<PathBuf> {
    let start = start
        .canonicalize()
        .with_context(|| format!("invalid path {}", start.display()))?;

    let mut current = start.as_path();
    loop {
        if current.join(".git").exists() {
            return Ok(current.to_path_buf());
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => break,
        }
    }

    Ok(start)
}
