//! Filesystem abstraction the indexer and query engine run against.
//!
//! The index core never touches the filesystem directly; it goes through
//! [`FileSystem`], which keeps the build pipeline testable against an
//! in-memory tree and lets hosts hide files (the OS implementation skips
//! `.git` and other non-code directories).

use anyhow::{bail, Context, Result};
use ignore::WalkBuilder;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// A repository's files, addressed by root-relative path.
pub trait FileSystem: Send + Sync {
    /// Enumerate indexable files as slash-separated paths relative to
    /// the repository root. Stable order within one call.
    fn list_relative_filenames(&self) -> Result<Vec<String>>;

    /// Raw bytes of one listed file.
    fn read_relative_filename(&self, name: &str) -> Result<Vec<u8>>;
}

/// On-disk repository rooted at a directory.
///
/// Listing honors `.gitignore` and skips hidden files plus the usual
/// non-code directories. Per-entry walk errors (unreadable
/// subdirectories) are skipped; a missing root is an error.
pub struct OsFileSystem {
    root: PathBuf,
}

impl OsFileSystem {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl FileSystem for OsFileSystem {
    fn list_relative_filenames(&self) -> Result<Vec<String>> {
        if !self.root.is_dir() {
            bail!("not a directory: {}", self.root.display());
        }

        let walker = WalkBuilder::new(&self.root)
            .hidden(true)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .filter_entry(|entry| {
                let name = entry.file_name().to_string_lossy();
                !matches!(
                    name.as_ref(),
                    ".git" | "node_modules" | "target" | "__pycache__" | ".venv" | "venv"
                )
            })
            .build();

        let mut names: Vec<String> = walker
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| {
                let rel = entry.path().strip_prefix(&self.root).ok()?;
                Some(rel.to_string_lossy().replace('\\', "/"))
            })
            .collect();

        names.sort();
        Ok(names)
    }

    fn read_relative_filename(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.root.join(name);
        fs::read(&path).with_context(|| format!("failed to read {}", path.display()))
    }
}

/// In-memory repository for tests and embedders.
#[derive(Debug, Clone, Default)]
pub struct MemoryFileSystem {
    files: BTreeMap<String, Vec<u8>>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, contents: impl Into<Vec<u8>>) {
        self.files.insert(name.into(), contents.into());
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl<N: Into<String>, C: Into<Vec<u8>>> FromIterator<(N, C)> for MemoryFileSystem {
    fn from_iter<T: IntoIterator<Item = (N, C)>>(iter: T) -> Self {
        let mut fs = Self::new();
        for (name, contents) in iter {
            fs.insert(name, contents);
        }
        fs
    }
}

impl FileSystem for MemoryFileSystem {
    fn list_relative_filenames(&self) -> Result<Vec<String>> {
        Ok(self.files.keys().cloned().collect())
    }

    fn read_relative_filename(&self, name: &str) -> Result<Vec<u8>> {
        self.files
            .get(name)
            .cloned()
            .with_context(|| format!("no such file: {name}"))
    }
}
