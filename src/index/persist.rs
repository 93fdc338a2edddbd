//! On-disk index forms.
//!
//! Two interchangeable encodings:
//!
//! * **Whole-index form**: `SGIX` magic, a little-endian format
//!   version, then one bincode payload holding the directory and every
//!   blob. Canonical form for the CLI.
//! * **Framed form**: a bare sequence of blob frames (see
//!   [`crate::index::blob`]) read back until end-of-file. Streamable
//!   during builds and usable for interchange; it carries no directory,
//!   so assembling a [`RepoIndex`] from it takes one.
//!
//! Files are produced atomically: written to a temporary sibling, then
//! renamed over the target. An existing regular file is replaced; a
//! directory target is an error.

use crate::error::PersistError;
use crate::fs::FileSystem;
use crate::index::blob::BlobIndex;
use crate::index::build::scan_repository;
use crate::index::types::{IndexConfig, RepoIndex, VERSION};
use crate::utils::progress::Progress;
use anyhow::{bail, Context, Result};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

const MAGIC: [u8; 4] = *b"SGIX";

/// Encode the whole-index form.
pub fn write_repo_index<W: Write>(writer: &mut W, index: &RepoIndex) -> Result<(), PersistError> {
    writer.write_all(&MAGIC)?;
    writer.write_all(&VERSION.to_le_bytes())?;
    bincode::serialize_into(writer, index).map_err(PersistError::Encode)
}

/// Decode the whole-index form, validating magic and version.
pub fn read_repo_index<R: Read>(reader: &mut R) -> Result<RepoIndex, PersistError> {
    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic)?;
    if magic != MAGIC {
        return Err(PersistError::BadMagic);
    }

    let mut version = [0u8; 4];
    reader.read_exact(&mut version)?;
    let found = u32::from_le_bytes(version);
    if found != VERSION {
        return Err(PersistError::VersionMismatch {
            expected: VERSION,
            found,
        });
    }

    bincode::deserialize_from(reader).map_err(PersistError::Decode)
}

/// Write the whole-index form to `path` atomically.
pub fn save_repo_index(path: &Path, index: &RepoIndex) -> Result<()> {
    atomic_write(path, |writer| {
        write_repo_index(writer, index)
            .with_context(|| format!("failed to encode index to {}", path.display()))
    })
}

/// Load the whole-index form from `path`.
pub fn load_repo_index(path: &Path) -> Result<RepoIndex> {
    let file =
        File::open(path).with_context(|| format!("failed to open index {}", path.display()))?;
    let mut reader = BufReader::new(file);
    read_repo_index(&mut reader)
        .with_context(|| format!("failed to decode index {}", path.display()))
}

/// Encode a blob sequence as the framed form; returns bytes written.
pub fn write_framed<W: Write>(writer: &mut W, blobs: &[BlobIndex]) -> Result<u64, PersistError> {
    let mut written = 0u64;
    for blob in blobs {
        written += blob.write_frame(writer)?;
    }
    Ok(written)
}

/// Decode a framed stream until end-of-file.
pub fn read_framed<R: Read>(reader: &mut R) -> Result<Vec<BlobIndex>, PersistError> {
    let mut blobs = Vec::new();
    while let Some(blob) = BlobIndex::read_frame(reader)? {
        blobs.push(blob);
    }
    Ok(blobs)
}

/// Write the framed form to `path` atomically.
pub fn save_framed(path: &Path, blobs: &[BlobIndex]) -> Result<()> {
    atomic_write(path, |writer| {
        write_framed(writer, blobs)
            .with_context(|| format!("failed to write frames to {}", path.display()))?;
        Ok(())
    })
}

/// Load the framed form from `path`.
pub fn load_framed(path: &Path) -> Result<Vec<BlobIndex>> {
    let file =
        File::open(path).with_context(|| format!("failed to open frames {}", path.display()))?;
    let mut reader = BufReader::new(file);
    read_framed(&mut reader)
        .with_context(|| format!("failed to decode frames {}", path.display()))
}

/// Build an index and stream its frames straight to `output`, without
/// holding every filter in memory at once. Returns the blob count.
pub fn build_framed_index(
    fs: &dyn FileSystem,
    config: &IndexConfig,
    progress: &dyn Progress,
    output: &Path,
) -> Result<usize> {
    atomic_write_value(output, |writer| {
        scan_repository(fs, config, progress, |rx| {
            let mut count = 0usize;
            for blob in rx {
                blob.write_frame(writer)
                    .with_context(|| format!("failed to write frame for {}", blob.path))?;
                count += 1;
            }
            Ok(count)
        })?
    })
}

/// Run `write` against a buffered temp sibling of `path`, then rename
/// the result into place. The temp file is removed on failure.
fn atomic_write(path: &Path, write: impl FnOnce(&mut BufWriter<File>) -> Result<()>) -> Result<()> {
    atomic_write_value(path, |writer| write(writer).map(|()| ()))
}

fn atomic_write_value<T>(
    path: &Path,
    write: impl FnOnce(&mut BufWriter<File>) -> Result<T>,
) -> Result<T> {
    if path.is_dir() {
        bail!("refusing to overwrite directory {}", path.display());
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }

    let tmp = temp_sibling(path);
    let file = File::create(&tmp)
        .with_context(|| format!("failed to create temp file {}", tmp.display()))?;
    let mut writer = BufWriter::new(file);

    let finish = |mut writer: BufWriter<File>, value: T| -> Result<T> {
        writer
            .flush()
            .with_context(|| format!("failed to flush {}", tmp.display()))?;
        drop(writer);
        fs::rename(&tmp, path)
            .with_context(|| format!("failed to move index into place at {}", path.display()))?;
        Ok(value)
    };

    match write(&mut writer) {
        Ok(value) => finish(writer, value),
        Err(err) => {
            drop(writer);
            let _ = fs::remove_file(&tmp);
            Err(err)
        }
    }
}

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "index".to_string());
    path.with_file_name(format!(".{}.{}.tmp", name, std::process::id()))
}
