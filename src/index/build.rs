//! Parallel construction of a repository index.
//!
//! Files are sharded into batches that run on rayon worker tasks; each
//! batch processes its files sequentially and reuses one extraction
//! scratch, so allocation stays bounded per worker. Finished blobs flow
//! through a channel whose capacity equals the total file count, so
//! producers never block on the consumer. Blob order is arrival order
//! and is not stable across runs.

use crate::fs::FileSystem;
use crate::index::blob::BlobIndex;
use crate::index::filter::NgramFilter;
use crate::index::ngram::{scan, DenseBitset};
use crate::index::types::{IndexConfig, Ngram, RepoIndex};
use crate::utils::is_binary;
use crate::utils::progress::Progress;
use ahash::AHashSet;
use anyhow::{Context, Result};
use std::sync::mpsc::{Receiver, SyncSender};

/// Per-worker extraction scratch, reused across the files of one batch.
struct BatchScratch {
    sparse: AHashSet<Ngram>,
    dense: DenseBitset,
}

impl BatchScratch {
    fn new() -> Self {
        Self {
            sparse: AHashSet::new(),
            dense: DenseBitset::new(),
        }
    }
}

/// Run the per-file pipeline: read, gate on size and binary content,
/// extract, build the filter. `None` means the file is skipped outright;
/// a blob with no filter records a construction failure.
fn index_file(
    fs: &dyn FileSystem,
    name: &str,
    config: &IndexConfig,
    scratch: &mut BatchScratch,
) -> Option<BlobIndex> {
    let bytes = match fs.read_relative_filename(name) {
        Ok(bytes) => bytes,
        Err(err) => {
            log::warn!("skipping {name}: {err:#}");
            return None;
        }
    };
    if bytes.is_empty() || bytes.len() > config.max_file_size {
        return None;
    }
    if is_binary(&bytes) {
        return None;
    }

    let text = String::from_utf8_lossy(&bytes);
    scan(&text, &mut scratch.sparse, Some(&mut scratch.dense));

    // Sparse keys first, then the dense bits; draining both leaves the
    // scratch empty for the next file.
    let mut keys: Vec<Ngram> = scratch.sparse.drain().collect();
    scratch.dense.drain_into(&mut keys);

    let filter = match NgramFilter::build(keys) {
        Ok(filter) => Some(filter),
        Err(err) => {
            log::warn!("{name}: {err}");
            None
        }
    };
    Some(BlobIndex::new(name, filter))
}

/// Enumerate the repository, fan the files out to batch workers, and
/// hand the receiving end of the blob channel to `consume`, which runs
/// on the calling thread concurrently with the workers.
pub(crate) fn scan_repository<T: Send>(
    fs: &dyn FileSystem,
    config: &IndexConfig,
    progress: &dyn Progress,
    consume: impl FnOnce(Receiver<BlobIndex>) -> T + Send,
) -> Result<T> {
    let filenames = fs
        .list_relative_filenames()
        .context("failed to enumerate repository files")?;

    eprintln!("DEBUG: filenames={:?}", filenames);
    let (tx, rx) = std::sync::mpsc::sync_channel(filenames.len().max(1));

    let result = rayon::scope(|scope| {
        for batch in filenames.chunks(config.batch_size.max(1)) {
            eprintln!("DEBUG: spawning batch of {}", batch.len());
            let tx: SyncSender<BlobIndex> = tx.clone();
            scope.spawn(move |_| {
                eprintln!("DEBUG: worker started");
                let mut scratch = BatchScratch::new();
                for name in batch {
                    eprintln!("DEBUG: indexing {name}");
                    let blob = index_file(fs, name, config, &mut scratch);
                    eprintln!("DEBUG: indexed {name}, got blob={}", blob.is_some());
                    progress.add(1);
                    if let Some(blob) = blob {
                        // Capacity covers every file; a send only fails
                        // if the consumer has gone away.
                        eprintln!("DEBUG: sending blob for {name}");
                        let _ = tx.send(blob);
                        eprintln!("DEBUG: sent blob for {name}");
                    }
                }
                eprintln!("DEBUG: worker done");
            });
        }
        eprintln!("DEBUG: dropping tx");
        drop(tx);
        eprintln!("DEBUG: calling consume");
        let r = consume(rx);
        eprintln!("DEBUG: consume done");
        r
    });

    eprintln!("DEBUG: scope done");
    Ok(result)
}

/// Index every file under `fs` into an in-memory [`RepoIndex`].
///
/// Per-file read failures are logged and skipped; only a failed listing
/// aborts the build.
pub fn build_repo_index(
    fs: &dyn FileSystem,
    dir: &str,
    config: &IndexConfig,
    progress: &dyn Progress,
) -> Result<RepoIndex> {
    let blobs = scan_repository(fs, config, progress, |rx| rx.into_iter().collect())?;
    Ok(RepoIndex::new(dir, blobs))
}
