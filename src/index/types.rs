use crate::index::blob::BlobIndex;
use serde::{Deserialize, Serialize};

/// A 1-, 2-, or 3-codepoint n-gram packed into 64 bits with its arity
/// recorded in the top two bits. See [`crate::index::ngram`] for the
/// encoding.
pub type Ngram = u64;

/// On-disk format version.
pub const VERSION: u32 = 1;

/// Target false-positive rate of the per-file filters. The binary fuse
/// construction comes in well under this (~0.4% observed).
pub const TARGET_FPR: f64 = 0.01;

/// Files larger than this are not indexed.
pub const MAX_FILE_SIZE: usize = 1 << 20;

/// Upper bound on the number of n-grams probed per query.
pub const MAX_QUERY_NGRAMS: usize = 100;

/// Size in bits of the dense region holding all-ASCII n-grams during
/// extraction. Every ASCII trigram packs below this cap.
pub const ASCII_DENSE: u64 = 1 << 21;

/// Files per build batch; batches run in parallel, files within a batch
/// sequentially.
pub const BUILD_BATCH: usize = 100;

/// Blobs per query batch.
pub const QUERY_BATCH: usize = 10_000;

/// Configuration for the repository indexer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Skip files larger than this many bytes.
    pub max_file_size: usize,
    /// Files handed to one worker task at a time.
    pub batch_size: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            max_file_size: MAX_FILE_SIZE,
            batch_size: BUILD_BATCH,
        }
    }
}

/// A built index over one repository: one probabilistic filter per
/// indexed file.
///
/// Write-once during build, read-only afterwards. Blob order is stable
/// within a single build but not across builds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoIndex {
    /// Repository root the relative blob paths resolve against.
    pub dir: String,
    pub blobs: Vec<BlobIndex>,
}

impl RepoIndex {
    pub fn new(dir: impl Into<String>, blobs: Vec<BlobIndex>) -> Self {
        Self {
            dir: dir.into(),
            blobs,
        }
    }
}
