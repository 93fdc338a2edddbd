//! Index construction and storage.
//!
//! One probabilistic filter per file: the builder extracts the distinct
//! 1-, 2-, and 3-grams of each text file and packs them into a binary
//! fuse filter. A query later derives its own n-grams and tests every
//! file's filter conjunctively, shrinking the candidate set from the
//! whole tree to a shortlist worth scanning.
//!
//! - [`ngram`] - n-gram encoding and hybrid dense/sparse extraction
//! - [`filter`] - the per-file binary fuse filter
//! - [`blob`] - one file's index entry and its framed wire format
//! - [`build`] - parallel batched construction over a [`crate::fs::FileSystem`]
//! - [`persist`] - whole-index and framed on-disk forms
//! - [`stats`] - index statistics
//! - [`types`] - shared types and normative constants

pub mod blob;
pub mod build;
pub mod filter;
pub mod ngram;
pub mod persist;
pub mod stats;
pub mod types;

pub use blob::BlobIndex;
pub use build::build_repo_index;
pub use filter::NgramFilter;
pub use types::{IndexConfig, RepoIndex};
