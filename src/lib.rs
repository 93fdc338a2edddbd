//! # skipgrep - n-gram filter index for fast literal search
//!
//! skipgrep narrows `grep`-style literal searches from hundreds of
//! thousands of files to a shortlist worth scanning. It builds one
//! binary fuse filter per file over the distinct unicode 1-, 2-, and
//! 3-grams of that file; a query derives the same n-grams and tests
//! every file's filter conjunctively. Filters have no false negatives,
//! so nothing real is ever skipped, and the few false positives fall
//! out of the verification scan.
//!
//! ## Architecture
//!
//! - [`index`] - n-gram extraction, per-file filters, parallel build,
//!   on-disk forms
//! - [`query`] - query n-gram derivation and filter probing
//! - [`output`] - verification scan and result printing
//! - [`fs`] - filesystem abstraction (OS-backed and in-memory)
//! - [`utils`] - binary sniffing, progress reporting, app data paths
//!
//! ## Quick start
//!
//! ```ignore
//! use skipgrep::fs::OsFileSystem;
//! use skipgrep::index::{build_repo_index, IndexConfig};
//! use skipgrep::query::paths_matching_query;
//! use skipgrep::utils::progress::NoProgress;
//!
//! let fs = OsFileSystem::new("/path/to/repo");
//! let index = build_repo_index(&fs, "/path/to/repo", &IndexConfig::default(), &NoProgress)?;
//!
//! for path in paths_matching_query(&index, "BinaryFuse") {
//!     println!("{path}");
//! }
//! ```

pub mod error;
pub mod fs;
pub mod index;
pub mod output;
pub mod query;
pub mod utils;
