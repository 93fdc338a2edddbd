//! Typed errors for filter construction and index persistence.

use thiserror::Error;

/// Binary fuse filter construction was rejected.
///
/// Per-file failures are never fatal to a build: the owning blob is
/// recorded without a filter and the build continues.
#[derive(Debug, Error)]
#[error("filter construction failed: {reason}")]
pub struct FilterBuildError {
    pub reason: &'static str,
}

/// Errors produced while encoding or decoding an index on disk.
#[derive(Debug, Error)]
pub enum PersistError {
    /// The file does not start with the index magic bytes.
    #[error("invalid magic bytes in index header")]
    BadMagic,

    /// The on-disk format version is not the one this build reads.
    #[error("index version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },

    /// A frame header or payload was cut short before its declared end.
    #[error("truncated frame: {reason}")]
    TruncatedFrame { reason: String },

    /// A frame declared a length beyond the reader's allocation cap.
    #[error("frame length {length} exceeds maximum {max}")]
    OversizeFrame { length: u64, max: u64 },

    #[error("encode failed: {0}")]
    Encode(#[source] bincode::Error),

    #[error("decode failed: {0}")]
    Decode(#[source] bincode::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
