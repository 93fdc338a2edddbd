//! A single file's indexed representation and its framed wire format.
//!
//! Frames are self-delimiting so a stream of them can be read back until
//! end-of-file:
//!
//! ```text
//! length  : u64 big-endian
//! payload : `length` bytes, bincode-encoded BlobIndex
//! ```
//!
//! A partial length or a payload shorter than declared is corruption,
//! not end-of-stream.

use crate::error::PersistError;
use crate::index::filter::NgramFilter;
use serde::{Deserialize, Serialize};
use std::io::{ErrorKind, Read, Write};

/// Largest frame payload the reader will allocate for. A filter for a
/// maximum-size file stays in the low megabytes; anything near this cap
/// is garbage, not data.
const MAX_FRAME_LEN: u64 = 64 * 1024 * 1024;

/// One indexed file: its repo-relative path and its n-gram filter.
///
/// The filter is `None` for files whose filter construction failed;
/// such a blob never matches a query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlobIndex {
    pub path: String,
    pub filter: Option<NgramFilter>,
}

impl BlobIndex {
    pub fn new(path: impl Into<String>, filter: Option<NgramFilter>) -> Self {
        Self {
            path: path.into(),
            filter,
        }
    }

    /// Write one frame; returns the number of bytes written.
    pub fn write_frame<W: Write>(&self, writer: &mut W) -> Result<u64, PersistError> {
        let payload = bincode::serialize(self).map_err(PersistError::Encode)?;
        writer.write_all(&(payload.len() as u64).to_be_bytes())?;
        writer.write_all(&payload)?;
        Ok(8 + payload.len() as u64)
    }

    /// Read one frame, or `Ok(None)` on a clean end-of-stream.
    pub fn read_frame<R: Read>(reader: &mut R) -> Result<Option<Self>, PersistError> {
        let mut len_buf = [0u8; 8];
        if !fill_or_eof(reader, &mut len_buf)? {
            return Ok(None);
        }
        let length = u64::from_be_bytes(len_buf);
        if length > MAX_FRAME_LEN {
            return Err(PersistError::OversizeFrame {
                length,
                max: MAX_FRAME_LEN,
            });
        }
        let mut payload = vec![0u8; length as usize];
        reader.read_exact(&mut payload).map_err(|_| PersistError::TruncatedFrame {
            reason: format!("payload shorter than declared length {length}"),
        })?;
        bincode::deserialize(&payload)
            .map(Some)
            .map_err(PersistError::Decode)
    }
}

/// Fill `buf` completely, returning `false` on a clean end-of-stream
/// (zero bytes available). Stopping partway through is a torn frame.
fn fill_or_eof<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<bool, PersistError> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) if filled == 0 => return Ok(false),
            Ok(0) => {
                return Err(PersistError::TruncatedFrame {
                    reason: format!("frame header cut short at {filled} bytes"),
                })
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(true)
}
