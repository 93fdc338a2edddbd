//! Per-file approximate membership filter.
//!
//! Binary fuse filters are static: populated once from a key set, then
//! queried forever. They have no false negatives and land around 0.4%
//! false positives at roughly 9 bits per key, comfortably under the 1%
//! target. The filter is opaque to the rest of the crate; only
//! construction and [`NgramFilter::contains`] matter.

use crate::error::FilterBuildError;
use crate::index::types::Ngram;
use serde::{Deserialize, Serialize};
use xorf::{BinaryFuse8, Filter};

/// Immutable membership filter over one file's n-gram keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NgramFilter(BinaryFuse8);

impl NgramFilter {
    /// Populate a filter from a key set.
    ///
    /// Keys are sorted and deduplicated first; the fuse construction
    /// rejects duplicate keys outright.
    pub fn build(mut keys: Vec<Ngram>) -> Result<Self, FilterBuildError> {
        keys.sort_unstable();
        keys.dedup();
        if keys.is_empty() {
            return Err(FilterBuildError {
                reason: "empty key set",
            });
        }
        BinaryFuse8::try_from(keys.as_slice())
            .map(Self)
            .map_err(|reason| FilterBuildError { reason })
    }

    /// Whether `gram` may be present. `false` is definitive.
    #[inline]
    pub fn contains(&self, gram: Ngram) -> bool {
        self.0.contains(&gram)
    }

    /// Size of the fingerprint array backing the filter, in bytes.
    pub fn fingerprint_bytes(&self) -> usize {
        self.0.len()
    }
}
