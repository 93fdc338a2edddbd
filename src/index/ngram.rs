//! N-gram encoding and extraction.
//!
//! An n-gram packs one, two, or three codepoints as 7-bit units into a
//! `u64`, with the arity recorded in the top two bits:
//!
//! ```text
//! unigram  c0                                 tag 00
//! bigram   c0 | c1 << 7                       tag 10
//! trigram  c0 | c1 << 7 | c2 << 14            tag 11
//! ```
//!
//! The tag keeps n-grams of different arities from ever colliding.
//! Codepoints above 127 spill past their 7-bit slot; a high codepoint
//! still survives as a full-value unigram, so the aliasing only inflates
//! the false-positive rate slightly on non-ASCII text.
//!
//! Extraction uses hybrid storage: all-ASCII n-grams land in a fixed
//! 256 KiB bitset indexed by their untagged packed value, everything
//! else in a hash set. The bitset turns the flood of small repeated
//! values a source file produces into single bit writes.

use crate::index::types::{Ngram, ASCII_DENSE};
use ahash::AHashSet;

/// Arity tag of a bigram (`0b10` in the top two bits).
const BIGRAM_TAG: u64 = 2 << 62;
/// Arity tag of a trigram (`0b11` in the top two bits).
const TRIGRAM_TAG: u64 = 3 << 62;
/// Mask selecting the arity tag bits.
pub const ARITY_MASK: u64 = 3 << 62;

const ASCII_MAX: u64 = 128;
const DENSE_WORDS: usize = (ASCII_DENSE as usize) / 64;

/// Number of codepoints packed into an n-gram: 1, 2, or 3.
#[inline]
pub fn arity(gram: Ngram) -> u8 {
    match gram & ARITY_MASK {
        TRIGRAM_TAG => 3,
        BIGRAM_TAG => 2,
        _ => 1,
    }
}

#[inline]
fn unigram(c0: u64) -> Ngram {
    c0
}

#[inline]
fn bigram(c1: u64, c0: u64) -> Ngram {
    c0 | (c1 << 7) | BIGRAM_TAG
}

#[inline]
fn trigram(c2: u64, c1: u64, c0: u64) -> Ngram {
    c0 | (c1 << 7) | (c2 << 14) | TRIGRAM_TAG
}

/// Fixed-capacity bitset over the ASCII-dense n-gram region.
///
/// One 256 KiB allocation covers every all-ASCII 1-, 2-, and 3-gram.
/// Much faster than a hash set for the small repeated values that
/// dominate source text, and reusable across files: draining clears the
/// bits as it collects them.
pub struct DenseBitset {
    words: Vec<u64>,
}

impl DenseBitset {
    pub fn new() -> Self {
        Self {
            words: vec![0u64; DENSE_WORDS],
        }
    }

    #[inline]
    fn set(&mut self, slot: u64) {
        self.words[(slot >> 6) as usize] |= 1u64 << (slot & 63);
    }

    /// Number of bits currently set.
    pub fn count(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Append every stored n-gram to `keys` with its arity tag restored,
    /// clearing the bitset as it goes so the allocation can be reused
    /// for the next file.
    pub fn drain_into(&mut self, keys: &mut Vec<Ngram>) {
        for (word_idx, word) in self.words.iter_mut().enumerate() {
            if *word == 0 {
                continue;
            }
            let base = (word_idx as u64) << 6;
            let mut w = *word;
            while w != 0 {
                let slot = base | w.trailing_zeros() as u64;
                keys.push(restore_tag(slot));
                w &= w - 1;
            }
            *word = 0;
        }
    }
}

impl Default for DenseBitset {
    fn default() -> Self {
        Self::new()
    }
}

/// Untagged dense slots partition by arity: unigrams below 2^7, bigrams
/// in [2^7, 2^14), trigrams in [2^14, 2^21). The routing rules in
/// [`scan`] guarantee no other value lands in each range.
#[inline]
fn restore_tag(slot: u64) -> Ngram {
    if slot < 1 << 7 {
        slot
    } else if slot < 1 << 14 {
        slot | BIGRAM_TAG
    } else {
        slot | TRIGRAM_TAG
    }
}

/// Slide a 3-codepoint window over `text`, recording every distinct
/// well-formed 1-, 2-, and 3-gram.
///
/// An n-gram goes to the dense bitset (when one is provided) only if all
/// of its codepoints are ASCII and its leading codepoint is non-NUL;
/// those constraints keep the untagged slot ranges arity-disjoint so
/// [`DenseBitset::drain_into`] can restore exact tags. Everything else
/// goes to `sparse` fully tagged.
pub fn scan(text: &str, sparse: &mut AHashSet<Ngram>, mut dense: Option<&mut DenseBitset>) {
    let mut c1: u64 = 0;
    let mut c2: u64 = 0;
    for (i, ch) in text.chars().enumerate() {
        let c0 = ch as u64;

        match dense.as_deref_mut() {
            Some(d) if c0 < ASCII_MAX => d.set(c0),
            _ => {
                sparse.insert(unigram(c0));
            }
        }

        if i >= 1 {
            match dense.as_deref_mut() {
                Some(d) if c0 < ASCII_MAX && (1..ASCII_MAX).contains(&c1) => {
                    d.set(c0 | (c1 << 7));
                }
                _ => {
                    sparse.insert(bigram(c1, c0));
                }
            }
        }

        if i >= 2 {
            match dense.as_deref_mut() {
                Some(d) if c0 < ASCII_MAX && c1 < ASCII_MAX && (1..ASCII_MAX).contains(&c2) => {
                    d.set(c0 | (c1 << 7) | (c2 << 14));
                }
                _ => {
                    sparse.insert(trigram(c2, c1, c0));
                }
            }
        }

        c2 = c1;
        c1 = c0;
    }
}

/// The distinct n-grams of one text, split across the hybrid storages.
/// An n-gram lives in exactly one of the two.
pub struct NgramSet {
    pub sparse: AHashSet<Ngram>,
    pub dense: Option<DenseBitset>,
}

impl NgramSet {
    /// Extract the n-gram set of `text`. With `use_dense` the ASCII
    /// region is tracked in the bitset; without it everything lands in
    /// the sparse set. Both modes yield the same union.
    pub fn extract(text: &str, use_dense: bool) -> Self {
        let mut sparse = AHashSet::new();
        let mut dense = use_dense.then(DenseBitset::new);
        scan(text, &mut sparse, dense.as_mut());
        Self { sparse, dense }
    }

    pub fn len(&self) -> usize {
        self.sparse.len() + self.dense.as_ref().map_or(0, DenseBitset::count)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Merge both storages into one deduplicated key array: sparse keys
    /// first, then the dense bits with their tags restored.
    pub fn into_keys(mut self) -> Vec<Ngram> {
        let mut keys: Vec<Ngram> = self.sparse.drain().collect();
        if let Some(dense) = self.dense.as_mut() {
            dense.drain_into(&mut keys);
        }
        keys
    }
}
