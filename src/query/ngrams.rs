//! Query-side n-gram derivation.

use crate::index::ngram::{arity, NgramSet};
use crate::index::types::{Ngram, MAX_QUERY_NGRAMS};
use rand::Rng;

/// Derive the n-grams probed for `query`, highest arity first.
///
/// Trigrams narrow candidates fastest, so they go up front. Within one
/// arity the order is a fresh random permutation: a query like
/// `bugzilla.redhat.com/show_bug.cgi?id=726143` carries its selective
/// trigrams in the numeric tail, and probing the n-grams in text order
/// would keep testing the common prefix against every file before
/// reaching them. Shuffling spreads the early probes across the whole
/// query, so redundant candidates get rejected sooner. Capped at
/// [`MAX_QUERY_NGRAMS`], which keeps the highest-arity tier since the
/// sort runs first.
pub fn collect_query_ngrams(query: &str) -> Vec<Ngram> {
    let set = NgramSet::extract(query, false);
    let mut rng = rand::thread_rng();
    let mut grams: Vec<(Ngram, u8, u32)> = set
        .into_keys()
        .into_iter()
        .map(|gram| (gram, arity(gram), rng.gen()))
        .collect();

    grams.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
    grams.truncate(MAX_QUERY_NGRAMS);
    grams.into_iter().map(|(gram, _, _)| gram).collect()
}
