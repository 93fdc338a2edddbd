//! Conjunctive filter probing across a repository's blobs.
//!
//! Every query n-gram must hit a blob's filter for the blob to match;
//! the first miss rejects it. Filters have no false negatives, so a file
//! that really contains the query always survives; the cost is a small
//! share of false positives that the verification scan weeds out later.

use crate::index::blob::BlobIndex;
use crate::index::types::{Ngram, RepoIndex, QUERY_BATCH};
use crate::query::ngrams::collect_query_ngrams;
use std::sync::mpsc::{self, Receiver};

/// Test one blob against already-derived query n-grams.
///
/// A blob without a filter never matches, and neither does an empty
/// n-gram list (a degenerate query matches nothing rather than
/// everything).
pub fn blob_matches(blob: &BlobIndex, grams: &[Ngram]) -> bool {
    let Some(filter) = blob.filter.as_ref() else {
        return false;
    };
    if grams.is_empty() {
        return false;
    }
    grams.iter().all(|&gram| filter.contains(gram))
}

fn match_batch(grams: &[Ngram], batch: &[BlobIndex], mut on_match: impl FnMut(&str)) {
    for blob in batch {
        if blob_matches(blob, grams) {
            on_match(&blob.path);
        }
    }
}

/// Sequential matcher; paths come back in blob order.
pub fn paths_matching_query_sync(index: &RepoIndex, query: &str) -> Vec<String> {
    let grams = collect_query_ngrams(query);
    let mut paths = Vec::new();
    match_batch(&grams, &index.blobs, |path| paths.push(path.to_string()));
    paths
}

/// Parallel matcher over batches of [`QUERY_BATCH`] blobs.
///
/// The returned channel already holds every match; its capacity equals
/// the blob count so no producer ever blocked on it. Path order is
/// arrival order and not stable across runs.
pub fn paths_matching_query(index: &RepoIndex, query: &str) -> Receiver<String> {
    let grams = collect_query_ngrams(query);
    let (tx, rx) = mpsc::sync_channel(index.blobs.len().max(1));

    rayon::scope(|scope| {
        for batch in index.blobs.chunks(QUERY_BATCH) {
            let tx = tx.clone();
            let grams = &grams;
            scope.spawn(move |_| {
                match_batch(grams, batch, |path| {
                    let _ = tx.send(path.to_string());
                });
            });
        }
    });
    drop(tx);

    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MemoryFileSystem;
    use crate::index::build::build_repo_index;
    use crate::index::types::IndexConfig;
    use crate::utils::progress::NoProgress;
    use std::collections::BTreeSet;

    fn build(files: &[(&str, &str)]) -> RepoIndex {
        let fs: MemoryFileSystem = files.iter().copied().collect();
        build_repo_index(&fs, "/repo", &IndexConfig::default(), &NoProgress).unwrap()
    }

    fn matching_paths(index: &RepoIndex, query: &str) -> BTreeSet<String> {
        paths_matching_query(index, query).into_iter().collect()
    }

    #[test]
    fn test_hello_goodbye_corpus() {
        let index = build(&[("a.txt", "hello world"), ("b.txt", "goodbye")]);

        assert_eq!(matching_paths(&index, "hello"), BTreeSet::from(["a.txt".to_string()]));
        assert_eq!(matching_paths(&index, "bye"), BTreeSet::from(["b.txt".to_string()]));
        assert!(matching_paths(&index, "xyz").is_empty());
    }

    #[test]
    fn test_empty_query_matches_nothing() {
        let index = build(&[("a.txt", "hello world")]);
        assert!(matching_paths(&index, "").is_empty());
        assert!(paths_matching_query_sync(&index, "").is_empty());
    }

    #[test]
    fn test_short_queries_match() {
        let index = build(&[("a.txt", "hello world"), ("b.txt", "goodbye")]);
        // One and two codepoint queries use uni/bigrams only.
        assert!(matching_paths(&index, "w").contains("a.txt"));
        assert_eq!(matching_paths(&index, "db"), BTreeSet::from(["b.txt".to_string()]));
    }

    #[test]
    fn test_absent_filter_never_matches() {
        let blob = BlobIndex::new("broken.txt", None);
        assert!(!blob_matches(&blob, &collect_query_ngrams("anything")));
    }

    #[test]
    fn test_sync_and_parallel_agree() {
        let files: Vec<(String, String)> = (0..300)
            .map(|i| {
                let body = if i % 3 == 0 {
                    format!("needle in file {i}")
                } else {
                    format!("just hay in file {i}")
                };
                (format!("f{i}.txt"), body)
            })
            .collect();
        let fs: MemoryFileSystem = files.into_iter().collect();
        let index = build_repo_index(&fs, "/repo", &IndexConfig::default(), &NoProgress).unwrap();

        let sync: BTreeSet<String> = paths_matching_query_sync(&index, "needle").into_iter().collect();
        let parallel = matching_paths(&index, "needle");
        assert_eq!(sync, parallel);
        assert_eq!(sync.len(), 100);
    }

    #[test]
    fn test_no_false_negatives_for_substrings() {
        let text = "fn parse_config(path: &Path) -> Result<Config> { read(path) }";
        let index = build(&[("config.rs", text)]);
        for query in ["parse_config", "&Path", "Result<Config>", "read(path)", "fn "] {
            assert!(
                matching_paths(&index, query).contains("config.rs"),
                "query {query:?} must match its own source file"
            );
        }
    }

    #[test]
    fn test_identical_files_match_identically() {
        let index = build(&[("one.txt", "shared body"), ("two.txt", "shared body")]);
        assert_eq!(
            matching_paths(&index, "shared"),
            BTreeSet::from(["one.txt".to_string(), "two.txt".to_string()])
        );
    }
}
