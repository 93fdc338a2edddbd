//! Query derivation and filter probing.

pub mod engine;
pub mod ngrams;

pub use engine::{blob_matches, paths_matching_query, paths_matching_query_sync};
pub use ngrams::collect_query_ngrams;
