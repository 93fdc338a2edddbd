//! Summary statistics over a loaded index.

use crate::index::types::RepoIndex;
use anyhow::Result;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct IndexStats {
    pub dir: String,
    pub blob_count: usize,
    /// Blobs whose filter construction failed; they never match.
    pub missing_filters: usize,
    pub fingerprint_bytes: u64,
    pub mean_filter_bytes: f64,
}

impl IndexStats {
    pub fn collect(index: &RepoIndex) -> Self {
        let blob_count = index.blobs.len();
        let missing_filters = index.blobs.iter().filter(|b| b.filter.is_none()).count();
        let fingerprint_bytes: u64 = index
            .blobs
            .iter()
            .filter_map(|b| b.filter.as_ref())
            .map(|f| f.fingerprint_bytes() as u64)
            .sum();
        let with_filters = blob_count - missing_filters;
        let mean_filter_bytes = if with_filters > 0 {
            fingerprint_bytes as f64 / with_filters as f64
        } else {
            0.0
        };

        Self {
            dir: index.dir.clone(),
            blob_count,
            missing_filters,
            fingerprint_bytes,
            mean_filter_bytes,
        }
    }
}

/// Print stats as a short report, or as JSON for scripting.
pub fn print_stats(index: &RepoIndex, json: bool) -> Result<()> {
    let stats = IndexStats::collect(index);
    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("Index of: {}", stats.dir);
    println!("  Files indexed:     {}", stats.blob_count);
    println!("  Missing filters:   {}", stats.missing_filters);
    println!(
        "  Filter data:       {:.1} MB",
        stats.fingerprint_bytes as f64 / 1024.0 / 1024.0
    );
    println!("  Mean filter size:  {:.0} bytes", stats.mean_filter_bytes);
    Ok(())
}
