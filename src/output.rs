//! Candidate verification and result printing.
//!
//! Filter probing only narrows; the shortlist still has to be scanned
//! for the literal query, both to find line numbers and to drop the
//! filters' false positives. The false-positive count surfaces in the
//! summary so the filter quality stays observable.

use crate::fs::FileSystem;
use crate::index::types::RepoIndex;
use crate::query::paths_matching_query;
use anyhow::Result;
use memchr::memmem;
use std::io::Write;
use std::time::Instant;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// One verified line match.
#[derive(Debug, Clone)]
pub struct LineMatch {
    pub path: String,
    /// 1-based line number.
    pub line_number: u32,
    /// Byte offset of the match within the line.
    pub column: usize,
    pub line: String,
}

/// Outcome counters for a verified search.
#[derive(Debug, Clone, Default)]
pub struct GrepSummary {
    /// Candidates whose contents really contain the query.
    pub matched_files: usize,
    /// Candidates the filters let through that the scan rejected.
    pub false_positives: usize,
    /// Total matching lines across all files.
    pub total_matches: u64,
    pub elapsed_ms: u128,
}

impl GrepSummary {
    /// Share of candidates that were false positives. Bounded by the
    /// filters' false-positive rate in expectation.
    pub fn false_positive_ratio(&self) -> f64 {
        let candidates = self.matched_files + self.false_positives;
        self.false_positives as f64 / (candidates.max(1)) as f64
    }
}

/// Verified search results.
#[derive(Debug, Default)]
pub struct SearchOutcome {
    pub matches: Vec<LineMatch>,
    pub summary: GrepSummary,
}

/// Probe the filters, then verify each candidate with a literal line
/// scan. Candidate files that fail to read are skipped.
pub fn search(index: &RepoIndex, fs: &dyn FileSystem, query: &str) -> Result<SearchOutcome> {
    let start = Instant::now();
    let finder = memmem::Finder::new(query.as_bytes());
    let mut outcome = SearchOutcome::default();

    for path in paths_matching_query(index, query) {
        let bytes = match fs.read_relative_filename(&path) {
            Ok(bytes) => bytes,
            Err(err) => {
                log::warn!("skipping candidate {path}: {err:#}");
                continue;
            }
        };
        let text = String::from_utf8_lossy(&bytes);

        let mut file_matches = 0u64;
        for (line_idx, line) in text.lines().enumerate() {
            if let Some(column) = finder.find(line.as_bytes()) {
                file_matches += 1;
                outcome.matches.push(LineMatch {
                    path: path.clone(),
                    line_number: (line_idx + 1) as u32,
                    column,
                    line: line.to_string(),
                });
            }
        }

        if file_matches > 0 {
            outcome.summary.matched_files += 1;
            outcome.summary.total_matches += file_matches;
        } else {
            log::debug!("false positive: {path}");
            outcome.summary.false_positives += 1;
        }
    }

    outcome.summary.elapsed_ms = start.elapsed().as_millis();
    Ok(outcome)
}

/// Print options for [`print_matches`].
#[derive(Debug, Clone, Copy)]
pub struct PrintOptions {
    /// Only print each matching file once.
    pub files_only: bool,
    pub color: bool,
}

/// Print verified matches in `path:line:col` grep style with the match
/// highlighted.
pub fn print_matches(outcome: &SearchOutcome, query: &str, opts: PrintOptions) -> Result<()> {
    let choice = if opts.color {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    let mut stdout = StandardStream::stdout(choice);

    if opts.files_only {
        let mut last: Option<&str> = None;
        for m in &outcome.matches {
            if last != Some(m.path.as_str()) {
                writeln!(stdout, "{}", m.path)?;
                last = Some(m.path.as_str());
            }
        }
        return Ok(());
    }

    for m in &outcome.matches {
        print_match_line(&mut stdout, m, query.len())?;
    }
    Ok(())
}

fn print_match_line(
    stdout: &mut StandardStream,
    m: &LineMatch,
    query_len: usize,
) -> std::io::Result<()> {
    stdout.set_color(ColorSpec::new().set_fg(Some(Color::Magenta)))?;
    write!(stdout, "{}", m.path)?;
    stdout.reset()?;
    write!(stdout, ":")?;

    stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
    write!(stdout, "{}", m.line_number)?;
    stdout.reset()?;
    write!(stdout, ":")?;

    let bytes = m.line.as_bytes();
    let start = m.column.min(bytes.len());
    let end = (m.column + query_len).min(bytes.len());

    write!(stdout, "{}", String::from_utf8_lossy(&bytes[..start]))?;
    stdout.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
    write!(stdout, "{}", String::from_utf8_lossy(&bytes[start..end]))?;
    stdout.reset()?;
    writeln!(stdout, "{}", String::from_utf8_lossy(&bytes[end..]))?;

    Ok(())
}

/// One-line summary: match counts, false-positive ratio, elapsed time.
pub fn print_summary(summary: &GrepSummary, query: &str) {
    eprintln!(
        "query '{}': {} matches in {} files ({} false positives, fpr {:.4}) in {}ms",
        query,
        summary.total_matches,
        summary.matched_files,
        summary.false_positives,
        summary.false_positive_ratio(),
        summary.elapsed_ms,
    );
}
