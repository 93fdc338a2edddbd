//! End-to-end tests: build over an in-memory tree, query, verify, and
//! round-trip through both on-disk forms.

use skipgrep::fs::{FileSystem, MemoryFileSystem};
use skipgrep::index::build_repo_index;
use skipgrep::index::persist;
use skipgrep::index::types::{IndexConfig, RepoIndex, MAX_FILE_SIZE};
use skipgrep::output;
use skipgrep::query::paths_matching_query;
use skipgrep::utils::progress::NoProgress;
use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

fn build(fs: &MemoryFileSystem) -> RepoIndex {
    build_repo_index(fs, "/repo", &IndexConfig::default(), &NoProgress).unwrap()
}

fn matching(index: &RepoIndex, query: &str) -> BTreeSet<String> {
    paths_matching_query(index, query).into_iter().collect()
}

fn temp_file(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("skipgrep_it_{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    dir.join(name)
}

#[test]
fn queries_resolve_to_the_right_files() {
    let fs: MemoryFileSystem =
        [("a.txt", "hello world"), ("b.txt", "goodbye")].into_iter().collect();
    let index = build(&fs);

    assert_eq!(matching(&index, "hello"), BTreeSet::from(["a.txt".to_string()]));
    assert_eq!(matching(&index, "bye"), BTreeSet::from(["b.txt".to_string()]));
    assert!(matching(&index, "xyz").is_empty());
}

#[test]
fn oversize_files_are_left_out() {
    let mut fs = MemoryFileSystem::new();
    fs.insert("huge.txt", vec![b'x'; 2 * MAX_FILE_SIZE]);
    fs.insert("small.txt", "tiny file!");
    let index = build(&fs);

    let paths: Vec<_> = index.blobs.iter().map(|b| b.path.as_str()).collect();
    assert_eq!(paths, vec!["small.txt"]);
}

#[test]
fn redundant_query_stays_precise() {
    // One real match buried under thousands of files sharing the query's
    // long common prefix. The conjunctive probe must reject nearly all
    // of them; verification must reject the rest.
    let needle = "bugzilla.redhat.com/show_bug.cgi?id=726143";
    let mut fs = MemoryFileSystem::new();
    fs.insert("real.txt", format!("see {needle} for details"));
    for i in 0..2_000 {
        fs.insert(
            format!("noise/{i:04}.txt"),
            format!("see bugzilla.redhat.com for details, ticket {i}"),
        );
    }

    let index = build(&fs);
    let outcome = output::search(&index, &fs, needle).unwrap();

    let matched: BTreeSet<_> = outcome.matches.iter().map(|m| m.path.clone()).collect();
    assert_eq!(matched, BTreeSet::from(["real.txt".to_string()]));
    assert!(
        outcome.summary.false_positive_ratio() <= 0.02,
        "false positive ratio {} too high",
        outcome.summary.false_positive_ratio()
    );
}

#[test]
fn whole_index_form_roundtrips_through_disk() {
    let fs: MemoryFileSystem = [
        ("src/lib.rs", "pub fn alpha() {}"),
        ("src/main.rs", "fn main() { alpha(); }"),
        ("README.md", "# alpha\nbeta gamma"),
    ]
    .into_iter()
    .collect();
    let index = build(&fs);

    let path = temp_file("whole.idx");
    persist::save_repo_index(&path, &index).unwrap();
    let reloaded = persist::load_repo_index(&path).unwrap();
    fs::remove_file(&path).unwrap();

    assert_eq!(reloaded.dir, index.dir);
    for query in ["alpha", "beta gamma", "fn main", "missing-term"] {
        assert_eq!(
            matching(&index, query),
            matching(&reloaded, query),
            "query {query:?} differs after reload"
        );
    }
}

#[test]
fn framed_form_roundtrips_through_disk() {
    let fs: MemoryFileSystem = [
        ("one.txt", "the first file"),
        ("two.txt", "the second file"),
    ]
    .into_iter()
    .collect();
    let index = build(&fs);

    let path = temp_file("stream.frames");
    persist::save_framed(&path, &index.blobs).unwrap();
    let blobs = persist::load_framed(&path).unwrap();
    fs::remove_file(&path).unwrap();

    let reloaded = RepoIndex::new(index.dir.clone(), blobs);
    assert_eq!(index.blobs.len(), reloaded.blobs.len());
    for query in ["first", "second", "the", "absent"] {
        assert_eq!(matching(&index, query), matching(&reloaded, query));
    }
}

#[test]
fn streaming_build_agrees_with_in_memory_build() {
    let mut mem = MemoryFileSystem::new();
    for i in 0..120 {
        mem.insert(format!("f{i}.txt"), format!("file number {i} of the corpus"));
    }

    let path = temp_file("streamed.frames");
    let count = persist::build_framed_index(&mem, &IndexConfig::default(), &NoProgress, &path)
        .unwrap();
    let blobs = persist::load_framed(&path).unwrap();
    fs::remove_file(&path).unwrap();

    assert_eq!(count, 120);
    let streamed = RepoIndex::new("/repo", blobs);
    let direct = build(&mem);
    assert_eq!(matching(&direct, "corpus"), matching(&streamed, "corpus"));
    assert_eq!(matching(&direct, "number 7 "), matching(&streamed, "number 7 "));
}

#[test]
fn rebuilds_agree_as_sets() {
    let mut mem = MemoryFileSystem::new();
    for i in 0..250 {
        mem.insert(format!("src/mod{i}.rs"), format!("pub fn handler_{i}() {{}}"));
    }

    let a = build(&mem);
    let b = build(&mem);

    let mut paths_a: Vec<_> = a.blobs.iter().map(|blob| blob.path.clone()).collect();
    let mut paths_b: Vec<_> = b.blobs.iter().map(|blob| blob.path.clone()).collect();
    paths_a.sort();
    paths_b.sort();
    assert_eq!(paths_a, paths_b);

    for query in ["handler_13", "pub fn", "nothing-here"] {
        assert_eq!(matching(&a, query), matching(&b, query));
    }
}

#[test]
fn binary_and_empty_files_never_surface() {
    let fs: MemoryFileSystem = [
        ("code.rs", b"fn live() {}".to_vec()),
        ("empty.rs", Vec::new()),
        ("blob.bin", b"\x00\x01\x02binary".to_vec()),
    ]
    .into_iter()
    .collect();
    let index = build(&fs);

    let paths: Vec<_> = index.blobs.iter().map(|b| b.path.as_str()).collect();
    assert_eq!(paths, vec!["code.rs"]);
}

#[test]
fn verification_reports_matches_with_positions() {
    let fs: MemoryFileSystem = [(
        "notes.txt",
        "first line\nthe needle is here\nlast line\n",
    )]
    .into_iter()
    .collect();
    let index = build(&fs);

    let outcome = output::search(&index, &fs, "needle").unwrap();
    assert_eq!(outcome.summary.matched_files, 1);
    assert_eq!(outcome.summary.total_matches, 1);
    assert_eq!(outcome.matches[0].line_number, 2);
    assert_eq!(outcome.matches[0].column, 4);
}

#[test]
fn duplicate_contents_yield_equivalent_filters() {
    let fs: MemoryFileSystem =
        [("a/copy.txt", "identical text"), ("b/copy.txt", "identical text")]
            .into_iter()
            .collect();
    let index = build(&fs);
    assert_eq!(index.blobs.len(), 2);

    // Filter equality is behavioral: both answer alike for present and
    // absent queries.
    for query in ["identical", "text", "dent", "not present"] {
        let matched = matching(&index, query);
        assert!(
            matched.len() != 1,
            "query {query:?} split identical files: {matched:?}"
        );
    }
}

#[test]
fn listing_error_aborts_the_build() {
    struct BrokenFs;
    impl FileSystem for BrokenFs {
        fn list_relative_filenames(&self) -> anyhow::Result<Vec<String>> {
            anyhow::bail!("listing failed")
        }
        fn read_relative_filename(&self, _name: &str) -> anyhow::Result<Vec<u8>> {
            unreachable!()
        }
    }

    let result = build_repo_index(&BrokenFs, "/repo", &IndexConfig::default(), &NoProgress);
    assert!(result.is_err());
}
