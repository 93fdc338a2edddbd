fn main() {
    let fs: skipgrep::fs::MemoryFileSystem = [("a.txt", "hello world"), ("b.txt", "goodbye")].into_iter().collect();
    eprintln!("about to build");
    let idx = skipgrep::index::build_repo_index(&fs, "/repo", &skipgrep::index::types::IndexConfig::default(), &skipgrep::utils::progress::NoProgress).unwrap();
    eprintln!("built: {} blobs", idx.blobs.len());
}
