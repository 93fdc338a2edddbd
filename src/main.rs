use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use skipgrep::fs::{FileSystem, OsFileSystem};
use skipgrep::index::build_repo_index;
use skipgrep::index::persist;
use skipgrep::index::stats::print_stats;
use skipgrep::index::types::{IndexConfig, RepoIndex};
use skipgrep::output::{self, PrintOptions};
use skipgrep::utils::{default_index_path, find_repo_root, list_index_files, remove_index};
use std::path::{Path, PathBuf};

#[cfg(feature = "progress")]
use skipgrep::utils::progress::BarProgress;
#[cfg(not(feature = "progress"))]
use skipgrep::utils::progress::NoProgress;

#[derive(Parser)]
#[command(name = "skipgrep")]
#[command(about = "N-gram filter index for fast literal code search")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build an index for a directory
    Build {
        /// Directory to index (the enclosing git root is used)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output index file (defaults to the app data directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write the framed stream form instead of the whole-index form
        #[arg(long)]
        framed: bool,
    },
    /// Search an index for a literal query
    Grep {
        query: String,

        /// Repository to search (resolves the stored index)
        #[arg(short, long, default_value = ".")]
        path: PathBuf,

        /// Explicit index file, overriding the stored one
        #[arg(short, long)]
        index: Option<PathBuf>,

        /// Only print filenames
        #[arg(short = 'l', long)]
        files_with_matches: bool,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },
    /// Show statistics for an index
    Stats {
        #[arg(short, long, default_value = ".")]
        path: PathBuf,

        #[arg(short, long)]
        index: Option<PathBuf>,

        #[arg(long)]
        json: bool,
    },
    /// Re-encode a whole-index file as a framed stream
    Export { index: PathBuf, frames: PathBuf },
    /// Assemble a whole-index file from a framed stream
    Import {
        frames: PathBuf,
        index: PathBuf,

        /// Repository root recorded in the output index
        #[arg(long)]
        dir: String,
    },
    /// List indexes stored in the app data directory
    List,
    /// Remove the stored index for a directory
    Remove {
        #[arg(default_value = ".")]
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Build { path, output, framed } => handle_build(&path, output, framed),
        Commands::Grep {
            query,
            path,
            index,
            files_with_matches,
            no_color,
        } => handle_grep(&query, &path, index, files_with_matches, no_color),
        Commands::Stats { path, index, json } => {
            let index = load_index_for(&path, index)?;
            print_stats(&index, json)
        }
        Commands::Export { index, frames } => {
            let loaded = persist::load_repo_index(&index)?;
            persist::save_framed(&frames, &loaded.blobs)?;
            println!("Exported {} blobs to {}", loaded.blobs.len(), frames.display());
            Ok(())
        }
        Commands::Import { frames, index, dir } => {
            let blobs = persist::load_framed(&frames)?;
            let repo_index = RepoIndex::new(dir, blobs);
            persist::save_repo_index(&index, &repo_index)?;
            println!(
                "Imported {} blobs into {}",
                repo_index.blobs.len(),
                index.display()
            );
            Ok(())
        }
        Commands::List => {
            let files = list_index_files()?;
            if files.is_empty() {
                println!("No stored indexes.");
            }
            for file in files {
                println!("{}", file.display());
            }
            Ok(())
        }
        Commands::Remove { path } => {
            let root = find_repo_root(&path)?;
            if remove_index(&root)? {
                println!("Removed index for: {}", root.display());
            } else {
                println!("No stored index for: {}", root.display());
            }
            Ok(())
        }
    }
}

fn handle_build(path: &Path, output: Option<PathBuf>, framed: bool) -> Result<()> {
    let root = find_repo_root(path)?;
    let output = match output {
        Some(output) => output,
        None => default_index_path(&root)?,
    };

    let fs = OsFileSystem::new(&root);
    let file_count = fs.list_relative_filenames()?.len();
    println!("Indexing {} ({} files)", root.display(), file_count);

    let progress = build_progress(file_count as u64);
    let config = IndexConfig::default();
    let dir = root.to_string_lossy().into_owned();

    let blob_count = if framed {
        persist::build_framed_index(&fs, &config, &progress, &output)?
    } else {
        let index =
            build_repo_index(&fs, &dir, &config, &progress).context("index build failed")?;
        persist::save_repo_index(&output, &index)?;
        index.blobs.len()
    };
    #[cfg(feature = "progress")]
    progress.finish();

    println!("Indexed {} files into {}", blob_count, output.display());
    Ok(())
}

#[cfg(feature = "progress")]
fn build_progress(len: u64) -> BarProgress {
    BarProgress::new(len)
}

#[cfg(not(feature = "progress"))]
fn build_progress(_len: u64) -> NoProgress {
    NoProgress
}

fn handle_grep(
    query: &str,
    path: &Path,
    index_path: Option<PathBuf>,
    files_only: bool,
    no_color: bool,
) -> Result<()> {
    let index = load_index_for(path, index_path)?;
    let fs = OsFileSystem::new(&index.dir);

    let outcome = output::search(&index, &fs, query)?;
    output::print_matches(
        &outcome,
        query,
        PrintOptions {
            files_only,
            color: !no_color,
        },
    )?;
    output::print_summary(&outcome.summary, query);
    Ok(())
}

fn load_index_for(path: &Path, explicit: Option<PathBuf>) -> Result<RepoIndex> {
    let index_path = match explicit {
        Some(index_path) => index_path,
        None => {
            let root = find_repo_root(path)?;
            let index_path = default_index_path(&root)?;
            if !index_path.exists() {
                bail!(
                    "no index for {} - run `skipgrep build` first",
                    root.display()
                );
            }
            index_path
        }
    };
    persist::load_repo_index(&index_path)
}
