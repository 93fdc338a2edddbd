//! Progress reporting for long-running index builds.
//!
//! The builder takes an injected reporter so library users and tests
//! stay silent by default; the CLI hands in an indicatif-backed bar when
//! the `progress` feature is enabled.

use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic progress counter shared across build workers. `add` must be
/// safe to call concurrently.
pub trait Progress: Send + Sync {
    fn add(&self, n: u64);
}

/// Default reporter that discards all updates.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn add(&self, _n: u64) {}
}

/// Reporter that only counts, for tests and embedders.
#[derive(Debug, Default)]
pub struct CountingProgress {
    count: AtomicU64,
}

impl CountingProgress {
    pub fn total(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }
}

impl Progress for CountingProgress {
    fn add(&self, n: u64) {
        self.count.fetch_add(n, Ordering::Relaxed);
    }
}

#[cfg(feature = "progress")]
pub use bar::BarProgress;

#[cfg(feature = "progress")]
mod bar {
    use indicatif::{ProgressBar, ProgressStyle};

    /// Terminal progress bar over a known file count.
    pub struct BarProgress {
        bar: ProgressBar,
    }

    impl BarProgress {
        pub fn new(len: u64) -> Self {
            let bar = ProgressBar::new(len);
            let style = ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40} {pos}/{len} files")
                .unwrap_or_else(|_| ProgressStyle::default_bar());
            bar.set_style(style.progress_chars("=> "));
            Self { bar }
        }

        pub fn finish(&self) {
            self.bar.finish_and_clear();
        }
    }

    impl super::Progress for BarProgress {
        fn add(&self, n: u64) {
            self.bar.inc(n);
        }
    }
}
