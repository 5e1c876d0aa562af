use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Live counters shared by the tasks of one scan.
pub struct ProgressTracker {
    pub files_found: AtomicU64,
    pub dirs_found: AtomicU64,
    pub total_size: AtomicU64,
    pub skipped_count: AtomicUsize,
    pub start_time: Instant,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self {
            files_found: AtomicU64::new(0),
            dirs_found: AtomicU64::new(0),
            total_size: AtomicU64::new(0),
            skipped_count: AtomicUsize::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn increment_files(&self) {
        self.files_found.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_dirs(&self) {
        self.dirs_found.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_size(&self, size: u64) {
        self.total_size.fetch_add(size, Ordering::Relaxed);
    }

    pub fn increment_skipped(&self) {
        self.skipped_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        let files_found = self.files_found.load(Ordering::Relaxed);
        let dirs_found = self.dirs_found.load(Ordering::Relaxed);
        ProgressSnapshot {
            files_found,
            dirs_found,
            entries: files_found + dirs_found,
            total_size: self.total_size.load(Ordering::Relaxed),
            skipped_count: self.skipped_count.load(Ordering::Relaxed),
            elapsed: self.elapsed(),
        }
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

pub struct ProgressSnapshot {
    pub files_found: u64,
    pub dirs_found: u64,
    pub entries: u64,
    pub total_size: u64,
    pub skipped_count: usize,
    pub elapsed: Duration,
}
