use std::path::{Path, PathBuf};

use super::record::FileRecord;

/// Result of one successful scan.
///
/// Records are sorted by size, largest first, and the totals are computed
/// once at construction. There are no mutators: a new scan builds a new
/// snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectorySnapshot {
    root_path: PathBuf,
    file_count: u64,
    total_size_bytes: u64,
    files: Vec<FileRecord>,
}

impl DirectorySnapshot {
    pub fn new(root_path: PathBuf, mut files: Vec<FileRecord>) -> Self {
        sort_by_size_desc(&mut files);
        let file_count = files.iter().filter(|r| !r.is_dir).count() as u64;
        let total_size_bytes = files.iter().map(|r| r.size_bytes).sum();
        Self {
            root_path,
            file_count,
            total_size_bytes,
            files,
        }
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    /// Number of non-directory records.
    pub fn file_count(&self) -> u64 {
        self.file_count
    }

    /// Sum of every record's size, directories included.
    pub fn total_size_bytes(&self) -> u64 {
        self.total_size_bytes
    }

    pub fn files(&self) -> &[FileRecord] {
        &self.files
    }

    /// Non-directory records in snapshot order. This is what the read pass visits.
    pub fn regular_files(&self) -> impl Iterator<Item = &FileRecord> {
        self.files.iter().filter(|r| !r.is_dir)
    }
}

/// Stable, so records of equal size keep their relative order and sorting an
/// already sorted list is a no-op.
pub fn sort_by_size_desc(files: &mut [FileRecord]) {
    files.sort_by(|a, b| b.size_bytes.cmp(&a.size_bytes));
}
