use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub is_dir: bool,
}

impl FileRecord {
    pub fn file(path: PathBuf, size_bytes: u64) -> Self {
        Self {
            path,
            size_bytes,
            is_dir: false,
        }
    }

    pub fn directory(path: PathBuf, size_bytes: u64) -> Self {
        Self {
            path,
            size_bytes,
            is_dir: true,
        }
    }
}
