use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorType {
    PermissionDenied,
    NotFound,
    SymlinkCycle,
    IoError,
    Other,
}

impl ErrorType {
    pub fn from_io(err: &std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::PermissionDenied => ErrorType::PermissionDenied,
            std::io::ErrorKind::NotFound => ErrorType::NotFound,
            _ => ErrorType::IoError,
        }
    }
}

/// A failure that aborts a whole scan. Failures on individual entries below
/// the root never produce one of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ScanError {
    pub path: PathBuf,
    pub error_type: ErrorType,
    pub message: String,
}

impl ScanError {
    pub fn io(path: impl Into<PathBuf>, err: &std::io::Error) -> Self {
        let path = path.into();
        Self {
            message: format!("{}: {}", path.display(), err),
            error_type: ErrorType::from_io(err),
            path,
        }
    }

    /// A followed symlink leads back to a directory already walked.
    pub fn symlink_cycle(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            message: format!("{}: symlink cycle detected", path.display()),
            error_type: ErrorType::SymlinkCycle,
            path,
        }
    }

    pub fn other(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            error_type: ErrorType::Other,
            message: message.into(),
        }
    }
}

/// Failure to read one file during the read pass. Recorded, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ReadError {
    pub path: PathBuf,
    pub error_type: ErrorType,
    pub message: String,
}

impl ReadError {
    pub fn io(path: impl Into<PathBuf>, err: &std::io::Error) -> Self {
        Self {
            path: path.into(),
            error_type: ErrorType::from_io(err),
            message: err.to_string(),
        }
    }
}
