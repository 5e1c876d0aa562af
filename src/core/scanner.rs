use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use dashmap::DashSet;
use tokio::sync::Semaphore;

use crate::config::settings::Settings;
use crate::models::error::ScanError;
use crate::models::record::FileRecord;
use crate::models::size::size_in_mb;

use super::events::{Event, EventSender};
use super::progress::ProgressTracker;

/// Minimum gap between two `ScanProgress` events.
const PROGRESS_INTERVAL_MS: u64 = 100;

/// Walks a directory tree and returns one flat record per file and directory.
///
/// Directory reads run concurrently, bounded by `Settings::max_concurrent_io`.
/// Only a root that cannot be stat'ed or listed fails the scan; anything
/// unreadable below it is logged and left out.
pub struct Scanner {
    ctx: Arc<ScanContext>,
}

struct ScanContext {
    semaphore: Semaphore,
    event_tx: EventSender,
    visited: DashSet<PathBuf>,
    progress: ProgressTracker,
    settings: Settings,
    last_progress_time: AtomicU64,
}

type ScanFuture = Pin<Box<dyn Future<Output = Result<Vec<FileRecord>, ScanError>> + Send>>;

impl Scanner {
    pub fn new(settings: Settings, event_tx: EventSender) -> Self {
        let max_io = settings.max_concurrent_io.max(1);
        Self {
            ctx: Arc::new(ScanContext {
                semaphore: Semaphore::new(max_io),
                event_tx,
                visited: DashSet::new(),
                progress: ProgressTracker::new(),
                settings,
                last_progress_time: AtomicU64::new(0),
            }),
        }
    }

    pub fn progress(&self) -> &ProgressTracker {
        &self.ctx.progress
    }

    pub async fn scan(&self, root: PathBuf) -> Result<Vec<FileRecord>, ScanError> {
        tracing::info!("Getting files of directory: '{}'", root.display());

        // Cycle detection compares canonical paths, so the walk has to start from one.
        let root = if self.ctx.settings.follow_symlinks {
            tokio::fs::canonicalize(&root)
                .await
                .map_err(|e| ScanError::io(&root, &e))?
        } else {
            root
        };

        let metadata = tokio::fs::metadata(&root)
            .await
            .map_err(|e| ScanError::io(&root, &e))?;

        let progress = &self.ctx.progress;
        let records = if metadata.is_file() {
            progress.increment_files();
            progress.add_size(metadata.len());
            vec![FileRecord::file(root.clone(), metadata.len())]
        } else if metadata.is_dir() {
            self.ctx.visited.insert(root.clone());
            progress.increment_dirs();
            progress.add_size(metadata.len());
            let mut records = vec![FileRecord::directory(root.clone(), metadata.len())];
            records.extend(scan_directory(root.clone(), Arc::clone(&self.ctx), true).await?);
            records
        } else {
            return Err(ScanError::other(
                &root,
                format!("{}: not a directory or regular file", root.display()),
            ));
        };

        let snapshot = progress.snapshot();
        tracing::info!(
            files = snapshot.files_found,
            dirs = snapshot.dirs_found,
            skipped = snapshot.skipped_count,
            elapsed_ms = snapshot.elapsed.as_millis() as u64,
            "Scan of '{}' finished: {:.2} MB",
            root.display(),
            size_in_mb(snapshot.total_size),
        );

        Ok(records)
    }
}

/// Collected directory entry from batch I/O.
struct DirEntryData {
    path: PathBuf,
    metadata: std::fs::Metadata,
}

/// Read all entries and their metadata from a directory in one blocking call.
/// Returns (entries, entry_errors) or an error if the directory itself can't be read.
fn read_dir_batch(dir_path: &Path) -> std::io::Result<(Vec<DirEntryData>, Vec<ScanError>)> {
    let mut entries = Vec::new();
    let mut errors = Vec::new();

    for entry_result in std::fs::read_dir(dir_path)? {
        match entry_result {
            Ok(entry) => {
                let entry_path = entry.path();
                match std::fs::symlink_metadata(&entry_path) {
                    Ok(meta) => entries.push(DirEntryData {
                        path: entry_path,
                        metadata: meta,
                    }),
                    Err(e) => errors.push(ScanError::io(entry_path, &e)),
                }
            }
            Err(e) => {
                errors.push(ScanError::io(dir_path, &e));
            }
        }
    }

    Ok((entries, errors))
}

fn skip(ctx: &ScanContext, err: &ScanError) {
    tracing::warn!(
        path = %err.path.display(),
        error_type = ?err.error_type,
        "skipping entry: {}",
        err
    );
    ctx.progress.increment_skipped();
}

fn scan_directory(path: PathBuf, ctx: Arc<ScanContext>, is_root: bool) -> ScanFuture {
    Box::pin(async move {
        // Semaphore permit is held only during I/O, then released before
        // processing entries or waiting for children.
        let io_result = {
            let _permit = ctx
                .semaphore
                .acquire()
                .await
                .map_err(|e| ScanError::other(&path, e.to_string()))?;
            let path_clone = path.clone();
            tokio::task::spawn_blocking(move || read_dir_batch(&path_clone))
                .await
                .map_err(|e| ScanError::other(&path, format!("directory read task failed: {}", e)))?
        };

        let (entries, entry_errors) = match io_result {
            Ok(result) => result,
            Err(e) if is_root => return Err(ScanError::io(&path, &e)),
            Err(e) => {
                skip(&ctx, &ScanError::io(&path, &e));
                return Ok(Vec::new());
            }
        };

        for err in &entry_errors {
            skip(&ctx, err);
        }

        let mut handles = Vec::new();
        let mut records = Vec::new();

        for entry in entries {
            let mut entry_path = entry.path;
            let mut metadata = entry.metadata;

            if metadata.file_type().is_symlink() {
                if !ctx.settings.follow_symlinks {
                    tracing::debug!(path = %entry_path.display(), "not following symlink");
                    continue;
                }
                let real_path = match tokio::fs::canonicalize(&entry_path).await {
                    Ok(p) => p,
                    Err(e) => {
                        skip(&ctx, &ScanError::io(&entry_path, &e));
                        continue;
                    }
                };
                metadata = match tokio::fs::metadata(&real_path).await {
                    Ok(m) => m,
                    Err(e) => {
                        skip(&ctx, &ScanError::io(&entry_path, &e));
                        continue;
                    }
                };
                if metadata.is_dir() {
                    if !ctx.visited.insert(real_path.clone()) {
                        skip(&ctx, &ScanError::symlink_cycle(&entry_path));
                        continue;
                    }
                    entry_path = real_path;
                }
            } else if metadata.is_dir() && !ctx.visited.insert(entry_path.clone()) {
                continue;
            }

            let size = metadata.len();
            if metadata.is_dir() {
                ctx.progress.increment_dirs();
                ctx.progress.add_size(size);
                records.push(FileRecord::directory(entry_path.clone(), size));
                handles.push(tokio::spawn(scan_directory(
                    entry_path,
                    Arc::clone(&ctx),
                    false,
                )));
            } else if metadata.is_file() {
                ctx.progress.increment_files();
                ctx.progress.add_size(size);
                records.push(FileRecord::file(entry_path, size));
            } else {
                // FIFOs, sockets and device nodes could block a reader forever.
                tracing::debug!(path = %entry_path.display(), "not a regular file");
            }
        }

        // Wait for all spawned directory scans (permit already released)
        for handle in handles {
            match handle.await {
                Ok(Ok(children)) => records.extend(children),
                Ok(Err(e)) => skip(&ctx, &e),
                Err(e) => skip(&ctx, &ScanError::other(&path, format!("task join error: {}", e))),
            }
        }

        maybe_send_progress(&ctx);

        Ok(records)
    })
}

/// Throttle progress events: only send if 100ms+ since last send.
fn maybe_send_progress(ctx: &ScanContext) {
    let now_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64;
    let last = ctx.last_progress_time.load(Ordering::Relaxed);
    if now_ms.saturating_sub(last) >= PROGRESS_INTERVAL_MS {
        ctx.last_progress_time.store(now_ms, Ordering::Relaxed);
        let snapshot = ctx.progress.snapshot();
        let _ = ctx.event_tx.send(Event::ScanProgress {
            entries: snapshot.entries,
            total_size: snapshot.total_size,
        });
    }
}
