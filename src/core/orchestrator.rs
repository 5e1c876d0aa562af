use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use tokio::task::JoinHandle;

use crate::config::settings::Settings;
use crate::models::error::ReadError;
use crate::models::progress::ReadProgressEvent;
use crate::models::size::{rate_in_mb, size_in_mb};
use crate::models::snapshot::DirectorySnapshot;

use super::events::{Event, EventSender};
use super::reader::{self, ReadOutcome};
use super::scanner::Scanner;

/// Runs one scan on the tokio runtime and reports the outcome as a single
/// `ScanCompleted` or `ScanFailed` event. Aborting the handle drops the scan;
/// nothing is sent afterwards.
pub fn spawn_scan(root: PathBuf, settings: Settings, event_tx: EventSender) -> JoinHandle<()> {
    tokio::spawn(async move {
        let scanner = Scanner::new(settings, event_tx.clone());
        let event = match scanner.scan(root.clone()).await {
            Ok(records) => Event::ScanCompleted(Arc::new(DirectorySnapshot::new(root, records))),
            Err(e) => {
                tracing::error!("Scan failed: {}", e);
                Event::ScanFailed(e)
            }
        };
        let _ = event_tx.send(event);
    })
}

/// Handle to a read pass running on its own thread.
pub struct ReadWorker {
    cancelled: Arc<AtomicBool>,
    _thread: thread::JoinHandle<()>,
}

impl ReadWorker {
    /// Stops the pass before the next file. A read already in progress runs
    /// to completion but its event is not delivered.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }
}

/// Starts a read pass over `snapshot`, delivering one `ReadProgress` event
/// per file and a terminal event at the end, in order.
pub fn spawn_read(
    snapshot: Arc<DirectorySnapshot>,
    event_tx: EventSender,
) -> std::io::Result<ReadWorker> {
    let cancelled = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&cancelled);
    let thread = thread::Builder::new()
        .name("read-pass".into())
        .spawn(move || {
            run_read_pass(&snapshot, reader::read_all, |event| {
                !flag.load(Ordering::Relaxed) && event_tx.send(Event::ReadProgress(event)).is_ok()
            });
        })?;
    Ok(ReadWorker {
        cancelled,
        _thread: thread,
    })
}

/// Reads every regular file of `snapshot` in snapshot order.
///
/// `emit` receives each event as it is produced and returns `false` to stop
/// the pass early. A failed read still counts as processed. Returns whether
/// the pass ran to its terminal event.
pub fn run_read_pass<R, E>(snapshot: &DirectorySnapshot, mut read_file: R, mut emit: E) -> bool
where
    R: FnMut(&Path) -> Result<ReadOutcome, ReadError>,
    E: FnMut(ReadProgressEvent) -> bool,
{
    let files_total = snapshot.file_count();
    let pass_start = Instant::now();
    let mut files_read = 0u64;
    let mut errors = 0u64;

    for record in snapshot.regular_files() {
        let start = Instant::now();
        let result = read_file(&record.path);
        let elapsed = start.elapsed();
        files_read += 1;

        let (bytes_read, error) = match result {
            Ok(outcome) => (outcome.bytes_read, None),
            Err(e) => {
                tracing::warn!(path = %record.path.display(), "read failed: {}", e);
                errors += 1;
                (0, Some(e))
            }
        };

        let event = ReadProgressEvent {
            files_total,
            files_read,
            current_path: record.path.clone(),
            size_bytes: record.size_bytes,
            bytes_read,
            elapsed,
            error,
            terminal: false,
        };
        if let Some(rate) = event.throughput() {
            tracing::debug!(
                path = %record.path.display(),
                "File size: {:.2} MB; read speed: {:.2} MB/s",
                size_in_mb(record.size_bytes),
                rate_in_mb(rate),
            );
        }

        if !emit(event) {
            tracing::info!(files_read, files_total, "read pass stopped");
            return false;
        }
    }

    let elapsed = pass_start.elapsed();
    tracing::info!(
        files_read,
        errors,
        elapsed_ms = elapsed.as_millis() as u64,
        "read pass over '{}' finished",
        snapshot.root_path().display(),
    );
    emit(ReadProgressEvent::finished(files_total, elapsed))
}
