use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use cachewarm::config::settings::{cap_concurrency, default_path_from, Settings};
use cachewarm::core::events::{self, Event};
use cachewarm::core::orchestrator::{run_read_pass, spawn_read, spawn_scan};
use cachewarm::core::reader::{self, drain, ReadOutcome, READ_BUFFER_SIZE};
use cachewarm::core::scanner::Scanner;
use cachewarm::models::error::{ErrorType, ReadError, ScanError};
use cachewarm::models::progress::ReadProgressEvent;
use cachewarm::models::record::FileRecord;
use cachewarm::models::size::{format_number, human_readable_size, throughput};
use cachewarm::models::snapshot::DirectorySnapshot;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Create a unique temporary directory for a test.
fn make_test_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("cachewarm_test_{}", name));
    let _ = std::fs::remove_dir_all(&dir); // clean up from previous runs
    std::fs::create_dir_all(&dir).expect("create test dir");
    dir
}

/// Remove a temporary test directory.
fn cleanup(dir: &Path) {
    let _ = std::fs::remove_dir_all(dir);
}

fn write_file(path: &Path, size: usize) {
    std::fs::write(path, vec![b'x'; size]).expect("write test file");
}

fn test_settings() -> Settings {
    Settings {
        max_concurrent_io: 4,
        follow_symlinks: false,
        default_path: None,
    }
}

fn regular_sizes(snapshot: &DirectorySnapshot) -> Vec<u64> {
    snapshot.regular_files().map(|r| r.size_bytes).collect()
}

async fn scan(dir: &Path) -> DirectorySnapshot {
    let (event_tx, _rx) = events::create_event_channel();
    let scanner = Scanner::new(test_settings(), event_tx);
    let records = scanner.scan(dir.to_path_buf()).await.expect("scan should succeed");
    DirectorySnapshot::new(dir.to_path_buf(), records)
}

/// Reader stand-in that fails for one path and reports the recorded size otherwise.
fn fake_reader(failing: &'static str) -> impl FnMut(&Path) -> Result<ReadOutcome, ReadError> {
    move |path: &Path| {
        if path == Path::new(failing) {
            return Err(ReadError::io(
                path,
                &io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"),
            ));
        }
        Ok(ReadOutcome {
            bytes_read: 10,
            elapsed: Duration::from_micros(5),
        })
    }
}

fn three_file_snapshot() -> DirectorySnapshot {
    DirectorySnapshot::new(
        PathBuf::from("/x"),
        vec![
            FileRecord::file(PathBuf::from("/x/c"), 100),
            FileRecord::directory(PathBuf::from("/x"), 4096),
            FileRecord::file(PathBuf::from("/x/a"), 300),
            FileRecord::file(PathBuf::from("/x/b"), 200),
        ],
    )
}

// ---------------------------------------------------------------------------
// 1. Snapshot construction
// ---------------------------------------------------------------------------

#[test]
fn test_snapshot_sorted_and_totals() {
    let snapshot = DirectorySnapshot::new(
        PathBuf::from("/data"),
        vec![
            FileRecord::file(PathBuf::from("/data/a"), 100),
            FileRecord::file(PathBuf::from("/data/b"), 5000),
            FileRecord::file(PathBuf::from("/data/c"), 1),
        ],
    );

    let sizes: Vec<u64> = snapshot.files().iter().map(|r| r.size_bytes).collect();
    assert_eq!(sizes, vec![5000, 100, 1]);
    assert_eq!(snapshot.file_count(), 3);
    assert_eq!(snapshot.total_size_bytes(), 5101);
    assert_eq!(snapshot.root_path(), Path::new("/data"));
}

#[test]
fn test_snapshot_counts_directories_in_size_only() {
    let snapshot = three_file_snapshot();

    assert_eq!(snapshot.file_count(), 3);
    assert_eq!(snapshot.total_size_bytes(), 4096 + 300 + 200 + 100);
    assert_eq!(snapshot.files()[0].path, PathBuf::from("/x"));
    assert_eq!(regular_sizes(&snapshot), vec![300, 200, 100]);
}

#[test]
fn test_snapshot_resort_is_identity() {
    let snapshot = three_file_snapshot();
    let resorted = DirectorySnapshot::new(
        snapshot.root_path().to_path_buf(),
        snapshot.files().to_vec(),
    );
    assert_eq!(resorted, snapshot);
}

#[test]
fn test_snapshot_equal_sizes_keep_order() {
    let snapshot = DirectorySnapshot::new(
        PathBuf::from("/e"),
        vec![
            FileRecord::file(PathBuf::from("/e/first"), 7),
            FileRecord::file(PathBuf::from("/e/second"), 7),
        ],
    );
    assert_eq!(snapshot.files()[0].path, PathBuf::from("/e/first"));
    assert_eq!(snapshot.files()[1].path, PathBuf::from("/e/second"));
}

// ---------------------------------------------------------------------------
// 2. Scanner
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_scan_three_files() {
    let dir = make_test_dir("scan_three");
    write_file(&dir.join("a.bin"), 100);
    write_file(&dir.join("b.bin"), 5000);
    write_file(&dir.join("c.bin"), 1);

    let snapshot = scan(&dir).await;

    assert_eq!(snapshot.file_count(), 3);
    assert_eq!(regular_sizes(&snapshot), vec![5000, 100, 1]);
    let sum: u64 = snapshot.files().iter().map(|r| r.size_bytes).sum();
    assert_eq!(snapshot.total_size_bytes(), sum);
    assert!(snapshot.files().iter().any(|r| r.is_dir && r.path == dir));

    cleanup(&dir);
}

#[tokio::test]
async fn test_scan_nested_directories() {
    let dir = make_test_dir("scan_nested");
    std::fs::create_dir_all(dir.join("sub/deeper")).unwrap();
    write_file(&dir.join("top.txt"), 10);
    write_file(&dir.join("sub/mid.txt"), 20);
    write_file(&dir.join("sub/deeper/low.txt"), 30);

    let snapshot = scan(&dir).await;

    assert_eq!(snapshot.file_count(), 3);
    let dirs = snapshot.files().iter().filter(|r| r.is_dir).count();
    assert_eq!(dirs, 3); // root + sub + deeper
    assert!(snapshot
        .regular_files()
        .any(|r| r.path == dir.join("sub/deeper/low.txt")));

    cleanup(&dir);
}

#[tokio::test]
async fn test_scan_empty_dir() {
    let dir = make_test_dir("scan_empty");

    let snapshot = scan(&dir).await;

    assert_eq!(snapshot.file_count(), 0);
    assert_eq!(snapshot.files().len(), 1); // the root itself
    assert!(snapshot.files()[0].is_dir);

    cleanup(&dir);
}

#[tokio::test]
async fn test_scan_missing_root_fails() {
    let (event_tx, _rx) = events::create_event_channel();
    let scanner = Scanner::new(test_settings(), event_tx);

    let err = scanner
        .scan(PathBuf::from("/does/not/exist"))
        .await
        .expect_err("scan of a missing root must fail");

    assert_eq!(err.error_type, ErrorType::NotFound);
    assert_eq!(err.path, PathBuf::from("/does/not/exist"));
    assert!(err.to_string().contains("/does/not/exist"));
}

#[tokio::test]
async fn test_scan_file_root() {
    let dir = make_test_dir("scan_file_root");
    let file = dir.join("only.bin");
    write_file(&file, 42);

    let snapshot = scan(&file).await;

    assert_eq!(snapshot.file_count(), 1);
    assert_eq!(snapshot.files(), &[FileRecord::file(file.clone(), 42)]);

    cleanup(&dir);
}

#[cfg(unix)]
#[tokio::test]
async fn test_scan_skips_symlinks_by_default() {
    let dir = make_test_dir("scan_symlink");
    write_file(&dir.join("real.bin"), 64);
    std::os::unix::fs::symlink(dir.join("real.bin"), dir.join("link.bin")).unwrap();

    let snapshot = scan(&dir).await;

    assert_eq!(snapshot.file_count(), 1);
    assert!(!snapshot.files().iter().any(|r| r.path == dir.join("link.bin")));

    cleanup(&dir);
}

#[cfg(unix)]
#[tokio::test]
async fn test_scan_follows_symlink_cycle_once() {
    let dir = make_test_dir("scan_symlink_cycle");
    std::fs::create_dir_all(dir.join("sub")).unwrap();
    write_file(&dir.join("sub/file.bin"), 8);
    std::os::unix::fs::symlink(&dir, dir.join("sub/loop")).unwrap();

    let settings = Settings {
        follow_symlinks: true,
        ..test_settings()
    };
    let (event_tx, _rx) = events::create_event_channel();
    let scanner = Scanner::new(settings, event_tx);
    let records = scanner.scan(dir.clone()).await.expect("scan should succeed");
    let snapshot = DirectorySnapshot::new(dir.clone(), records);

    assert_eq!(snapshot.file_count(), 1);
    assert!(scanner.progress().snapshot().skipped_count >= 1);

    cleanup(&dir);
}

#[test]
fn test_symlink_cycle_error() {
    let err = ScanError::symlink_cycle("/data/sub/loop");

    assert_eq!(err.error_type, ErrorType::SymlinkCycle);
    assert_eq!(err.path, PathBuf::from("/data/sub/loop"));
    assert_eq!(err.to_string(), "/data/sub/loop: symlink cycle detected");
}

// ---------------------------------------------------------------------------
// 3. Scan orchestrator
// ---------------------------------------------------------------------------

async fn scan_outcome(rx: &mut events::EventReceiver) -> Event {
    loop {
        match rx.recv().await.expect("scan worker must report") {
            Event::ScanProgress { .. } => continue,
            other => return other,
        }
    }
}

#[tokio::test]
async fn test_spawn_scan_completes() {
    let dir = make_test_dir("spawn_scan");
    write_file(&dir.join("a.bin"), 100);
    write_file(&dir.join("b.bin"), 5000);

    let (event_tx, mut rx) = events::create_event_channel();
    let handle = spawn_scan(dir.clone(), test_settings(), event_tx);

    match scan_outcome(&mut rx).await {
        Event::ScanCompleted(snapshot) => {
            assert_eq!(snapshot.root_path(), dir.as_path());
            assert_eq!(regular_sizes(&snapshot), vec![5000, 100]);
        }
        other => panic!("unexpected event: {:?}", other),
    }
    handle.await.unwrap();

    cleanup(&dir);
}

#[tokio::test]
async fn test_spawn_scan_reports_failure() {
    let (event_tx, mut rx) = events::create_event_channel();
    spawn_scan(PathBuf::from("/does/not/exist"), test_settings(), event_tx);

    match scan_outcome(&mut rx).await {
        Event::ScanFailed(err) => assert_eq!(err.error_type, ErrorType::NotFound),
        other => panic!("unexpected event: {:?}", other),
    }
}

// ---------------------------------------------------------------------------
// 4. File reader
// ---------------------------------------------------------------------------

#[test]
fn test_read_all_larger_than_buffer() {
    let dir = make_test_dir("read_all");
    let file = dir.join("big.bin");
    let size = READ_BUFFER_SIZE * 3 + 17;
    write_file(&file, size);

    let outcome = reader::read_all(&file).expect("read should succeed");
    assert_eq!(outcome.bytes_read, size as u64);

    cleanup(&dir);
}

#[test]
fn test_read_all_missing_file() {
    let err = reader::read_all(Path::new("/does/not/exist.bin")).expect_err("must fail");
    assert_eq!(err.error_type, ErrorType::NotFound);
    assert_eq!(err.path, PathBuf::from("/does/not/exist.bin"));
}

/// Yields an interruption before every chunk.
struct Flaky {
    remaining: usize,
    interrupt_next: bool,
}

impl Read for Flaky {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.interrupt_next {
            self.interrupt_next = false;
            return Err(io::Error::new(io::ErrorKind::Interrupted, "interrupted"));
        }
        self.interrupt_next = true;
        let n = self.remaining.min(buf.len()).min(1000);
        self.remaining -= n;
        Ok(n)
    }
}

#[test]
fn test_drain_retries_interrupted_reads() {
    let mut source = Flaky {
        remaining: 5000,
        interrupt_next: true,
    };
    assert_eq!(drain(&mut source).unwrap(), 5000);
}

// ---------------------------------------------------------------------------
// 5. Read orchestrator
// ---------------------------------------------------------------------------

#[test]
fn test_read_pass_counts_through_errors() {
    let snapshot = three_file_snapshot();
    let mut seen: Vec<ReadProgressEvent> = Vec::new();

    let completed = run_read_pass(&snapshot, fake_reader("/x/b"), |event| {
        seen.push(event);
        true
    });

    assert!(completed);
    let counts: Vec<u64> = seen.iter().map(|e| e.files_read).collect();
    assert_eq!(counts, vec![1, 2, 3, 3]);
    assert!(seen.iter().all(|e| e.files_total == 3));

    let paths: Vec<&Path> = seen[..3].iter().map(|e| e.current_path.as_path()).collect();
    assert_eq!(paths, vec![Path::new("/x/a"), Path::new("/x/b"), Path::new("/x/c")]);

    assert!(seen[0].error.is_none());
    assert_eq!(seen[1].error.as_ref().map(|e| e.error_type), Some(ErrorType::PermissionDenied));
    assert!(seen[1].throughput().is_none());
    assert!(seen[2].error.is_none());
    assert!(seen[3].terminal);
    assert!(seen[..3].iter().all(|e| !e.terminal));
}

#[test]
fn test_read_pass_stops_when_emit_refuses() {
    let snapshot = three_file_snapshot();
    let mut seen = 0;

    let completed = run_read_pass(&snapshot, fake_reader("/none"), |_| {
        seen += 1;
        false
    });

    assert!(!completed);
    assert_eq!(seen, 1);
}

#[test]
fn test_read_pass_empty_snapshot_only_terminal() {
    let snapshot = DirectorySnapshot::new(
        PathBuf::from("/empty"),
        vec![FileRecord::directory(PathBuf::from("/empty"), 4096)],
    );
    let mut seen = Vec::new();

    run_read_pass(&snapshot, fake_reader("/none"), |event| {
        seen.push(event);
        true
    });

    assert_eq!(seen.len(), 1);
    assert!(seen[0].terminal);
    assert_eq!(seen[0].files_total, 0);
}

#[tokio::test]
async fn test_spawn_read_delivers_in_order() {
    let dir = make_test_dir("spawn_read");
    write_file(&dir.join("a.bin"), 3000);
    write_file(&dir.join("c.bin"), 1000);
    // Listed in the snapshot but gone by the time it is read
    let missing = dir.join("b.bin");

    let snapshot = Arc::new(DirectorySnapshot::new(
        dir.clone(),
        vec![
            FileRecord::file(dir.join("a.bin"), 3000),
            FileRecord::file(missing.clone(), 2000),
            FileRecord::file(dir.join("c.bin"), 1000),
        ],
    ));

    let (event_tx, mut rx) = events::create_event_channel();
    let _worker = spawn_read(snapshot, event_tx).expect("spawn read worker");

    let mut seen = Vec::new();
    loop {
        match rx.recv().await.expect("read worker must finish") {
            Event::ReadProgress(event) => {
                let terminal = event.terminal;
                seen.push(event);
                if terminal {
                    break;
                }
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    let counts: Vec<u64> = seen.iter().map(|e| e.files_read).collect();
    assert_eq!(counts, vec![1, 2, 3, 3]);
    assert_eq!(seen[0].bytes_read, 3000);
    assert_eq!(seen[1].current_path, missing);
    assert_eq!(seen[1].error.as_ref().map(|e| e.error_type), Some(ErrorType::NotFound));
    assert_eq!(seen[2].bytes_read, 1000);

    cleanup(&dir);
}

// ---------------------------------------------------------------------------
// 6. Sizes and rates
// ---------------------------------------------------------------------------

#[test]
fn test_throughput_floors_elapsed() {
    assert_eq!(throughput(1000, Duration::ZERO), 1000.0 / 1e-6);
    assert_eq!(throughput(2048, Duration::from_secs(2)), 1024.0);
}

#[test]
fn test_human_readable_size() {
    assert_eq!(human_readable_size(0), "0 B");
    assert_eq!(human_readable_size(1023), "1023 B");
    assert_eq!(human_readable_size(1536), "1.50 KB");
    assert_eq!(human_readable_size(1024 * 1024), "1.00 MB");
    assert_eq!(human_readable_size(1024 * 1024 * 1024), "1.00 GB");
    assert_eq!(format_number(1234567), "1,234,567");
    assert_eq!(format_number(12), "12");
}

// ---------------------------------------------------------------------------
// 7. Settings
// ---------------------------------------------------------------------------

#[test]
fn test_settings_default() {
    let s = Settings::default();

    assert!(!s.follow_symlinks);
    assert!(s.max_concurrent_io > 0);
    assert!(s.default_path.is_none());
    assert_eq!(s.initial_input(), "");

    let s = Settings {
        default_path: Some(PathBuf::from("/srv/data")),
        ..s
    };
    assert_eq!(s.initial_input(), "/srv/data");
}

#[test]
fn test_default_path_prefers_current_variable() {
    let some = |v: &str| Some(std::ffi::OsString::from(v));

    assert_eq!(
        default_path_from(some("/new"), some("/old")),
        Some(PathBuf::from("/new"))
    );
    assert_eq!(default_path_from(None, some("/old")), Some(PathBuf::from("/old")));
    assert_eq!(default_path_from(some(""), some("/old")), Some(PathBuf::from("/old")));
    assert_eq!(default_path_from(some(""), None), None);
    assert_eq!(default_path_from(None, None), None);
}

#[test]
fn test_cap_concurrency_by_fd_limit() {
    assert_eq!(cap_concurrency(128, None), 128);
    assert_eq!(cap_concurrency(128, Some(1024)), 128);
    assert_eq!(cap_concurrency(128, Some(100)), 75);
    // Very low limits still leave a usable floor
    assert_eq!(cap_concurrency(128, Some(8)), 16);
}
