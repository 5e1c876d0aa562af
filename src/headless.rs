use std::path::PathBuf;

use crate::config::settings::Settings;
use crate::core::events;
use crate::core::orchestrator::run_read_pass;
use crate::core::reader;
use crate::core::scanner::Scanner;
use crate::models::progress::ReadProgressEvent;
use crate::models::size::{rate_in_mb, size_in_mb};
use crate::models::snapshot::DirectorySnapshot;

/// Scan and read without a terminal UI, reporting through the log.
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    let root = settings
        .default_path
        .clone()
        .unwrap_or_else(|| PathBuf::from("."));

    let (event_tx, _rx) = events::create_event_channel();
    let scanner = Scanner::new(settings, event_tx);
    let records = scanner.scan(root.clone()).await?;
    let snapshot = DirectorySnapshot::new(root, records);

    tracing::info!("Files total: '{}'", snapshot.file_count());
    tracing::info!("Size total: {:.2} MB", size_in_mb(snapshot.total_size_bytes()));

    let errors = tokio::task::spawn_blocking(move || {
        let mut errors = 0u64;
        run_read_pass(&snapshot, reader::read_all, |event| {
            if event.error.is_some() {
                errors += 1;
            }
            log_event(&event);
            true
        });
        errors
    })
    .await?;

    if errors > 0 {
        tracing::warn!("{} files could not be read", errors);
    }
    Ok(())
}

fn log_event(event: &ReadProgressEvent) {
    if event.terminal {
        tracing::info!(
            "Done reading {} files in {:.2?}",
            event.files_total,
            event.elapsed
        );
        return;
    }
    match (&event.error, event.throughput()) {
        (Some(err), _) => tracing::warn!(
            "Error reading '{}': {}",
            event.current_path.display(),
            err
        ),
        (None, Some(rate)) => tracing::info!(
            "({}/{}) '{}' File size: {:.2} MB; read speed: {:.2} MB/s",
            event.files_read,
            event.files_total,
            event.current_path.display(),
            size_in_mb(event.size_bytes),
            rate_in_mb(rate),
        ),
        (None, None) => {}
    }
}
