use std::collections::VecDeque;
use std::path::PathBuf;
use std::time::Duration;

use super::error::ReadError;
use super::size;

/// Number of progress events kept for display.
pub const RECENT_EVENTS_CAPACITY: usize = 10;

/// Outcome of reading one file, or the end-of-pass marker when `terminal` is set.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadProgressEvent {
    pub files_total: u64,
    pub files_read: u64,
    pub current_path: PathBuf,
    /// Size recorded in the snapshot.
    pub size_bytes: u64,
    /// Bytes actually read; zero on error.
    pub bytes_read: u64,
    /// Time spent on this file, or on the whole pass for the terminal event.
    pub elapsed: Duration,
    pub error: Option<ReadError>,
    pub terminal: bool,
}

impl ReadProgressEvent {
    pub fn finished(files_total: u64, elapsed: Duration) -> Self {
        Self {
            files_total,
            files_read: files_total,
            current_path: PathBuf::new(),
            size_bytes: 0,
            bytes_read: 0,
            elapsed,
            error: None,
            terminal: true,
        }
    }

    /// Bytes per second for a successful file read. `None` for errored
    /// entries and for the terminal event.
    pub fn throughput(&self) -> Option<f64> {
        if self.terminal || self.error.is_some() {
            return None;
        }
        Some(size::throughput(self.size_bytes, self.elapsed))
    }
}

/// Fixed-capacity FIFO of the latest progress events, oldest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecentEvents {
    events: VecDeque<ReadProgressEvent>,
}

impl RecentEvents {
    pub fn new() -> Self {
        Self {
            events: VecDeque::with_capacity(RECENT_EVENTS_CAPACITY),
        }
    }

    /// Appends `event`, evicting the oldest entry once the ring is full.
    pub fn pushed(mut self, event: ReadProgressEvent) -> Self {
        if self.events.len() == RECENT_EVENTS_CAPACITY {
            self.events.pop_front();
        }
        self.events.push_back(event);
        self
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReadProgressEvent> {
        self.events.iter()
    }
}
