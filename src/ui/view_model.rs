//! Maps a [`SessionState`] to the fields its screen shows.
//!
//! Every field belongs to exactly one stage; a stage's view model never
//! carries values left over from another stage.

use std::time::Duration;

use crate::core::session::{SessionState, Stage};
use crate::models::progress::ReadProgressEvent;
use crate::models::size::size_in_mb;
use crate::models::snapshot::DirectorySnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyHint {
    pub key: &'static str,
    pub action: &'static str,
}

const fn hint(key: &'static str, action: &'static str) -> KeyHint {
    KeyHint { key, action }
}

const AWAITING_PATH_HINTS: &[KeyHint] = &[hint("enter", "confirm"), hint("ctrl+c", "quit")];
const SCANNING_HINTS: &[KeyHint] = &[hint("q", "quit")];
const CONFIRM_HINTS: &[KeyHint] = &[hint("enter", "read files"), hint("esc", "back"), hint("q", "quit")];
const READING_HINTS: &[KeyHint] = &[hint("q", "quit")];
const DONE_HINTS: &[KeyHint] = &[hint("esc", "another directory"), hint("q", "quit")];
const FAILED_HINTS: &[KeyHint] = &[hint("esc", "back"), hint("q", "quit")];

#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotSummary {
    pub root_path: String,
    pub file_count: u64,
    pub total_size_mb: f64,
}

impl SnapshotSummary {
    fn new(snapshot: &DirectorySnapshot) -> Self {
        Self {
            root_path: snapshot.root_path().display().to_string(),
            file_count: snapshot.file_count(),
            total_size_mb: size_in_mb(snapshot.total_size_bytes()),
        }
    }

    pub fn found_line(&self) -> String {
        format!("Found {} files in '{}'.", self.file_count, self.root_path)
    }

    pub fn size_line(&self) -> String {
        format!("Total size: {:.2} MB.", self.total_size_mb)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressLine {
    pub text: String,
    pub is_error: bool,
    /// Bytes per second; absent for errored reads.
    pub throughput: Option<f64>,
}

impl ProgressLine {
    pub fn from_event(event: &ReadProgressEvent) -> Self {
        let path = event.current_path.display();
        let text = match &event.error {
            Some(err) => format!("error reading '{}': {}", path, err.message),
            None => format!(
                "({}/{}) reading '{}' took {:?}",
                event.files_read, event.files_total, path, event.elapsed
            ),
        };
        Self {
            text,
            is_error: event.error.is_some(),
            throughput: event.throughput(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReadProgressView {
    pub files_read: u64,
    pub files_total: u64,
    pub errors: u64,
    /// Oldest first.
    pub lines: Vec<ProgressLine>,
}

impl ReadProgressView {
    pub fn ratio(&self) -> f64 {
        if self.files_total == 0 {
            return 0.0;
        }
        (self.files_read as f64 / self.files_total as f64).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DoneSummary {
    pub files_read: u64,
    pub errors: u64,
    pub read_mb: f64,
    pub elapsed: Duration,
}

impl DoneSummary {
    pub fn message(&self) -> String {
        format!("Done reading {} files.", self.files_read)
    }

    pub fn details(&self) -> String {
        format!(
            "{:.2} MB in {:.2?}, {} errors.",
            self.read_mb, self.elapsed, self.errors
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewModel {
    pub stage: Stage,
    pub input: Option<String>,
    pub spinner_active: bool,
    pub status: Option<String>,
    pub error: Option<String>,
    pub summary: Option<SnapshotSummary>,
    pub progress: Option<ReadProgressView>,
    pub done: Option<DoneSummary>,
    pub hints: &'static [KeyHint],
}

impl ViewModel {
    fn empty(stage: Stage, hints: &'static [KeyHint]) -> Self {
        Self {
            stage,
            input: None,
            spinner_active: false,
            status: None,
            error: None,
            summary: None,
            progress: None,
            done: None,
            hints,
        }
    }

    pub fn from_state(state: &SessionState) -> Self {
        match state {
            SessionState::AwaitingPath { input_buffer } => Self {
                input: Some(input_buffer.clone()),
                ..Self::empty(Stage::AwaitingPath, AWAITING_PATH_HINTS)
            },
            SessionState::Scanning {
                path,
                entries_found,
                bytes_found,
            } => {
                let mut status = format!(
                    "loading directory info for '{}'. Please wait...",
                    path.display()
                );
                if *entries_found > 0 {
                    status.push_str(&format!(
                        " {} entries found ({:.2} MB)",
                        entries_found,
                        size_in_mb(*bytes_found)
                    ));
                }
                Self {
                    spinner_active: true,
                    status: Some(status),
                    ..Self::empty(Stage::Scanning, SCANNING_HINTS)
                }
            }
            SessionState::ReadyToConfirm { snapshot } => Self {
                summary: Some(SnapshotSummary::new(snapshot)),
                ..Self::empty(Stage::ReadyToConfirm, CONFIRM_HINTS)
            },
            SessionState::Reading {
                snapshot,
                recent_events,
                files_read,
                errors,
                ..
            } => Self {
                spinner_active: true,
                status: Some("Reading files. Please wait...".to_string()),
                progress: Some(ReadProgressView {
                    files_read: *files_read,
                    files_total: snapshot.file_count(),
                    errors: *errors,
                    lines: recent_events.iter().map(ProgressLine::from_event).collect(),
                }),
                ..Self::empty(Stage::Reading, READING_HINTS)
            },
            SessionState::Done {
                files_read,
                errors,
                bytes_read,
                elapsed,
                ..
            } => Self {
                done: Some(DoneSummary {
                    files_read: *files_read,
                    errors: *errors,
                    read_mb: size_in_mb(*bytes_read),
                    elapsed: *elapsed,
                }),
                ..Self::empty(Stage::Done, DONE_HINTS)
            },
            SessionState::Failed { error, .. } => Self {
                error: Some(format!("Error fetching directory info: {}", error)),
                ..Self::empty(Stage::Failed, FAILED_HINTS)
            },
            SessionState::Exited => Self::empty(Stage::Exited, &[]),
        }
    }
}
