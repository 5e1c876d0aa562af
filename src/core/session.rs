//! Session state machine.
//!
//! The whole interactive flow is a pure function, [`next`], from the current
//! [`SessionState`] and one [`Event`] to the following state plus the
//! [`Command`]s the event loop must run. Commands start slow work on other
//! workers; their results come back later as events. Nothing in here touches
//! the terminal or the filesystem.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::models::error::ScanError;
use crate::models::progress::{ReadProgressEvent, RecentEvents};
use crate::models::snapshot::DirectorySnapshot;

use super::events::{Event, TextEdit};

/// Tag of a [`SessionState`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    AwaitingPath,
    Scanning,
    ReadyToConfirm,
    Reading,
    Done,
    Failed,
    Exited,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// Prompting for the directory to warm.
    AwaitingPath { input_buffer: String },
    /// Enumerating `path`; the counters follow the scan's live progress.
    Scanning {
        path: PathBuf,
        entries_found: u64,
        bytes_found: u64,
    },
    /// Scan finished; waiting for the user to start the read pass.
    ReadyToConfirm { snapshot: Arc<DirectorySnapshot> },
    Reading {
        snapshot: Arc<DirectorySnapshot>,
        recent_events: RecentEvents,
        files_read: u64,
        errors: u64,
        bytes_read: u64,
    },
    Done {
        snapshot: Arc<DirectorySnapshot>,
        files_read: u64,
        errors: u64,
        bytes_read: u64,
        elapsed: Duration,
    },
    Failed {
        prior_stage: Stage,
        error: ScanError,
        /// Path the failed attempt used, restored into the prompt on back.
        last_input: String,
    },
    /// Quit was requested. Absorbs every later event.
    Exited,
}

impl Default for SessionState {
    fn default() -> Self {
        SessionState::awaiting_path(String::new())
    }
}

impl SessionState {
    pub fn awaiting_path(input_buffer: impl Into<String>) -> Self {
        SessionState::AwaitingPath {
            input_buffer: input_buffer.into(),
        }
    }

    pub fn stage(&self) -> Stage {
        match self {
            SessionState::AwaitingPath { .. } => Stage::AwaitingPath,
            SessionState::Scanning { .. } => Stage::Scanning,
            SessionState::ReadyToConfirm { .. } => Stage::ReadyToConfirm,
            SessionState::Reading { .. } => Stage::Reading,
            SessionState::Done { .. } => Stage::Done,
            SessionState::Failed { .. } => Stage::Failed,
            SessionState::Exited => Stage::Exited,
        }
    }
}

/// Work the event loop performs on behalf of the session.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    StartScan(PathBuf),
    StartRead(Arc<DirectorySnapshot>),
    /// Cancel in-flight work and leave.
    Exit,
}

/// Applies `event` to `state`.
///
/// Events that do not apply to the current stage leave the state unchanged
/// and emit nothing; this is how results from abandoned work are ignored.
pub fn next(state: SessionState, event: Event) -> (SessionState, Vec<Command>) {
    use SessionState::*;

    match (state, event) {
        (Exited, _) => (Exited, vec![]),
        (_, Event::Quit) => (Exited, vec![Command::Exit]),

        (AwaitingPath { input_buffer }, Event::Edit(edit)) => {
            (SessionState::awaiting_path(apply_edit(input_buffer, &edit)), vec![])
        }
        (AwaitingPath { input_buffer }, Event::Confirm) => {
            let trimmed = input_buffer.trim();
            if trimmed.is_empty() {
                return (AwaitingPath { input_buffer }, vec![]);
            }
            let path = PathBuf::from(trimmed);
            (
                Scanning {
                    path: path.clone(),
                    entries_found: 0,
                    bytes_found: 0,
                },
                vec![Command::StartScan(path)],
            )
        }

        (Scanning { path, .. }, Event::ScanProgress { entries, total_size }) => (
            Scanning {
                path,
                entries_found: entries,
                bytes_found: total_size,
            },
            vec![],
        ),
        (Scanning { .. }, Event::ScanCompleted(snapshot)) => (ReadyToConfirm { snapshot }, vec![]),
        (Scanning { path, .. }, Event::ScanFailed(error)) => (
            Failed {
                prior_stage: Stage::AwaitingPath,
                error,
                last_input: path.to_string_lossy().into_owned(),
            },
            vec![],
        ),

        (ReadyToConfirm { snapshot }, Event::Back) => (prompt_for(&snapshot), vec![]),
        (ReadyToConfirm { snapshot }, Event::Confirm) => (
            Reading {
                snapshot: Arc::clone(&snapshot),
                recent_events: RecentEvents::new(),
                files_read: 0,
                errors: 0,
                bytes_read: 0,
            },
            vec![Command::StartRead(snapshot)],
        ),

        (
            Reading {
                snapshot,
                recent_events,
                files_read,
                errors,
                bytes_read,
            },
            Event::ReadProgress(progress),
        ) => (
            apply_progress(snapshot, recent_events, files_read, errors, bytes_read, progress),
            vec![],
        ),

        (Done { snapshot, .. }, Event::Back) => (prompt_for(&snapshot), vec![]),
        (Failed { last_input, .. }, Event::Back) => (SessionState::awaiting_path(last_input), vec![]),

        (state, _) => (state, vec![]),
    }
}

fn prompt_for(snapshot: &DirectorySnapshot) -> SessionState {
    SessionState::awaiting_path(snapshot.root_path().to_string_lossy())
}

fn apply_progress(
    snapshot: Arc<DirectorySnapshot>,
    recent_events: RecentEvents,
    files_read: u64,
    errors: u64,
    bytes_read: u64,
    progress: ReadProgressEvent,
) -> SessionState {
    if progress.terminal {
        return SessionState::Done {
            snapshot,
            files_read,
            errors,
            bytes_read,
            elapsed: progress.elapsed,
        };
    }

    // A per-file error is recorded like any other outcome; the pass goes on.
    let errors = errors + u64::from(progress.error.is_some());
    SessionState::Reading {
        snapshot,
        files_read: progress.files_read,
        bytes_read: bytes_read + progress.bytes_read,
        errors,
        recent_events: recent_events.pushed(progress),
    }
}

fn apply_edit(mut buffer: String, edit: &TextEdit) -> String {
    match edit {
        TextEdit::Insert(c) => buffer.push(*c),
        TextEdit::Backspace => {
            buffer.pop();
        }
        TextEdit::DeleteWord => {
            let is_separator = |c: char| c.is_whitespace() || c == '/';
            let trimmed = buffer.trim_end_matches(is_separator);
            let word_start = trimmed
                .char_indices()
                .rev()
                .find(|&(_, c)| is_separator(c))
                .map(|(i, c)| i + c.len_utf8())
                .unwrap_or(0);
            buffer.truncate(word_start);
        }
        TextEdit::Clear => buffer.clear(),
    }
    buffer
}
