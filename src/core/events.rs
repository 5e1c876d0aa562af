use std::sync::Arc;

use tokio::sync::mpsc;

use crate::models::error::ScanError;
use crate::models::progress::ReadProgressEvent;
use crate::models::snapshot::DirectorySnapshot;

/// Edits applied to the path input while it has focus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextEdit {
    Insert(char),
    Backspace,
    DeleteWord,
    Clear,
}

/// Everything the session reacts to: user input and results from the
/// scan and read workers.
#[derive(Debug, Clone)]
pub enum Event {
    // User input
    Edit(TextEdit),
    Confirm,
    Back,
    Quit,

    // Scan worker
    ScanProgress { entries: u64, total_size: u64 },
    ScanCompleted(Arc<DirectorySnapshot>),
    ScanFailed(ScanError),

    // Read worker
    ReadProgress(ReadProgressEvent),
}

pub type EventSender = mpsc::UnboundedSender<Event>;
pub type EventReceiver = mpsc::UnboundedReceiver<Event>;

pub fn create_event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}
