use crossterm::event::{self, Event as TermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Duration;

use crate::core::events::{Event, TextEdit};
use crate::core::session::Stage;

/// Translates a key press into a session event. `None` for keys the
/// current stage doesn't bind.
pub fn handle_key_event(key: KeyEvent, stage: Stage) -> Option<Event> {
    if key.kind == KeyEventKind::Release {
        return None;
    }

    // Handle Ctrl+C globally
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Event::Quit);
    }

    match stage {
        Stage::AwaitingPath => handle_prompt_mode(key),
        _ => handle_normal_mode(key),
    }
}

/// While the prompt has focus every printable key is text, `q` included.
fn handle_prompt_mode(key: KeyEvent) -> Option<Event> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Enter => Some(Event::Confirm),
        KeyCode::Backspace => Some(Event::Edit(TextEdit::Backspace)),
        KeyCode::Char('w') if ctrl => Some(Event::Edit(TextEdit::DeleteWord)),
        KeyCode::Char('u') if ctrl => Some(Event::Edit(TextEdit::Clear)),
        KeyCode::Char(_) if ctrl => None,
        KeyCode::Char(c) => Some(Event::Edit(TextEdit::Insert(c))),
        _ => None,
    }
}

fn handle_normal_mode(key: KeyEvent) -> Option<Event> {
    match key.code {
        KeyCode::Char('q') => Some(Event::Quit),
        KeyCode::Enter => Some(Event::Confirm),
        KeyCode::Esc | KeyCode::Backspace => Some(Event::Back),
        _ => None,
    }
}

pub fn poll_event(timeout: Duration) -> anyhow::Result<Option<TermEvent>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}
