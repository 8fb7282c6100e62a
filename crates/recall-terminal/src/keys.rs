//! Crossterm key events to session keys.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use recall_core::display::Key;

/// Map a key event. Releases and repeats are dropped.
///
/// Raw mode swallows SIGINT, so Ctrl-C aborts like escape.
pub fn map_key(event: &KeyEvent) -> Option<Key> {
    if event.kind != KeyEventKind::Press {
        return None;
    }
    if event.modifiers.contains(KeyModifiers::CONTROL) && event.code == KeyCode::Char('c') {
        return Some(Key::Cancel);
    }

    Some(match event.code {
        KeyCode::Char(' ') => Key::Space,
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Enter => Key::Submit,
        KeyCode::Esc => Key::Cancel,
        _ => Key::Other,
    })
}
