//! Keystroke edit buffer for free-text recall.
//!
//! The buffer is a small state machine driven by the render loop: it knows
//! nothing about drawing or polling, only how each key changes the text.

use crate::display::Key;

/// What the render loop should do after a key has been applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// Keep collecting keys.
    Editing,
    /// The participant submitted; carries the final text (possibly empty).
    Submitted(String),
    /// The participant aborted the session.
    Cancelled,
}

/// Accumulates typed characters until submit or cancel.
#[derive(Debug, Clone, Default)]
pub struct EditBuffer {
    text: String,
}

impl EditBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The text typed so far.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Apply one key.
    ///
    /// Letters are lowercased and appended, space appends a blank,
    /// backspace removes the last character. Any other key is ignored.
    pub fn apply(&mut self, key: Key) -> EditOutcome {
        match key {
            Key::Char(c) if c.is_ascii_alphabetic() => {
                self.text.push(c.to_ascii_lowercase());
            }
            Key::Space => self.text.push(' '),
            Key::Backspace => {
                self.text.pop();
            }
            Key::Submit => return EditOutcome::Submitted(std::mem::take(&mut self.text)),
            Key::Cancel => return EditOutcome::Cancelled,
            Key::Char(_) | Key::Other => {}
        }
        EditOutcome::Editing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_keys(buffer: &mut EditBuffer, keys: &[Key]) -> EditOutcome {
        let mut outcome = EditOutcome::Editing;
        for &key in keys {
            outcome = buffer.apply(key);
            if outcome != EditOutcome::Editing {
                break;
            }
        }
        outcome
    }

    #[test]
    fn letters_and_space_append() {
        let mut buffer = EditBuffer::new();
        let outcome = type_keys(
            &mut buffer,
            &[
                Key::Char('R'),
                Key::Char('e'),
                Key::Char('d'),
                Key::Space,
                Key::Char('x'),
                Key::Submit,
            ],
        );
        assert_eq!(outcome, EditOutcome::Submitted("red x".into()));
    }

    #[test]
    fn backspace_pops_and_tolerates_empty() {
        let mut buffer = EditBuffer::new();
        assert_eq!(buffer.apply(Key::Backspace), EditOutcome::Editing);
        assert!(buffer.is_empty());

        buffer.apply(Key::Char('a'));
        buffer.apply(Key::Char('b'));
        buffer.apply(Key::Backspace);
        assert_eq!(buffer.text(), "a");
    }

    #[test]
    fn submit_empty_returns_empty_text() {
        let mut buffer = EditBuffer::new();
        assert_eq!(buffer.apply(Key::Submit), EditOutcome::Submitted(String::new()));
    }

    #[test]
    fn digits_and_punctuation_are_ignored() {
        let mut buffer = EditBuffer::new();
        for key in [Key::Char('4'), Key::Char('!'), Key::Char('é'), Key::Other] {
            assert_eq!(buffer.apply(key), EditOutcome::Editing);
        }
        assert!(buffer.is_empty());
    }

    #[test]
    fn cancel_aborts_regardless_of_text() {
        let mut buffer = EditBuffer::new();
        buffer.apply(Key::Char('a'));
        assert_eq!(buffer.apply(Key::Cancel), EditOutcome::Cancelled);
    }
}
