//! Presentation seam.
//!
//! A [`Display`] is the single long-lived resource a session draws on. It is
//! owned by the session runner and handed explicitly to each phase; nothing
//! in the protocol reaches for a global window.

use std::path::Path;
use std::time::{Duration, Instant};

use crate::error::ExperimentError;
use crate::model::StimulusKind;

/// One frame's worth of content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scene<'a> {
    /// A full-screen message. `awaiting_key` is false for timed messages.
    Message { text: &'a str, awaiting_key: bool },
    /// A meaning shown while its word sound plays.
    WordExposure { meaning: &'a str, sound: &'a str },
    /// A looping sign shown together with its meaning.
    SignExposure { meaning: &'a str, video: &'a str },
    /// The stimulus alone, with the answer typed so far.
    Recall {
        kind: StimulusKind,
        stimulus: &'a str,
        prompt: &'a str,
        answer: &'a str,
    },
}

/// Placeholder shown while the recall answer is empty.
pub const ANSWER_PLACEHOLDER: &str = "Type your answer. When you are done press return.";

/// An input event, already mapped from the backend's key codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Space,
    Backspace,
    /// Return / enter.
    Submit,
    /// Escape: aborts the whole session.
    Cancel,
    /// Any other key. Still counts for "press any key".
    Other,
}

impl Key {
    /// Map a typed character to a key.
    pub fn from_char(c: char) -> Self {
        match c {
            ' ' => Key::Space,
            '\n' | '\r' => Key::Submit,
            c => Key::Char(c),
        }
    }
}

/// A presentation backend.
pub trait Display {
    /// Render a scene. Called once per frame.
    fn draw(&mut self, scene: &Scene<'_>) -> Result<(), ExperimentError>;

    /// Wait up to `timeout` for a key.
    fn poll_key(&mut self, timeout: Duration) -> Result<Option<Key>, ExperimentError>;

    /// The display's clock. Timed waits are measured against it.
    fn now(&self) -> Instant;

    /// Start playing a sound file, restarting it if it is already playing.
    fn play_sound(&mut self, path: &Path) -> Result<(), ExperimentError>;

    /// Stop any sound that is playing.
    fn stop_sound(&mut self);

    /// Natural playback length of a media file.
    fn media_duration(&mut self, path: &Path) -> Duration;

    /// Release presentation resources. Called once when a session ends.
    fn close(&mut self) -> Result<(), ExperimentError> {
        self.stop_sound();
        Ok(())
    }
}

impl<D: Display + ?Sized> Display for Box<D> {
    fn draw(&mut self, scene: &Scene<'_>) -> Result<(), ExperimentError> {
        (**self).draw(scene)
    }

    fn poll_key(&mut self, timeout: Duration) -> Result<Option<Key>, ExperimentError> {
        (**self).poll_key(timeout)
    }

    fn now(&self) -> Instant {
        (**self).now()
    }

    fn play_sound(&mut self, path: &Path) -> Result<(), ExperimentError> {
        (**self).play_sound(path)
    }

    fn stop_sound(&mut self) {
        (**self).stop_sound()
    }

    fn media_duration(&mut self, path: &Path) -> Duration {
        (**self).media_duration(path)
    }

    fn close(&mut self) -> Result<(), ExperimentError> {
        (**self).close()
    }
}

/// Redraw `scene` every frame until `duration` has elapsed.
///
/// Checks for an abort once per frame.
pub fn responsive_wait(
    display: &mut dyn Display,
    scene: &Scene<'_>,
    duration: Duration,
    frame: Duration,
) -> Result<(), ExperimentError> {
    let start = display.now();
    loop {
        display.draw(scene)?;
        let elapsed = display.now().saturating_duration_since(start);
        if elapsed >= duration {
            return Ok(());
        }
        if let Some(Key::Cancel) = display.poll_key(frame.min(duration - elapsed))? {
            return Err(ExperimentError::Cancelled);
        }
    }
}

/// How long a message stays on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageWait {
    /// Until any key is pressed.
    AnyKey,
    /// For a fixed time, no input required.
    Timed(Duration),
}

/// Show a full-screen message.
pub fn show_message(
    display: &mut dyn Display,
    text: &str,
    wait: MessageWait,
    frame: Duration,
) -> Result<(), ExperimentError> {
    match wait {
        MessageWait::AnyKey => {
            let scene = Scene::Message {
                text,
                awaiting_key: true,
            };
            loop {
                display.draw(&scene)?;
                match display.poll_key(frame)? {
                    Some(Key::Cancel) => return Err(ExperimentError::Cancelled),
                    Some(_) => return Ok(()),
                    None => {}
                }
            }
        }
        MessageWait::Timed(duration) => {
            let scene = Scene::Message {
                text,
                awaiting_key: false,
            };
            responsive_wait(display, &scene, duration, frame)
        }
    }
}

/// Plain-text rendering of a scene, for line-oriented output and tests.
pub fn render_text(scene: &Scene<'_>) -> String {
    match scene {
        Scene::Message { text, .. } => format!("[message] {text}"),
        Scene::WordExposure { meaning, sound } => {
            format!("[word] {meaning} (playing {sound})")
        }
        Scene::SignExposure { meaning, video } => format!("[sign] {meaning} (showing {video})"),
        Scene::Recall {
            kind,
            stimulus,
            prompt,
            answer,
        } => {
            let answer = if answer.is_empty() {
                ANSWER_PLACEHOLDER
            } else {
                answer
            };
            format!("[recall {kind}] {stimulus}: {prompt} > {answer}")
        }
    }
}
