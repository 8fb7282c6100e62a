//! Scripted display for tests and headless sessions.
//!
//! Plays back a list of recall answers, continues past every "press any key"
//! message, and runs timed waits on a virtual clock so a whole session
//! completes instantly.

use std::collections::{HashMap, VecDeque};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::display::{render_text, Display, Key, Scene};
use crate::error::ExperimentError;

/// One scripted recall answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedAnswer {
    /// Type the text, then press return.
    Text(String),
    /// Let `Duration` pass on the virtual clock, then type the text.
    After(Duration, String),
    /// Press escape.
    Cancel,
}

impl ScriptedAnswer {
    pub fn text(s: &str) -> Self {
        ScriptedAnswer::Text(s.to_string())
    }
}

/// What the last drawn scene expects from input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expecting {
    Nothing,
    AnyKey,
    Answer,
}

/// A [`Display`] driven by a script instead of a keyboard.
pub struct ScriptedDisplay {
    answers: Box<dyn Iterator<Item = ScriptedAnswer>>,
    pending: VecDeque<Key>,
    hold_until: Option<Instant>,
    start: Instant,
    now: Instant,
    expecting: Expecting,
    draws: usize,
    cancel_at_draw: Option<usize>,
    cancel_pending: bool,
    frames: Vec<String>,
    echo: Option<Box<dyn Write>>,
    played: Vec<PathBuf>,
    stops: usize,
    durations: HashMap<PathBuf, Duration>,
    default_duration: Duration,
    closed: bool,
}

impl ScriptedDisplay {
    /// Create a display that answers recall prompts from `answers`, in order.
    ///
    /// When the answers run out, the next recall prompt is cancelled.
    pub fn new(answers: Vec<ScriptedAnswer>) -> Self {
        Self::from_answers(answers)
    }

    /// Create a display that pulls answers lazily, e.g. from stdin lines.
    pub fn from_answers<I>(answers: I) -> Self
    where
        I: IntoIterator<Item = ScriptedAnswer>,
        I::IntoIter: 'static,
    {
        let now = Instant::now();
        Self {
            answers: Box::new(answers.into_iter()),
            pending: VecDeque::new(),
            hold_until: None,
            start: now,
            now,
            expecting: Expecting::Nothing,
            draws: 0,
            cancel_at_draw: None,
            cancel_pending: false,
            frames: Vec::new(),
            echo: None,
            played: Vec::new(),
            stops: 0,
            durations: HashMap::new(),
            default_duration: Duration::from_secs(2),
            closed: false,
        }
    }

    /// Press escape right after the `n`th draw (1-based).
    pub fn cancel_at_draw(mut self, n: usize) -> Self {
        self.cancel_at_draw = Some(n);
        self
    }

    /// Write every new frame to `writer` as it is drawn.
    pub fn with_echo(mut self, writer: Box<dyn Write>) -> Self {
        self.echo = Some(writer);
        self
    }

    /// Report `duration` as the playback length of `path`.
    pub fn with_media_duration(mut self, path: impl Into<PathBuf>, duration: Duration) -> Self {
        self.durations.insert(path.into(), duration);
        self
    }

    /// Playback length reported for media without an explicit duration.
    pub fn with_default_duration(mut self, duration: Duration) -> Self {
        self.default_duration = duration;
        self
    }

    /// Virtual time elapsed since the display was created.
    pub fn elapsed(&self) -> Duration {
        self.now.duration_since(self.start)
    }

    /// Total number of draw calls.
    pub fn draw_count(&self) -> usize {
        self.draws
    }

    /// Distinct consecutive frames, as plain text.
    pub fn frames(&self) -> &[String] {
        &self.frames
    }

    /// Every sound started, in order.
    pub fn played(&self) -> &[PathBuf] {
        &self.played
    }

    /// Number of stop requests.
    pub fn stop_count(&self) -> usize {
        self.stops
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn advance(&mut self, by: Duration) {
        self.now += by;
    }

    fn next_answer_keys(&mut self) -> Option<Key> {
        match self.answers.next() {
            Some(ScriptedAnswer::Text(text)) => {
                self.queue_text(&text);
                self.pending.pop_front()
            }
            Some(ScriptedAnswer::After(delay, text)) => {
                self.hold_until = Some(self.now + delay);
                self.queue_text(&text);
                None
            }
            Some(ScriptedAnswer::Cancel) | None => Some(Key::Cancel),
        }
    }

    fn queue_text(&mut self, text: &str) {
        self.pending.extend(text.chars().map(Key::from_char));
        self.pending.push_back(Key::Submit);
    }
}

impl Display for ScriptedDisplay {
    fn draw(&mut self, scene: &Scene<'_>) -> Result<(), ExperimentError> {
        self.draws += 1;
        if self.cancel_at_draw == Some(self.draws) {
            self.cancel_pending = true;
        }

        self.expecting = match scene {
            Scene::Message {
                awaiting_key: true, ..
            } => Expecting::AnyKey,
            Scene::Recall { .. } => Expecting::Answer,
            _ => Expecting::Nothing,
        };

        let text = render_text(scene);
        if self.frames.last() != Some(&text) {
            if let Some(echo) = self.echo.as_mut() {
                writeln!(echo, "{text}")?;
                echo.flush()?;
            }
            self.frames.push(text);
        }
        Ok(())
    }

    fn poll_key(&mut self, timeout: Duration) -> Result<Option<Key>, ExperimentError> {
        if std::mem::take(&mut self.cancel_pending) {
            return Ok(Some(Key::Cancel));
        }

        if let Some(until) = self.hold_until {
            if self.now < until {
                let step = timeout.min(until - self.now);
                self.advance(step);
                return Ok(None);
            }
            self.hold_until = None;
        }

        if let Some(key) = self.pending.pop_front() {
            return Ok(Some(key));
        }

        match self.expecting {
            Expecting::AnyKey => Ok(Some(Key::Submit)),
            Expecting::Answer => match self.next_answer_keys() {
                Some(key) => Ok(Some(key)),
                None => {
                    // answer is delayed; time passes
                    self.poll_key(timeout)
                }
            },
            Expecting::Nothing => {
                self.advance(timeout);
                Ok(None)
            }
        }
    }

    fn now(&self) -> Instant {
        self.now
    }

    fn play_sound(&mut self, path: &Path) -> Result<(), ExperimentError> {
        self.played.push(path.to_path_buf());
        Ok(())
    }

    fn stop_sound(&mut self) {
        self.stops += 1;
    }

    fn media_duration(&mut self, path: &Path) -> Duration {
        self.durations
            .get(path)
            .copied()
            .unwrap_or(self.default_duration)
    }

    fn close(&mut self) -> Result<(), ExperimentError> {
        self.closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: Duration = Duration::from_millis(50);

    fn recall_scene() -> Scene<'static> {
        Scene::Recall {
            kind: crate::model::StimulusKind::Word,
            stimulus: "tree.wav",
            prompt: "What does this word mean?",
            answer: "",
        }
    }

    #[test]
    fn answers_become_keys_then_submit() {
        let mut display = ScriptedDisplay::new(vec![ScriptedAnswer::text("a b")]);
        display.draw(&recall_scene()).unwrap();
        let mut keys = Vec::new();
        while let Some(key) = display.poll_key(FRAME).unwrap() {
            keys.push(key);
            if key == Key::Submit {
                break;
            }
        }
        assert_eq!(
            keys,
            vec![Key::Char('a'), Key::Space, Key::Char('b'), Key::Submit]
        );
        assert_eq!(display.elapsed(), Duration::ZERO);
    }

    #[test]
    fn exhausted_script_cancels() {
        let mut display = ScriptedDisplay::new(Vec::new());
        display.draw(&recall_scene()).unwrap();
        assert_eq!(display.poll_key(FRAME).unwrap(), Some(Key::Cancel));
    }

    #[test]
    fn delayed_answer_advances_clock() {
        let mut display = ScriptedDisplay::new(vec![ScriptedAnswer::After(
            Duration::from_millis(120),
            "x".into(),
        )]);
        display.draw(&recall_scene()).unwrap();
        let mut polls = 0;
        let first = loop {
            polls += 1;
            if let Some(key) = display.poll_key(FRAME).unwrap() {
                break key;
            }
        };
        assert_eq!(first, Key::Char('x'));
        assert_eq!(display.elapsed(), Duration::from_millis(120));
        assert_eq!(polls, 4);
    }

    #[test]
    fn idle_scenes_advance_by_timeout() {
        let mut display = ScriptedDisplay::new(Vec::new());
        display
            .draw(&Scene::WordExposure {
                meaning: "tree",
                sound: "tree.wav",
            })
            .unwrap();
        assert_eq!(display.poll_key(FRAME).unwrap(), None);
        assert_eq!(display.elapsed(), FRAME);
    }

    #[test]
    fn media_durations() {
        let mut display = ScriptedDisplay::new(Vec::new())
            .with_media_duration("video/a.mp4", Duration::from_secs(4))
            .with_default_duration(Duration::from_secs(1));
        assert_eq!(
            display.media_duration(Path::new("video/a.mp4")),
            Duration::from_secs(4)
        );
        assert_eq!(
            display.media_duration(Path::new("video/b.mp4")),
            Duration::from_secs(1)
        );
    }
}
