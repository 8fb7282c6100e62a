//! Experiment phases.
//!
//! A phase pairs one stimulus with its meaning and knows how to present it
//! passively (exposure) and how to elicit its meaning (recall). The kind of
//! stimulus decides how both steps behave.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::catalog::MediaLayout;
use crate::display::{responsive_wait, Display, Scene};
use crate::edit::{EditBuffer, EditOutcome};
use crate::error::ExperimentError;
use crate::model::{Association, StimulusKind};

/// Timing of exposure and recall steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresentationTiming {
    /// Meaning alone on screen before the first word playback.
    pub lead_in: Duration,
    /// How long each word playback is held.
    pub hold: Duration,
    /// How many times a word is played during exposure.
    pub repetitions: u32,
    /// Meaning alone on screen after the last word playback.
    pub trail: Duration,
    /// Sign exposure lasts this many natural playbacks of the video.
    pub sign_loops: u32,
    /// Word sounds are replayed this often while waiting for an answer.
    pub replay_interval: Duration,
    /// How long the completion message stays up.
    pub completion: Duration,
    /// Render loop period; input is polled once per frame.
    pub frame: Duration,
}

impl Default for PresentationTiming {
    fn default() -> Self {
        Self {
            lead_in: Duration::from_secs(1),
            hold: Duration::from_secs(3),
            repetitions: 2,
            trail: Duration::from_secs(1),
            sign_loops: 2,
            replay_interval: Duration::from_secs(3),
            completion: Duration::from_secs(3),
            frame: Duration::from_millis(50),
        }
    }
}

/// Everything a phase needs besides the display.
#[derive(Debug, Clone)]
pub struct PhaseContext {
    pub layout: MediaLayout,
    pub timing: PresentationTiming,
}

/// One stimulus-bearing unit of the experiment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Phase {
    pub kind: StimulusKind,
    /// Ground-truth meaning.
    pub meaning: String,
    /// Media file name of the stimulus.
    pub stimulus: String,
}

impl Phase {
    pub fn word(meaning: &str, sound: &str) -> Self {
        Self {
            kind: StimulusKind::Word,
            meaning: meaning.to_string(),
            stimulus: sound.to_string(),
        }
    }

    pub fn sign(meaning: &str, video: &str) -> Self {
        Self {
            kind: StimulusKind::Sign,
            meaning: meaning.to_string(),
            stimulus: video.to_string(),
        }
    }

    /// Wrap the `kind` side of an association.
    pub fn from_association(association: &Association, kind: StimulusKind) -> Self {
        Self {
            kind,
            meaning: association.meaning.clone(),
            stimulus: association.stimulus(kind).to_string(),
        }
    }

    /// The question shown during recall.
    pub fn prompt(&self) -> &'static str {
        match self.kind {
            StimulusKind::Word => "What does this word mean?",
            StimulusKind::Sign => "What does this sign mean?",
        }
    }

    /// Present the stimulus together with its meaning.
    ///
    /// Words: lead-in, then each playback held for `hold`, then trail.
    /// Signs: the looping video for `sign_loops` natural playbacks.
    pub fn expose(
        &self,
        display: &mut dyn Display,
        ctx: &PhaseContext,
    ) -> Result<(), ExperimentError> {
        let timing = &ctx.timing;
        let path = ctx.layout.resolve(self.kind, &self.stimulus);

        match self.kind {
            StimulusKind::Word => {
                let scene = Scene::WordExposure {
                    meaning: &self.meaning,
                    sound: &self.stimulus,
                };
                responsive_wait(display, &scene, timing.lead_in, timing.frame)?;
                for _ in 0..timing.repetitions {
                    display.play_sound(&path)?;
                    responsive_wait(display, &scene, timing.hold, timing.frame)?;
                }
                responsive_wait(display, &scene, timing.trail, timing.frame)
            }
            StimulusKind::Sign => {
                let scene = Scene::SignExposure {
                    meaning: &self.meaning,
                    video: &self.stimulus,
                };
                let clip = display.media_duration(&path);
                responsive_wait(
                    display,
                    &scene,
                    clip.saturating_mul(timing.sign_loops),
                    timing.frame,
                )
            }
        }
    }

    /// Present the stimulus alone and collect the typed meaning.
    ///
    /// Blocks until the participant submits. Words are replayed every
    /// `replay_interval` while waiting. Returns the typed text, possibly empty.
    pub fn recall(
        &self,
        display: &mut dyn Display,
        ctx: &PhaseContext,
    ) -> Result<String, ExperimentError> {
        let sound = match self.kind {
            StimulusKind::Word => Some(ctx.layout.resolve(self.kind, &self.stimulus)),
            StimulusKind::Sign => None,
        };

        if let Some(path) = &sound {
            display.play_sound(path)?;
        }
        let result = self.edit_loop(display, ctx, sound.as_deref());
        if sound.is_some() {
            display.stop_sound();
        }
        result
    }

    fn edit_loop(
        &self,
        display: &mut dyn Display,
        ctx: &PhaseContext,
        sound: Option<&std::path::Path>,
    ) -> Result<String, ExperimentError> {
        let mut buffer = EditBuffer::new();
        let mut last_played = display.now();

        loop {
            display.draw(&Scene::Recall {
                kind: self.kind,
                stimulus: &self.stimulus,
                prompt: self.prompt(),
                answer: buffer.text(),
            })?;

            if let Some(key) = display.poll_key(ctx.timing.frame)? {
                match buffer.apply(key) {
                    EditOutcome::Editing => {}
                    EditOutcome::Submitted(text) => return Ok(text),
                    EditOutcome::Cancelled => return Err(ExperimentError::Cancelled),
                }
            }

            if let Some(path) = sound {
                let now = display.now();
                if now.saturating_duration_since(last_played) >= ctx.timing.replay_interval {
                    last_played = now;
                    display.play_sound(path)?;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scripted::{ScriptedAnswer, ScriptedDisplay};
    use std::path::PathBuf;

    fn ctx() -> PhaseContext {
        PhaseContext {
            layout: MediaLayout::new("sound", "video"),
            timing: PresentationTiming::default(),
        }
    }

    #[test]
    fn word_exposure_timing_and_playbacks() {
        let mut display = ScriptedDisplay::new(Vec::new());
        Phase::word("tree", "tree.wav")
            .expose(&mut display, &ctx())
            .unwrap();

        assert_eq!(display.elapsed(), Duration::from_secs(8));
        assert_eq!(
            display.played(),
            &[PathBuf::from("sound/tree.wav"), PathBuf::from("sound/tree.wav")]
        );
        assert_eq!(display.frames(), &["[word] tree (playing tree.wav)".to_string()]);
    }

    #[test]
    fn sign_exposure_lasts_two_playbacks() {
        let mut display = ScriptedDisplay::new(Vec::new())
            .with_media_duration("video/tree.mp4", Duration::from_millis(2500));
        Phase::sign("tree", "tree.mp4")
            .expose(&mut display, &ctx())
            .unwrap();

        assert_eq!(display.elapsed(), Duration::from_secs(5));
        assert!(display.played().is_empty());
    }

    #[test]
    fn oversized_sign_clip_waits_until_cancelled() {
        let mut display = ScriptedDisplay::new(Vec::new())
            .with_media_duration("video/tree.mp4", Duration::MAX)
            .cancel_at_draw(3);
        let err = Phase::sign("tree", "tree.mp4")
            .expose(&mut display, &ctx())
            .unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(display.elapsed(), ctx().timing.frame * 2);
    }

    #[test]
    fn recall_returns_typed_text() {
        let mut display = ScriptedDisplay::new(vec![ScriptedAnswer::text("Big tree")]);
        let answer = Phase::sign("tree", "tree.mp4")
            .recall(&mut display, &ctx())
            .unwrap();
        assert_eq!(answer, "big tree");
        assert!(display
            .frames()
            .iter()
            .all(|f| f.starts_with("[recall sign] tree.mp4: What does this sign mean?")));
    }

    #[test]
    fn recall_allows_empty_answer() {
        let mut display = ScriptedDisplay::new(vec![ScriptedAnswer::text("")]);
        let answer = Phase::word("tree", "tree.wav")
            .recall(&mut display, &ctx())
            .unwrap();
        assert_eq!(answer, "");
    }

    #[test]
    fn word_recall_replays_and_stops_sound() {
        let mut display = ScriptedDisplay::new(vec![ScriptedAnswer::After(
            Duration::from_secs(7),
            "tree".into(),
        )]);
        let answer = Phase::word("tree", "tree.wav")
            .recall(&mut display, &ctx())
            .unwrap();
        assert_eq!(answer, "tree");
        // initial playback plus replays at 3s and 6s
        assert_eq!(display.played().len(), 3);
        assert_eq!(display.stop_count(), 1);
    }

    #[test]
    fn recall_cancel_stops_sound_and_errors() {
        let mut display = ScriptedDisplay::new(vec![ScriptedAnswer::Cancel]);
        let err = Phase::word("tree", "tree.wav")
            .recall(&mut display, &ctx())
            .unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(display.stop_count(), 1);
    }

    #[test]
    fn from_association_picks_side() {
        let a = Association {
            meaning: "tree".into(),
            word: "tree.wav".into(),
            sign: "tree.mp4".into(),
            word_difficulty: String::new(),
            sign_difficulty: String::new(),
        };
        assert_eq!(
            Phase::from_association(&a, StimulusKind::Sign),
            Phase::sign("tree", "tree.mp4")
        );
    }
}
