//! Full-screen terminal display.

use std::io::{self, Stdout};
use std::path::Path;
use std::time::{Duration, Instant};

use crossterm::{
    cursor,
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use recall_core::display::{Display, Key, Scene};
use recall_core::error::ExperimentError;
use recall_core::model::Participant;

use crate::intake::{IntakeForm, IntakeOutcome};
use crate::keys::map_key;
use crate::media::{AudioPlayer, DurationProbe, MediaCommands};
use crate::render::render_scene;
use crate::theme::RecallTheme;

/// Input poll period of the intake dialog.
const INTAKE_POLL: Duration = Duration::from_millis(100);

/// A [`Display`] on the controlling terminal.
///
/// Owns raw mode and the alternate screen from [`open`](Self::open) until
/// [`close`](Display::close) or drop, whichever comes first.
pub struct TerminalDisplay {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    theme: RecallTheme,
    audio: AudioPlayer,
    probe: DurationProbe,
    restored: bool,
}

impl TerminalDisplay {
    pub fn open(media: MediaCommands) -> Result<Self, ExperimentError> {
        enable_raw_mode().map_err(backend_error)?;
        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen, cursor::Hide) {
            let _ = disable_raw_mode();
            return Err(backend_error(e));
        }
        let terminal = match Terminal::new(CrosstermBackend::new(stdout)) {
            Ok(terminal) => terminal,
            Err(e) => {
                let _ = disable_raw_mode();
                let _ = execute!(io::stdout(), LeaveAlternateScreen, cursor::Show);
                return Err(backend_error(e));
            }
        };

        tracing::debug!("terminal display opened");
        Ok(Self {
            terminal,
            theme: RecallTheme::default(),
            audio: AudioPlayer::new(media.audio_player),
            probe: DurationProbe::new(media.duration_probe, media.fallback),
            restored: false,
        })
    }

    /// Run the intake dialog. `None` when the participant pressed escape.
    pub fn intake(&mut self, form: IntakeForm) -> Result<Option<Participant>, ExperimentError> {
        let mut form = form;
        loop {
            let theme = &self.theme;
            self.terminal
                .draw(|f| form.render(f, theme))
                .map_err(backend_error)?;

            if !event::poll(INTAKE_POLL).map_err(backend_error)? {
                continue;
            }
            if let Event::Key(key) = event::read().map_err(backend_error)? {
                match form.handle_key(key) {
                    IntakeOutcome::Editing => {}
                    IntakeOutcome::Submitted(participant) => {
                        tracing::info!(participant = %participant.id, "intake completed");
                        return Ok(Some(participant));
                    }
                    IntakeOutcome::Cancelled => return Ok(None),
                }
            }
        }
    }

    fn restore(&mut self) -> Result<(), ExperimentError> {
        if self.restored {
            return Ok(());
        }
        self.restored = true;
        disable_raw_mode().map_err(backend_error)?;
        execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            cursor::Show
        )
        .map_err(backend_error)?;
        tracing::debug!("terminal restored");
        Ok(())
    }
}

fn backend_error(e: io::Error) -> ExperimentError {
    ExperimentError::Display(e.to_string())
}

impl Display for TerminalDisplay {
    fn draw(&mut self, scene: &Scene<'_>) -> Result<(), ExperimentError> {
        let theme = &self.theme;
        self.terminal
            .draw(|f| render_scene(f, scene, theme))
            .map_err(backend_error)?;
        Ok(())
    }

    fn poll_key(&mut self, timeout: Duration) -> Result<Option<Key>, ExperimentError> {
        if !event::poll(timeout).map_err(backend_error)? {
            return Ok(None);
        }
        match event::read().map_err(backend_error)? {
            Event::Key(key) => Ok(map_key(&key)),
            _ => Ok(None),
        }
    }

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn play_sound(&mut self, path: &Path) -> Result<(), ExperimentError> {
        self.audio.play(path);
        Ok(())
    }

    fn stop_sound(&mut self) {
        self.audio.stop();
    }

    fn media_duration(&mut self, path: &Path) -> Duration {
        self.probe.duration(path)
    }

    fn close(&mut self) -> Result<(), ExperimentError> {
        self.audio.stop();
        self.restore()
    }
}

impl Drop for TerminalDisplay {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            tracing::warn!("failed to restore terminal: {e}");
        }
    }
}
