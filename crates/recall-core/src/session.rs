//! Session runner.
//!
//! Sequences the phases of a [`SessionPlan`] through the fixed protocol:
//! welcome, two exposure passes, one recall pass, then persistence. Each
//! pass walks the same phases in a fresh random order. The protocol cannot
//! be resumed; an abort at any point before persistence discards everything.

use std::fmt;

use anyhow::{Context, Result};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::display::{show_message, Display, MessageWait};
use crate::error::ExperimentError;
use crate::generator::SessionPlan;
use crate::messages;
use crate::model::{Participant, RecallRecord, SessionResult};
use crate::phase::{Phase, PhaseContext};

/// Where a session is in its protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Init,
    ExposurePass1,
    ExposurePass2,
    RecallPass,
    Persisted,
    Done,
    Cancelled,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Init => "init",
            SessionState::ExposurePass1 => "exposure pass 1",
            SessionState::ExposurePass2 => "exposure pass 2",
            SessionState::RecallPass => "recall pass",
            SessionState::Persisted => "persisted",
            SessionState::Done => "done",
            SessionState::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// Destination for the results of a completed session.
pub trait ResultSink {
    /// Write the records for `participant`, replacing any earlier output.
    fn write(&mut self, participant: &Participant, result: &SessionResult) -> Result<()>;
}

/// Keeps written results in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub writes: Vec<(Participant, SessionResult)>,
}

impl ResultSink for MemorySink {
    fn write(&mut self, participant: &Participant, result: &SessionResult) -> Result<()> {
        self.writes.push((participant.clone(), result.clone()));
        Ok(())
    }
}

/// Progress reporting trait.
pub trait SessionObserver {
    fn on_state(&self, _state: SessionState) {}
    fn on_exposed(&self, _pass: u8, _position: usize, _phase: &Phase) {}
    fn on_recalled(&self, _position: usize, _record: &RecallRecord) {}
}

/// No-op observer.
pub struct NoopObserver;

impl SessionObserver for NoopObserver {}

/// Logs session progress through `tracing`.
pub struct TracingObserver;

impl SessionObserver for TracingObserver {
    fn on_state(&self, state: SessionState) {
        tracing::info!(%state, "session state changed");
    }

    fn on_exposed(&self, pass: u8, position: usize, phase: &Phase) {
        tracing::debug!(
            pass,
            position,
            kind = %phase.kind,
            stimulus = %phase.stimulus,
            "phase exposed"
        );
    }

    fn on_recalled(&self, position: usize, record: &RecallRecord) {
        tracing::debug!(
            position,
            stimulus = %record.stimulus,
            empty = record.recalled_text.is_empty(),
            "phase recalled"
        );
    }
}

/// Runs one session on a display it owns.
pub struct SessionRunner<D: Display, R: Rng> {
    display: D,
    rng: R,
    ctx: PhaseContext,
    state: SessionState,
}

impl<D: Display, R: Rng> SessionRunner<D, R> {
    pub fn new(display: D, rng: R, ctx: PhaseContext) -> Self {
        Self {
            display,
            rng,
            ctx,
            state: SessionState::Init,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    /// Run the full protocol and persist the results through `sink`.
    ///
    /// On abort the error is [`ExperimentError::Cancelled`] and `sink` is not
    /// touched. The display is closed however the session ends.
    pub fn run(
        &mut self,
        plan: &SessionPlan,
        sink: &mut dyn ResultSink,
        observer: &dyn SessionObserver,
    ) -> Result<SessionResult> {
        anyhow::ensure!(
            self.state == SessionState::Init,
            "session already {}; a runner can only run once",
            self.state
        );

        let outcome = self.run_protocol(plan, sink, observer);
        let closed = self.display.close();

        match outcome {
            Ok(result) => {
                closed.context("failed to close display")?;
                Ok(result)
            }
            Err(e) => {
                let cancelled = e
                    .downcast_ref::<ExperimentError>()
                    .is_some_and(ExperimentError::is_cancelled);
                if cancelled {
                    self.transition(SessionState::Cancelled, observer);
                }
                if let Err(close_err) = closed {
                    tracing::warn!("failed to close display: {close_err}");
                }
                Err(e)
            }
        }
    }

    fn run_protocol(
        &mut self,
        plan: &SessionPlan,
        sink: &mut dyn ResultSink,
        observer: &dyn SessionObserver,
    ) -> Result<SessionResult> {
        let counts = &plan.counts;
        tracing::info!(
            participant = %plan.participant.id,
            words = counts.words,
            signs = counts.signs,
            total = counts.total(),
            "starting session"
        );

        self.message(&messages::welcome())?;
        self.message(&messages::itinerary(counts))?;

        self.transition(SessionState::ExposurePass1, observer);
        self.exposure_pass(1, &plan.phases, observer)?;
        self.message(&messages::break_message(counts))?;

        self.transition(SessionState::ExposurePass2, observer);
        self.exposure_pass(2, &plan.phases, observer)?;
        self.message(&messages::recall_instructions(counts))?;

        self.transition(SessionState::RecallPass, observer);
        let result = self.recall_pass(&plan.phases, observer)?;

        sink.write(&plan.participant, &result)
            .context("failed to persist session results")?;
        self.transition(SessionState::Persisted, observer);

        // Results are safe; an abort now only cuts the goodbye short.
        match show_message(
            &mut self.display,
            &messages::completion(),
            MessageWait::Timed(self.ctx.timing.completion),
            self.ctx.timing.frame,
        ) {
            Ok(()) | Err(ExperimentError::Cancelled) => {}
            Err(e) => return Err(e.into()),
        }
        self.transition(SessionState::Done, observer);

        Ok(result)
    }

    fn message(&mut self, text: &str) -> Result<(), ExperimentError> {
        show_message(
            &mut self.display,
            text,
            MessageWait::AnyKey,
            self.ctx.timing.frame,
        )
    }

    fn transition(&mut self, state: SessionState, observer: &dyn SessionObserver) {
        self.state = state;
        observer.on_state(state);
    }

    /// A fresh random permutation of `phases`.
    fn shuffled<'p>(&mut self, phases: &'p [Phase]) -> Vec<&'p Phase> {
        let mut order: Vec<&Phase> = phases.iter().collect();
        order.shuffle(&mut self.rng);
        order
    }

    fn exposure_pass(
        &mut self,
        pass: u8,
        phases: &[Phase],
        observer: &dyn SessionObserver,
    ) -> Result<(), ExperimentError> {
        for (position, phase) in self.shuffled(phases).into_iter().enumerate() {
            phase.expose(&mut self.display, &self.ctx)?;
            observer.on_exposed(pass, position, phase);
        }
        Ok(())
    }

    fn recall_pass(
        &mut self,
        phases: &[Phase],
        observer: &dyn SessionObserver,
    ) -> Result<SessionResult, ExperimentError> {
        let mut result = SessionResult::new();
        for (position, phase) in self.shuffled(phases).into_iter().enumerate() {
            let recalled_text = phase.recall(&mut self.display, &self.ctx)?;
            let record = RecallRecord {
                meaning: phase.meaning.clone(),
                stimulus: phase.stimulus.clone(),
                recalled_text,
            };
            observer.on_recalled(position, &record);
            result.push(record);
        }
        Ok(result)
    }
}
