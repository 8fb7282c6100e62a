//! Terminal presentation for recall sessions.
//!
//! [`TerminalDisplay`] implements the core `Display` seam on a raw-mode,
//! alternate-screen terminal. Audio goes through an external player process;
//! sign videos are represented by their file name.

pub mod intake;
pub mod keys;
pub mod media;
pub mod render;
pub mod terminal;
pub mod theme;

pub use intake::{IntakeForm, IntakeOutcome};
pub use media::MediaCommands;
pub use terminal::TerminalDisplay;
pub use theme::RecallTheme;
