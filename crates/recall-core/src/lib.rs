//! recall-core — Stimulus catalog, sampling and session protocol.
//!
//! This crate defines the data model, the stratified experiment generator,
//! the show/test phase lifecycle and the session runner that the rest of
//! the recall workspace builds on. Presentation is abstracted behind the
//! [`display::Display`] trait.

pub mod catalog;
pub mod display;
pub mod edit;
pub mod error;
pub mod generator;
pub mod messages;
pub mod model;
pub mod phase;
pub mod scripted;
pub mod session;

pub use error::ExperimentError;
