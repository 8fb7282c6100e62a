//! Result sinks for recall sessions.
//!
//! - [`table`]: the per-participant output table (`<id>-output.csv`)
//! - [`summary`]: the JSON session summary (`<id>-session.json`)

pub mod summary;
pub mod table;

pub use summary::{SessionSummary, SummarySink};
pub use table::{read_results, write_results, CsvSink};
