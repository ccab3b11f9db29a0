//! Console presentation for the command-line front end.
//!
//! - [`terminal`]: progress bar driven by reconciliation progress events, and
//!   the end-of-run report

pub mod terminal;

pub use terminal::{print_report, spawn_progress_bar};
