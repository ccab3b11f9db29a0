// binshift - reorganize the media of an editing project along its bins
//
// This is the library crate containing the extraction and reconciliation engine.
// The binary crate (main.rs) provides the command-line entry point.

pub mod config;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod state;
pub mod ui;

// Re-export commonly used types for convenience
pub use config::ConfigManager;
pub use models::{ExtractionPlan, PlannedItem, ReconcileReport, RelocateSettings, TransferMode};
pub use services::{HierarchyExtractor, ProjectTree, Reconciler};
pub use state::{ProgressEvent, ReconcileState};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
