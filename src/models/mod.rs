//! Data models shared by the extraction and reconciliation services.
//!
//! - [`ExtractionPlan`] / [`PlannedItem`]: the flat work list produced from the project's bins
//! - [`ReconcileReport`], [`PlacementOutcome`], [`ItemError`]: what the filesystem phase reports
//! - [`RelocationEntry`]: one old-path → new-path record of the relocation ledger
//! - [`RelocateSettings`] / [`TransferMode`]: settings file contents and the copy/move/link switch

pub mod config;
pub mod plan;
pub mod report;

pub use config::{RelocateSettings, TransferMode};
pub use plan::{ExtractionPlan, PlannedItem, is_safe_name, join_logical};
pub use report::{ItemError, PlacementOutcome, ReconcileReport, RelocationEntry};
