//! Services module - the extraction and reconciliation engine.
//!
//! Data flows through the services in this order:
//!
//! 1. [`ProjectTree`]: parses project XML into a normalized tree where every
//!    repeatable child kind is an ordered sequence
//! 2. [`FileIndex`]: resolves clip → file identifiers through the project's
//!    file records, using [`resolve_path_url`] to turn `pathurl` values into paths
//! 3. [`HierarchyExtractor`]: walks the bin/clip tree into an
//!    [`ExtractionPlan`](crate::models::ExtractionPlan)
//! 4. [`Reconciler`]: creates the directories and copies, moves or links the
//!    files under the target root
//! 5. [`write_ledger`]: persists the old → new path mapping, which
//!    [`RelocationLedger`] reads back for relinking
//!
//! The services hold no global state; everything a run accumulates lives in a
//! [`ReconcileState`](crate::state::ReconcileState) owned by the caller.

pub mod extractor;
pub mod file_index;
pub mod ledger;
pub mod path_resolver;
pub mod project_tree;
pub mod reconciler;

pub use extractor::HierarchyExtractor;
pub use file_index::FileIndex;
pub use ledger::{LEDGER_FILE_NAME, RelinkPlan, RelocationLedger, ledger_path, write_ledger};
pub use path_resolver::resolve_path_url;
pub use project_tree::{Node, ProjectError, ProjectTree};
pub use reconciler::Reconciler;
