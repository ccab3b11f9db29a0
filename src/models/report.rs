use serde::{Deserialize, Serialize};

/// Outcome of placing a single media file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlacementOutcome {
    /// The file was copied, moved or linked. `bytes` is 0 for links.
    Placed { bytes: u64 },
    /// The destination already existed; neither side was touched.
    Skipped,
    Failed { message: String },
}

impl PlacementOutcome {
    /// Whether the destination names a usable file after this outcome.
    pub fn is_realized(&self) -> bool {
        !matches!(self, PlacementOutcome::Failed { .. })
    }
}

/// A per-item failure, keyed by the item's relative path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemError {
    pub path: String,
    pub message: String,
}

/// One old-path → new-path mapping of the relocation ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelocationEntry {
    pub old_path: String,
    pub new_path: String,
}

/// Everything the reconciler reports back once both phases settled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Relative paths whose destination already existed.
    pub skipped: Vec<String>,
    pub errors: Vec<ItemError>,
    /// Realized media files in plan order.
    pub relocations: Vec<RelocationEntry>,
    pub completed: usize,
    pub total: usize,
}

impl ReconcileReport {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}
