// Run state module
//
// ReconcileState is the per-run accumulator shared by every concurrently
// settling filesystem operation. It emits progress events for presentation.

use crate::metrics::RunMetrics;
use crate::models::{ItemError, PlacementOutcome, ReconcileReport, RelocationEntry};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::broadcast;

/// Reconciliation phases, in execution order
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Directories,
    Files,
}

/// Progress events emitted while a plan is being realized
#[derive(Clone, Debug, PartialEq)]
pub enum ProgressEvent {
    /// A phase is about to launch `items` operations
    PhaseStarted { phase: Phase, items: usize },

    /// One more item settled (success, skip or failure)
    ItemCompleted { completed: usize, total: usize },
}

#[derive(Debug, Default)]
struct Accumulated {
    skipped: Vec<String>,
    errors: Vec<ItemError>,
    /// Realized relocations tagged with their position among the plan's files
    realized: Vec<(usize, RelocationEntry)>,
}

/// Shared accumulator for one reconciliation run.
///
/// Every recording method takes `&self`; the completed counter is atomic and
/// the lists sit behind a mutex, so arbitrary interleaving of settling
/// operations never drops an increment or an entry.
///
/// Subscribe with [`subscribe()`](Self::subscribe) before the run starts to
/// drive a progress indicator. The channel closes when the state is consumed
/// by [`into_report()`](Self::into_report).
pub struct ReconcileState {
    total: usize,
    completed: AtomicUsize,
    accumulated: Mutex<Accumulated>,
    metrics: RunMetrics,
    progress_tx: broadcast::Sender<ProgressEvent>,
}

impl ReconcileState {
    /// Create the state for a plan of `total` items (directories and files)
    pub fn new(total: usize) -> Self {
        let (progress_tx, _) = broadcast::channel(100);
        Self {
            total,
            completed: AtomicUsize::new(0),
            accumulated: Mutex::new(Accumulated::default()),
            metrics: RunMetrics::new(),
            progress_tx,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ProgressEvent> {
        self.progress_tx.subscribe()
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    pub fn metrics(&self) -> &RunMetrics {
        &self.metrics
    }

    pub fn start_phase(&self, phase: Phase, items: usize) {
        tracing::info!("Starting {:?} phase with {} items", phase, items);
        // Ignore send errors - it's OK if no one is listening
        let _ = self
            .progress_tx
            .send(ProgressEvent::PhaseStarted { phase, items });
    }

    /// Record the outcome of creating one directory
    pub fn record_directory(&self, relative_path: &str, result: Result<(), String>) {
        match result {
            Ok(()) => self.metrics.record_directory_created(),
            Err(message) => {
                tracing::warn!("Failed to create directory {}: {}", relative_path, message);
                self.metrics.record_directory_failed();
                self.accumulated.lock().errors.push(ItemError {
                    path: relative_path.to_string(),
                    message,
                });
            }
        }
        self.advance();
    }

    /// Record the outcome of placing one media file
    ///
    /// `position` is the file's index among the plan's media files; it restores
    /// plan order in the final relocation list.
    pub fn record_file(
        &self,
        position: usize,
        relative_path: &str,
        entry: RelocationEntry,
        outcome: PlacementOutcome,
    ) {
        let realized = outcome.is_realized();
        match outcome {
            PlacementOutcome::Placed { bytes } => self.metrics.record_file_placed(bytes),
            PlacementOutcome::Skipped => {
                tracing::debug!("Destination exists, skipping {}", relative_path);
                self.metrics.record_file_skipped();
                self.accumulated.lock().skipped.push(relative_path.to_string());
            }
            PlacementOutcome::Failed { message } => {
                tracing::warn!("Error encountered while processing item {}: {}", relative_path, message);
                self.metrics.record_file_failed();
                self.accumulated.lock().errors.push(ItemError {
                    path: relative_path.to_string(),
                    message,
                });
            }
        }
        if realized {
            self.accumulated.lock().realized.push((position, entry));
        }
        self.advance();
    }

    fn advance(&self) {
        let completed = self.completed.fetch_add(1, Ordering::SeqCst) + 1;
        let _ = self.progress_tx.send(ProgressEvent::ItemCompleted {
            completed,
            total: self.total,
        });
    }

    /// Consume the state into the final report
    pub fn into_report(self) -> ReconcileReport {
        let completed = self.completed();
        let Accumulated {
            skipped,
            errors,
            mut realized,
        } = self.accumulated.into_inner();

        realized.sort_by_key(|(position, _)| *position);

        ReconcileReport {
            skipped,
            errors,
            relocations: realized.into_iter().map(|(_, entry)| entry).collect(),
            completed,
            total: self.total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str) -> RelocationEntry {
        RelocationEntry {
            old_path: format!("/src/{}", name),
            new_path: format!("/out/{}", name),
        }
    }

    #[test]
    fn test_outcomes_are_partitioned() {
        let state = ReconcileState::new(4);

        state.record_directory("Bin", Ok(()));
        state.record_file(0, "Bin/a", entry("a"), PlacementOutcome::Placed { bytes: 5 });
        state.record_file(1, "Bin/b", entry("b"), PlacementOutcome::Skipped);
        state.record_file(
            2,
            "Bin/c",
            entry("c"),
            PlacementOutcome::Failed {
                message: "permission denied".to_string(),
            },
        );

        let report = state.into_report();
        assert_eq!(report.completed, 4);
        assert_eq!(report.skipped, vec!["Bin/b".to_string()]);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].path, "Bin/c");
        assert_eq!(report.relocations, vec![entry("a"), entry("b")]);
    }

    #[test]
    fn test_relocations_restore_plan_order() {
        let state = ReconcileState::new(3);
        state.record_file(2, "c", entry("c"), PlacementOutcome::Placed { bytes: 0 });
        state.record_file(0, "a", entry("a"), PlacementOutcome::Placed { bytes: 0 });
        state.record_file(1, "b", entry("b"), PlacementOutcome::Skipped);

        let report = state.into_report();
        assert_eq!(report.relocations, vec![entry("a"), entry("b"), entry("c")]);
    }

    #[test]
    fn test_progress_events() {
        let state = ReconcileState::new(2);
        let mut rx = state.subscribe();

        state.start_phase(Phase::Directories, 1);
        state.record_directory("Bin", Err("read-only filesystem".to_string()));

        assert_eq!(
            rx.try_recv().unwrap(),
            ProgressEvent::PhaseStarted {
                phase: Phase::Directories,
                items: 1
            }
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            ProgressEvent::ItemCompleted {
                completed: 1,
                total: 2
            }
        );
        assert_eq!(state.metrics().directories_failed.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_concurrent_recording_loses_nothing() {
        let state = std::sync::Arc::new(ReconcileState::new(800));
        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let state = std::sync::Arc::clone(&state);
                std::thread::spawn(move || {
                    for i in 0..100 {
                        let position = worker * 100 + i;
                        state.record_file(
                            position,
                            "x",
                            entry(&position.to_string()),
                            PlacementOutcome::Skipped,
                        );
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let state = std::sync::Arc::into_inner(state).unwrap();
        let report = state.into_report();
        assert_eq!(report.completed, 800);
        assert_eq!(report.skipped.len(), 800);
        assert_eq!(report.relocations.len(), 800);
        assert_eq!(report.relocations[0].old_path, "/src/0");
    }
}
