use crate::models::config::DEFAULT_MAX_CONCURRENT_OPERATIONS;
use crate::models::{ExtractionPlan, PlacementOutcome, ReconcileReport, RelocationEntry, TransferMode};
use crate::state::{Phase, ReconcileState};
use anyhow::{Context, Result};
use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::io;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Realizes an [`ExtractionPlan`] under a target root.
///
/// Runs in two phases joined by a barrier: first every directory is created,
/// then every media file is placed. Within a phase operations run concurrently
/// (bounded by `max_concurrent`) and settle independently; a failing item is
/// recorded and never aborts its siblings.
///
/// Destinations are created exclusively. A file whose destination already
/// exists (including a dangling symlink) is skipped without touching either
/// side, which makes re-running the same plan a no-op. When several clips map
/// to the same destination, the first in plan order owns it and the others
/// fail with their sources left in place.
#[derive(Debug, Clone)]
pub struct Reconciler {
    target_root: Utf8PathBuf,
    mode: TransferMode,
    max_concurrent: usize,
}

impl Reconciler {
    /// Create a reconciler for `target_root`, made absolute against the
    /// current directory.
    pub fn new(target_root: impl AsRef<Utf8Path>, mode: TransferMode) -> Result<Self> {
        let target_root = target_root.as_ref();
        let absolute = std::path::absolute(target_root)
            .with_context(|| format!("Failed to resolve target directory: {}", target_root))?;
        let target_root = Utf8PathBuf::from_path_buf(absolute).map_err(|path| {
            anyhow::anyhow!("Target directory is not valid UTF-8: {}", path.display())
        })?;

        Ok(Self {
            target_root,
            mode,
            max_concurrent: DEFAULT_MAX_CONCURRENT_OPERATIONS,
        })
    }

    /// Limit the number of operations in flight per phase (at least 1).
    pub fn with_concurrency(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    pub fn target_root(&self) -> &Utf8Path {
        &self.target_root
    }

    /// Destination of a relative plan path, or `None` when the path is empty,
    /// absolute, or steps out of the target root.
    pub fn destination(&self, relative_path: &str) -> Option<Utf8PathBuf> {
        let relative = Utf8Path::new(relative_path);
        let contained = !relative_path.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Utf8Component::Normal(_)));
        contained.then(|| self.target_root.join(relative))
    }

    /// Realize `plan` with a fresh state and return the report.
    pub async fn run(&self, plan: &ExtractionPlan) -> Result<ReconcileReport> {
        let state = ReconcileState::new(plan.len());
        self.reconcile(plan, &state).await?;
        Ok(state.into_report())
    }

    /// Realize `plan`, recording every outcome into `state`.
    ///
    /// Only failing to create the target root itself is fatal.
    pub async fn reconcile(&self, plan: &ExtractionPlan, state: &ReconcileState) -> Result<()> {
        fs::create_dir_all(&self.target_root)
            .await
            .with_context(|| format!("Failed to create target directory: {}", self.target_root))?;

        tracing::info!(
            "Reconciling {} items into {} ({:?} mode)",
            plan.len(),
            self.target_root,
            self.mode
        );

        state.start_phase(Phase::Directories, plan.directory_count());
        stream::iter(plan.directories())
            .for_each_concurrent(self.max_concurrent, |relative_path| async move {
                let result = match self.destination(relative_path) {
                    Some(directory) => fs::create_dir_all(&directory)
                        .await
                        .map_err(|err| format!("Failed to create {}: {}", directory, err)),
                    None => Err(format!("{} is outside the target directory", relative_path)),
                };
                state.record_directory(relative_path, result);
            })
            .await;

        let mut claimed = HashSet::new();
        let duplicates: Vec<bool> = plan
            .media_files()
            .map(|(relative_path, _)| !claimed.insert(relative_path))
            .collect();
        let duplicates = duplicates.as_slice();

        state.start_phase(Phase::Files, plan.media_file_count());
        stream::iter(plan.media_files().enumerate())
            .for_each_concurrent(self.max_concurrent, |(position, (relative_path, source))| async move {
                let outcome = if duplicates[position] {
                    PlacementOutcome::Failed {
                        message: format!("Another clip already targets {}", relative_path),
                    }
                } else {
                    match self.destination(relative_path) {
                        Some(destination) => self.place_file(source, &destination).await,
                        None => PlacementOutcome::Failed {
                            message: format!("{} is outside the target directory", relative_path),
                        },
                    }
                };
                let entry = RelocationEntry {
                    old_path: source.to_string(),
                    new_path: to_forward_slashes(&self.target_root.join(relative_path)),
                };
                state.record_file(position, relative_path, entry, outcome);
            })
            .await;

        tracing::info!(
            "Reconciliation finished: {}/{} items settled",
            state.completed(),
            state.total()
        );
        Ok(())
    }

    /// Place a single file, never returning an error.
    ///
    /// The destination is created exclusively, so an existing entry (placed
    /// earlier, or by anyone else) turns into [`PlacementOutcome::Skipped`]
    /// instead of being overwritten.
    pub async fn place_file(&self, source: &Utf8Path, destination: &Utf8Path) -> PlacementOutcome {
        let outcome = match self.mode {
            TransferMode::Link => match create_symlink(source, destination).await {
                Ok(()) => PlacementOutcome::Placed { bytes: 0 },
                Err(err) if err.kind() == io::ErrorKind::AlreadyExists => PlacementOutcome::Skipped,
                Err(err) => PlacementOutcome::Failed {
                    message: format!("Failed to link {} to {}: {}", destination, source, err),
                },
            },
            TransferMode::Copy | TransferMode::Move => {
                let file = fs::OpenOptions::new()
                    .write(true)
                    .create_new(true)
                    .open(destination)
                    .await;
                match file {
                    Ok(file) => match self.fill(source, destination, file).await {
                        Ok(bytes) => PlacementOutcome::Placed { bytes },
                        Err(err) => PlacementOutcome::Failed {
                            message: format!("{:#}", err),
                        },
                    },
                    Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                        PlacementOutcome::Skipped
                    }
                    Err(err) => PlacementOutcome::Failed {
                        message: format!("Failed to create {}: {}", destination, err),
                    },
                }
            }
        };

        if let PlacementOutcome::Placed { .. } = outcome {
            tracing::debug!("Placed {} -> {}", source, destination);
        }
        outcome
    }

    /// Copy `source` into the freshly created `file`, then remove the source
    /// in move mode. On failure the destination is removed again.
    async fn fill(&self, source: &Utf8Path, destination: &Utf8Path, mut file: fs::File) -> Result<u64> {
        let copied = copy_into(source, &mut file).await;
        drop(file);

        let bytes = match copied {
            Ok(bytes) => bytes,
            Err(err) => {
                discard_partial(destination).await;
                return Err(err)
                    .with_context(|| format!("Failed to copy {} to {}", source, destination));
            }
        };

        if self.mode == TransferMode::Move {
            if let Err(err) = fs::remove_file(source).await {
                // Keep the item all-or-nothing: the source stays, the copy goes.
                discard_partial(destination).await;
                return Err(err).with_context(|| format!("Failed to remove original {}", source));
            }
        }
        Ok(bytes)
    }
}

async fn copy_into(source: &Utf8Path, file: &mut fs::File) -> io::Result<u64> {
    let mut reader = fs::File::open(source).await?;
    let bytes = tokio::io::copy(&mut reader, file).await?;
    file.flush().await?;
    let permissions = reader.metadata().await?.permissions();
    file.set_permissions(permissions).await?;
    Ok(bytes)
}

/// Remove a destination this run created.
async fn discard_partial(destination: &Utf8Path) {
    if let Err(err) = fs::remove_file(destination).await {
        if err.kind() != io::ErrorKind::NotFound {
            tracing::warn!("Failed to clean up {}: {}", destination, err);
        }
    }
}

#[cfg(unix)]
async fn create_symlink(source: &Utf8Path, destination: &Utf8Path) -> io::Result<()> {
    fs::symlink(source, destination).await
}

#[cfg(windows)]
async fn create_symlink(source: &Utf8Path, destination: &Utf8Path) -> io::Result<()> {
    fs::symlink_file(source, destination).await
}

/// Render a path with `/` separators, as stored in the relocation ledger.
pub fn to_forward_slashes(path: &Utf8Path) -> String {
    path.as_str().replace('\\', "/")
}
