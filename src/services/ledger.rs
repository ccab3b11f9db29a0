//! The relocation ledger: `migrationInfo.json` in the target root.
//!
//! Written once at the end of a run, read by the editor-side relink step.

use crate::models::RelocationEntry;
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};

/// Well-known file name of the ledger inside the target root.
pub const LEDGER_FILE_NAME: &str = "migrationInfo.json";

pub fn ledger_path(target_root: &Utf8Path) -> Utf8PathBuf {
    target_root.join(LEDGER_FILE_NAME)
}

/// Write `entries` as the ledger of `target_root`, replacing any previous one.
///
/// Returns the path written.
pub async fn write_ledger(target_root: &Utf8Path, entries: &[RelocationEntry]) -> Result<Utf8PathBuf> {
    let path = ledger_path(target_root);
    let json = serde_json::to_string_pretty(entries).context("Failed to serialize relocation ledger")?;

    tokio::fs::write(&path, json)
        .await
        .with_context(|| format!("Failed to write relocation ledger: {}", path))?;

    tracing::info!("Wrote {} relocation entries to {}", entries.len(), path);
    Ok(path)
}

/// A loaded ledger answering old-path lookups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelocationLedger {
    entries: Vec<RelocationEntry>,
}

/// Result of matching a set of current media paths against the ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelinkPlan {
    /// `(current_path, new_path)` pairs safe to repoint.
    pub repoints: Vec<(String, String)>,
    /// Ledger destinations that do not exist on disk.
    pub missing: Vec<String>,
}

impl RelocationLedger {
    pub fn from_entries(entries: Vec<RelocationEntry>) -> Self {
        Self { entries }
    }

    pub async fn load(path: &Utf8Path) -> Result<Self> {
        let json = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read relocation ledger: {}", path))?;

        let entries: Vec<RelocationEntry> = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse relocation ledger: {}", path))?;

        tracing::info!("Loaded {} relocation entries from {}", entries.len(), path);
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[RelocationEntry] {
        &self.entries
    }

    /// Entry whose `oldPath` equals `current_path` with `\` normalized to `/`.
    pub fn lookup(&self, current_path: &str) -> Option<&RelocationEntry> {
        let normalized = current_path.replace('\\', "/");
        self.entries.iter().find(|entry| entry.old_path == normalized)
    }

    /// Match current media paths, keeping only destinations that exist.
    pub fn relink_candidates<'a, I>(&self, current_paths: I) -> RelinkPlan
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut plan = RelinkPlan::default();

        for current in current_paths {
            let Some(entry) = self.lookup(current) else {
                continue;
            };

            if Utf8Path::new(&entry.new_path).exists() {
                plan.repoints.push((current.to_string(), entry.new_path.clone()));
            } else {
                tracing::warn!("Relocated file does not exist: {}", entry.new_path);
                plan.missing.push(entry.new_path.clone());
            }
        }

        plan
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entry(old: &str, new: &str) -> RelocationEntry {
        RelocationEntry {
            old_path: old.to_string(),
            new_path: new.to_string(),
        }
    }

    #[tokio::test]
    async fn test_write_then_load() {
        let temp = TempDir::new().unwrap();
        let root = Utf8PathBuf::try_from(temp.path().to_path_buf()).unwrap();
        let entries = vec![
            entry("/src/A.mov", "/out/Interviews/A.mov"),
            entry("/src/A.mov", "/out/Selects/A.mov"),
        ];

        let path = write_ledger(&root, &entries).await.unwrap();
        assert_eq!(path, root.join("migrationInfo.json"));

        let raw: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw[0]["oldPath"], "/src/A.mov");
        assert_eq!(raw[1]["newPath"], "/out/Selects/A.mov");

        let ledger = RelocationLedger::load(&path).await.unwrap();
        assert_eq!(ledger.entries(), entries.as_slice());
    }

    #[tokio::test]
    async fn test_write_overwrites_previous_ledger() {
        let temp = TempDir::new().unwrap();
        let root = Utf8PathBuf::try_from(temp.path().to_path_buf()).unwrap();

        write_ledger(&root, &[entry("/a", "/b"), entry("/c", "/d")]).await.unwrap();
        let path = write_ledger(&root, &[]).await.unwrap();

        let ledger = RelocationLedger::load(&path).await.unwrap();
        assert!(ledger.entries().is_empty());
    }

    #[test]
    fn test_lookup_normalizes_backslashes() {
        let ledger = RelocationLedger::from_entries(vec![entry("C:/Footage/A.mov", "D:/out/A.mov")]);
        assert!(ledger.lookup(r"C:\Footage\A.mov").is_some());
        assert!(ledger.lookup("C:/Footage/B.mov").is_none());
    }

    #[test]
    fn test_relink_candidates_require_existing_destination() {
        let temp = TempDir::new().unwrap();
        let root = Utf8PathBuf::try_from(temp.path().to_path_buf()).unwrap();
        let present = root.join("A.mov");
        std::fs::write(&present, b"x").unwrap();
        let absent = root.join("B.mov");

        let ledger = RelocationLedger::from_entries(vec![
            entry("/src/A.mov", present.as_str()),
            entry("/src/B.mov", absent.as_str()),
        ]);

        let plan = ledger.relink_candidates(["/src/A.mov", "/src/B.mov", "/src/C.mov"]);
        assert_eq!(plan.repoints, vec![("/src/A.mov".to_string(), present.to_string())]);
        assert_eq!(plan.missing, vec![absent.to_string()]);
    }
}
