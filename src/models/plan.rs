use camino::{Utf8Path, Utf8PathBuf};

/// A directory to create or a media file to place, relative to the target root.
///
/// Relative paths always use `/` as separator regardless of platform, so the
/// same plan produces the same ledger everywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannedItem {
    Directory {
        relative_path: String,
    },
    MediaFile {
        relative_path: String,
        source_path: Utf8PathBuf,
    },
}

impl PlannedItem {
    pub fn relative_path(&self) -> &str {
        match self {
            PlannedItem::Directory { relative_path } => relative_path,
            PlannedItem::MediaFile { relative_path, .. } => relative_path,
        }
    }

    /// Resolved source of a media file; `None` for directories.
    pub fn source_path(&self) -> Option<&Utf8Path> {
        match self {
            PlannedItem::Directory { .. } => None,
            PlannedItem::MediaFile { source_path, .. } => Some(source_path),
        }
    }
}

/// Output of the hierarchy extraction: the ordered work list plus the
/// relative paths of clips whose media could not be resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionPlan {
    pub items: Vec<PlannedItem>,
    pub skipped: Vec<String>,
}

impl ExtractionPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_directory(&mut self, relative_path: String) {
        self.items.push(PlannedItem::Directory { relative_path });
    }

    pub fn push_media_file(&mut self, relative_path: String, source_path: Utf8PathBuf) {
        self.items.push(PlannedItem::MediaFile {
            relative_path,
            source_path,
        });
    }

    pub fn push_skipped(&mut self, relative_path: String) {
        self.skipped.push(relative_path);
    }

    /// Relative paths of every planned directory, in plan order.
    pub fn directories(&self) -> impl Iterator<Item = &str> {
        self.items.iter().filter_map(|item| match item {
            PlannedItem::Directory { relative_path } => Some(relative_path.as_str()),
            PlannedItem::MediaFile { .. } => None,
        })
    }

    /// `(relative_path, source_path)` of every planned media file, in plan order.
    pub fn media_files(&self) -> impl Iterator<Item = (&str, &Utf8Path)> {
        self.items.iter().filter_map(|item| match item {
            PlannedItem::Directory { .. } => None,
            PlannedItem::MediaFile {
                relative_path,
                source_path,
            } => Some((relative_path.as_str(), source_path.as_path())),
        })
    }

    pub fn directory_count(&self) -> usize {
        self.directories().count()
    }

    pub fn media_file_count(&self) -> usize {
        self.media_files().count()
    }

    /// Total number of planned items (directories and files).
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Whether a bin or clip name can be used as a single path component.
///
/// Rejects `.` and `..` as well as names containing a separator of either
/// platform, so a joined logical path always stays below its base and every
/// parent of a planned file is itself a planned directory.
pub fn is_safe_name(name: &str) -> bool {
    !matches!(name, "." | "..") && !name.contains(['/', '\\'])
}

/// Join a logical (bin) path with a child name using `/`.
///
/// An empty base yields the name itself and an empty name yields the base, so
/// top-level items and nameless bins never produce leading or doubled slashes.
pub fn join_logical(base: &str, name: &str) -> String {
    let name = name.trim_matches('/');
    match (base.is_empty(), name.is_empty()) {
        (true, _) => name.to_string(),
        (false, true) => base.to_string(),
        (false, false) => format!("{}/{}", base.trim_end_matches('/'), name),
    }
}
