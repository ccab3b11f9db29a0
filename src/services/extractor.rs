use super::file_index::{FILE_RECORD_TAG, FileIndex};
use super::project_tree::{Node, ProjectError, ProjectTree};
use crate::models::config::DEFAULT_EXCLUDED_CLIP_PATTERN;
use crate::models::{ExtractionPlan, RelocateSettings, is_safe_name, join_logical};
use anyhow::{Context, Result};
use regex::Regex;

/// Marker used in the skip list for clips without a usable name.
pub const UNNAMED_CLIP: &str = "<unnamed clip>";

/// Turns the project's bin/clip tree into an [`ExtractionPlan`].
///
/// Bins become directories and clips become media file placements, each at
/// the path formed by the names of its enclosing bins. The walk is pre-order,
/// so every directory precedes its contents in the plan.
///
/// Clips whose name matches one of the exclusion patterns (After Effects
/// compositions by default) are dropped silently: they describe embedded
/// sub-projects and have no file of their own.
#[derive(Debug, Clone)]
pub struct HierarchyExtractor {
    excluded_clip_patterns: Vec<Regex>,
}

impl HierarchyExtractor {
    /// Create an extractor using the exclusion patterns from `settings`.
    pub fn new(settings: &RelocateSettings) -> Result<Self> {
        Self::with_patterns(settings.excluded_clip_patterns.as_slice())
    }

    pub fn with_patterns<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let excluded_clip_patterns = patterns
            .iter()
            .map(|pattern| {
                let pattern = pattern.as_ref();
                Regex::new(pattern)
                    .with_context(|| format!("Invalid clip exclusion pattern: {}", pattern))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            excluded_clip_patterns,
        })
    }

    pub fn is_excluded(&self, clip_name: &str) -> bool {
        self.excluded_clip_patterns
            .iter()
            .any(|pattern| pattern.is_match(clip_name))
    }

    /// Extract the plan from a parsed project.
    ///
    /// Fails only when the document is not an xmeml project at all; clips
    /// whose media cannot be resolved end up in [`ExtractionPlan::skipped`].
    pub fn extract(&self, tree: &ProjectTree) -> Result<ExtractionPlan, ProjectError> {
        let project = tree.project()?;
        let index = FileIndex::build(tree);
        let mut plan = ExtractionPlan::new();

        match project.child("children") {
            Some(children) => self.walk(children, "", &index, &mut plan),
            None => tracing::warn!("Project has no <children>, nothing to relocate"),
        }

        tracing::info!(
            "Extracted {} directories and {} media files ({} unresolved clips)",
            plan.directory_count(),
            plan.media_file_count(),
            plan.skipped.len()
        );

        Ok(plan)
    }

    fn walk(&self, node: &Node, path: &str, index: &FileIndex, plan: &mut ExtractionPlan) {
        for bin in node.children("bin") {
            let name = bin.child_text("name").unwrap_or_default();
            let bin_path = join_logical(path, name);

            if !is_safe_name(name) {
                tracing::warn!("Bin name {:?} is not a valid folder name, skipping its clips", name);
                self.skip_subtree(bin, &bin_path, plan);
                continue;
            }

            if name.is_empty() {
                tracing::warn!("Bin without a name under {:?}, merging into parent", path);
            } else {
                plan.push_directory(bin_path.clone());
            }

            if let Some(children) = bin.child("children") {
                self.walk(children, &bin_path, index, plan);
            }
        }

        for clip in node.children("clip") {
            let Some(name) = clip.child_text("name") else {
                tracing::warn!("Clip without a name under {:?}", path);
                plan.push_skipped(join_logical(path, UNNAMED_CLIP));
                continue;
            };

            if self.is_excluded(name) {
                tracing::debug!("Ignoring sub-project clip {}", name);
                continue;
            }

            let clip_path = join_logical(path, name);
            if !is_safe_name(name) {
                tracing::warn!("Clip name {:?} is not a valid file name, skipping", name);
                plan.push_skipped(clip_path);
                continue;
            }

            match clip_file_id(clip).and_then(|id| index.resolve(id)) {
                Some(source) => {
                    tracing::debug!("Planned {} from {}", clip_path, source);
                    plan.push_media_file(clip_path, source.to_path_buf());
                }
                None => {
                    tracing::debug!("No resolvable media for clip {}", clip_path);
                    plan.push_skipped(clip_path);
                }
            }
        }
    }

    /// Report every clip below a bin that cannot become a folder as skipped.
    fn skip_subtree(&self, bin: &Node, path: &str, plan: &mut ExtractionPlan) {
        let Some(children) = bin.child("children") else {
            return;
        };

        for nested in children.children("bin") {
            let name = nested.child_text("name").unwrap_or_default();
            self.skip_subtree(nested, &join_logical(path, name), plan);
        }

        for clip in children.children("clip") {
            match clip.child_text("name") {
                Some(name) if self.is_excluded(name) => {}
                Some(name) => plan.push_skipped(join_logical(path, name)),
                None => plan.push_skipped(join_logical(path, UNNAMED_CLIP)),
            }
        }
    }
}

impl Default for HierarchyExtractor {
    fn default() -> Self {
        Self {
            excluded_clip_patterns: vec![
                Regex::new(DEFAULT_EXCLUDED_CLIP_PATTERN).expect("Invalid sub-project regex"),
            ],
        }
    }
}

/// The media-bearing track of a clip: the first video track if there is
/// one, otherwise the first audio track.
fn media_track(clip: &Node) -> Option<&Node> {
    let media = clip.child("media")?;
    media
        .descend(&["video", "track"])
        .or_else(|| media.descend(&["audio", "track"]))
}

/// File identifier referenced by the clip's media-bearing track.
fn clip_file_id(clip: &Node) -> Option<&str> {
    media_track(clip)?
        .descend(&["clipitem", FILE_RECORD_TAG])?
        .attr("id")
}
