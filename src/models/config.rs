use serde::{Deserialize, Serialize};

/// Default pattern for clips that denote embedded sub-projects (After Effects
/// compositions) rather than media.
pub const DEFAULT_EXCLUDED_CLIP_PATTERN: &str = r"(?i)\.aep$";

/// Default number of filesystem operations in flight per phase.
pub const DEFAULT_MAX_CONCURRENT_OPERATIONS: usize = 16;

/// Settings loaded from the optional YAML settings file.
///
/// Every field has a default, so a partial file (or none at all) is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelocateSettings {
    /// Regex patterns matched against clip names; matching clips are ignored
    /// entirely (neither planned nor reported as skipped).
    #[serde(default = "default_excluded_clip_patterns")]
    pub excluded_clip_patterns: Vec<String>,

    #[serde(default = "default_max_concurrent_operations")]
    pub max_concurrent_operations: usize,
}

impl Default for RelocateSettings {
    fn default() -> Self {
        Self {
            excluded_clip_patterns: default_excluded_clip_patterns(),
            max_concurrent_operations: default_max_concurrent_operations(),
        }
    }
}

fn default_excluded_clip_patterns() -> Vec<String> {
    vec![DEFAULT_EXCLUDED_CLIP_PATTERN.to_string()]
}

fn default_max_concurrent_operations() -> usize {
    DEFAULT_MAX_CONCURRENT_OPERATIONS
}

/// How media files reach their destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransferMode {
    #[default]
    Copy,
    /// Copy, then remove the source.
    Move,
    /// Create a symbolic link pointing at the source.
    Link,
}

impl TransferMode {
    /// Resolve the mode from the `delete` / `symlink` switches.
    ///
    /// The command line rejects both switches together; should they still
    /// both be set, `delete` wins.
    pub fn from_flags(delete: bool, symlink: bool) -> Self {
        match (delete, symlink) {
            (true, _) => TransferMode::Move,
            (false, true) => TransferMode::Link,
            (false, false) => TransferMode::Copy,
        }
    }

    /// Verb used in console messages, e.g. "Copying 12 items".
    pub fn verb(&self) -> &'static str {
        match self {
            TransferMode::Copy => "Copying",
            TransferMode::Move => "Moving",
            TransferMode::Link => "Creating symlinks for",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_defaults() {
        let settings = RelocateSettings::default();
        assert_eq!(settings.excluded_clip_patterns, vec![r"(?i)\.aep$".to_string()]);
        assert_eq!(settings.max_concurrent_operations, 16);
    }

    #[test]
    fn test_partial_settings_fill_defaults() {
        let settings: RelocateSettings =
            serde_yaml_ng::from_str("max_concurrent_operations: 4\n").unwrap();
        assert_eq!(settings.max_concurrent_operations, 4);
        assert_eq!(settings.excluded_clip_patterns.len(), 1);
    }

    #[test]
    fn test_transfer_mode_from_flags() {
        assert_eq!(TransferMode::from_flags(false, false), TransferMode::Copy);
        assert_eq!(TransferMode::from_flags(true, false), TransferMode::Move);
        assert_eq!(TransferMode::from_flags(false, true), TransferMode::Link);
    }
}
