use crate::models::RelocateSettings;
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

/// Settings file looked up in the current directory when none is given.
pub const DEFAULT_SETTINGS_FILE: &str = "binshift.yaml";

/// Configuration manager for the YAML settings file.
///
/// The file is optional: a missing file yields [`RelocateSettings::default()`],
/// an unreadable or invalid one is an error.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    settings_path: Utf8PathBuf,
}

impl ConfigManager {
    /// Create a ConfigManager for the given settings file.
    pub fn new<P: AsRef<Utf8Path>>(settings_path: P) -> Self {
        Self {
            settings_path: settings_path.as_ref().to_path_buf(),
        }
    }

    /// Load the settings file.
    ///
    /// # Returns
    /// The loaded settings, or defaults if the file doesn't exist
    pub fn load_settings(&self) -> Result<RelocateSettings> {
        if !self.settings_path.exists() {
            tracing::info!(
                "Settings file not found at {}, using defaults",
                self.settings_path
            );
            return Ok(RelocateSettings::default());
        }

        let file_contents = fs::read_to_string(&self.settings_path)
            .with_context(|| format!("Failed to read settings: {}", self.settings_path))?;

        let settings: RelocateSettings = serde_yaml_ng::from_str(&file_contents)
            .with_context(|| format!("Failed to parse settings: {}", self.settings_path))?;

        tracing::info!("Loaded settings from {}", self.settings_path);
        Ok(settings)
    }

    /// Save the settings file, creating its directory if needed.
    pub fn save_settings(&self, settings: &RelocateSettings) -> Result<()> {
        if let Some(parent) = self.settings_path.parent() {
            if !parent.as_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create settings directory: {}", parent))?;
            }
        }

        let yaml_string =
            serde_yaml_ng::to_string(settings).context("Failed to serialize settings to YAML")?;

        fs::write(&self.settings_path, yaml_string)
            .with_context(|| format!("Failed to write settings: {}", self.settings_path))?;

        tracing::info!("Saved settings to {}", self.settings_path);
        Ok(())
    }

    pub fn settings_path(&self) -> &Utf8Path {
        &self.settings_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new(DEFAULT_SETTINGS_FILE)
    }
}
