//! Bridge configuration loaded from `bridge.toml`.
//!
//! Every field has a default, so an empty file (or no file at all) yields a
//! working configuration:
//!
//! ```toml
//! [materialize]
//! policy = "always-overwrite"
//! preserve = ["config_panel.ini"]
//!
//! [import.filters]
//! texture = ["image/png", "image/jpeg"]
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::import::ImportPurpose;
use crate::materialize::OverwritePolicy;

/// File name of the native UI layout state, relative to the storage root.
pub const DEFAULT_UI_STATE_FILE: &str = "config_panel.ini";

/// Top-level bridge configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BridgeConfig {
    pub materialize: MaterializeConfig,
    pub import: ImportConfig,
    pub engine: EngineConfig,
}

/// Settings for copying the bundle into storage.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MaterializeConfig {
    /// Global policy for files that already exist in storage.
    pub policy: OverwritePolicy,
    /// Relative paths that are never overwritten once present.
    pub preserve: Vec<String>,
    /// Copy buffer size in bytes.
    pub chunk_size: usize,
}

impl Default for MaterializeConfig {
    fn default() -> Self {
        Self {
            policy: OverwritePolicy::PreserveIfPresent,
            preserve: vec![DEFAULT_UI_STATE_FILE.to_owned()],
            chunk_size: 4096,
        }
    }
}

/// Settings for picker-driven imports.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImportConfig {
    /// Drain buffer size in bytes.
    pub chunk_size: usize,
    pub filters: MimeFilters,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            chunk_size: crate::content::DEFAULT_CHUNK_SIZE,
            filters: MimeFilters::default(),
        }
    }
}

/// Content types the picker offers for each purpose.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MimeFilters {
    pub scene: Vec<String>,
    pub texture: Vec<String>,
}

impl MimeFilters {
    pub fn for_purpose(&self, purpose: ImportPurpose) -> &[String] {
        match purpose {
            ImportPurpose::Scene => &self.scene,
            ImportPurpose::Texture => &self.texture,
        }
    }
}

impl Default for MimeFilters {
    fn default() -> Self {
        Self {
            scene: vec![
                "model/obj".to_owned(),
                "application/octet-stream".to_owned(),
                "text/plain".to_owned(),
            ],
            texture: vec!["image/png".to_owned()],
        }
    }
}

/// Settings forwarded to the native engine at startup.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// UI state file, relative to the storage root.
    pub ui_state_file: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ui_state_file: DEFAULT_UI_STATE_FILE.to_owned(),
        }
    }
}

impl BridgeConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Load a configuration file, falling back to defaults if it is missing.
    ///
    /// A file that exists but does not parse is still an error.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let config = Self::load(path)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }
}
