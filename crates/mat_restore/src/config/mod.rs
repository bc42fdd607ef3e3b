//! Configuration system

use std::path::{Path, PathBuf};

pub use serde::{Serialize, Deserialize};

use crate::restore::shader_select::{STANDARD_SHADERS, TOON_SHADERS};

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(ConfigError::Io)?;

        // Try different formats
        match extension_of(path) {
            Some("toml") => toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
            Some("ron") => ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = match extension_of(path) {
            Some("toml") => toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?,
            Some("ron") => ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?,
            _ => return Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

fn extension_of(path: &Path) -> Option<&str> {
    path.extension().and_then(|ext| ext.to_str())
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// What to do with properties the target shader does not declare
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnmatchedPolicy {
    /// Drop them without a trace (best-effort restore)
    #[default]
    Ignore,
    /// Drop them and log a warning per property
    Warn,
    /// Fail the restore, nothing is written
    Reject,
}

/// Settings for a restore run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RestoreConfig {
    /// Folder the `.mat` files are written to
    pub output_folder: PathBuf,
    /// Directories scanned for shaders and textures, relative to the project root
    pub search_paths: Vec<PathBuf>,
    /// Handling of properties the shader does not declare
    pub unmatched: UnmatchedPolicy,
    /// Standard/PBR shader candidates, queried in order
    pub standard_shaders: Vec<String>,
    /// Toon/Anime shader candidates, queried in order
    pub toon_shaders: Vec<String>,
    /// Additional shader catalog file (TOML or RON)
    pub catalog: Option<PathBuf>,
}

impl Default for RestoreConfig {
    fn default() -> Self {
        Self {
            output_folder: PathBuf::from("Assets/RestoredMaterials"),
            search_paths: vec![PathBuf::from("Assets"), PathBuf::from("Packages")],
            unmatched: UnmatchedPolicy::Ignore,
            standard_shaders: STANDARD_SHADERS.iter().map(ToString::to_string).collect(),
            toon_shaders: TOON_SHADERS.iter().map(ToString::to_string).collect(),
            catalog: None,
        }
    }
}

impl Config for RestoreConfig {}
