//! Target shader selection

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::RestoreError;
use crate::config::RestoreConfig;
use crate::host::{AssetHost, ShaderHandle};

/// Default Standard/PBR candidates, in priority order
pub const STANDARD_SHADERS: &[&str] = &[
    "Standard",
    "Universal Render Pipeline/Lit",
    "HDRP/Lit",
    "Standard (Specular setup)",
];

/// Default Toon/Anime candidates, in priority order
pub const TOON_SHADERS: &[&str] = &[
    "lilToon",
    "Universal Render Pipeline/Toon",
    "UnityChanToonShader/Toon_DoubleShadeWithFeather",
    "VRM/MToon",
    "Toon/Lit",
];

/// Shader family to restore into
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShaderMode {
    /// Physically based shaders
    #[default]
    Standard,
    /// Toon/anime shaders
    Toon,
}

impl ShaderMode {
    /// Candidate names for this mode from `config`
    pub fn candidates(self, config: &RestoreConfig) -> &[String] {
        match self {
            Self::Standard => &config.standard_shaders,
            Self::Toon => &config.toon_shaders,
        }
    }
}

impl fmt::Display for ShaderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard => f.write_str("standard"),
            Self::Toon => f.write_str("toon"),
        }
    }
}

impl FromStr for ShaderMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "standard" | "pbr" => Ok(Self::Standard),
            "toon" | "anime" => Ok(Self::Toon),
            other => Err(format!("Unknown shader mode '{other}'")),
        }
    }
}

/// How the target shader is chosen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShaderSelection {
    /// First available shader of a family
    Mode(ShaderMode),
    /// A specific shader by exact name
    Custom(String),
}

impl Default for ShaderSelection {
    fn default() -> Self {
        Self::Mode(ShaderMode::default())
    }
}

/// Resolve `selection` to a shader the host provides
///
/// Candidates are queried in order and the first one found wins.
pub fn select_shader(
    host: &dyn AssetHost,
    selection: &ShaderSelection,
    config: &RestoreConfig,
) -> Result<ShaderHandle, RestoreError> {
    let candidates: Vec<String> = match selection {
        ShaderSelection::Mode(mode) => mode.candidates(config).to_vec(),
        ShaderSelection::Custom(name) => vec![name.clone()],
    };

    for name in &candidates {
        if let Some(shader) = host.find_shader_by_name(name) {
            log::debug!("Selected shader '{}'", shader.name);
            return Ok(shader);
        }
        log::trace!("Shader '{}' not available", name);
    }

    Err(RestoreError::ShaderNotFound { candidates })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{AssetReference, MemoryHost};

    fn host_with(names: &[&str]) -> MemoryHost {
        let mut host = MemoryHost::new();
        for (index, name) in names.iter().enumerate() {
            host.insert_shader(name, AssetReference::builtin(index as i64), ["_Color"]);
        }
        host
    }

    #[test]
    fn test_first_available_candidate_wins() {
        let host = host_with(&["Standard (Specular setup)", "HDRP/Lit"]);
        let shader = select_shader(&host, &ShaderSelection::Mode(ShaderMode::Standard), &RestoreConfig::default())
            .unwrap();
        assert_eq!(shader.name, "HDRP/Lit");
    }

    #[test]
    fn test_toon_mode() {
        let host = host_with(&["Standard", "VRM/MToon"]);
        let shader =
            select_shader(&host, &ShaderSelection::Mode(ShaderMode::Toon), &RestoreConfig::default()).unwrap();
        assert_eq!(shader.name, "VRM/MToon");
    }

    #[test]
    fn test_custom_shader_is_exact() {
        let host = host_with(&["Custom/Skin"]);
        let config = RestoreConfig::default();

        let found = select_shader(&host, &ShaderSelection::Custom("Custom/Skin".into()), &config).unwrap();
        assert_eq!(found.name, "Custom/Skin");

        let missing = select_shader(&host, &ShaderSelection::Custom("custom/skin".into()), &config);
        assert!(matches!(
            missing,
            Err(RestoreError::ShaderNotFound { ref candidates }) if candidates == &["custom/skin".to_string()]
        ));
    }

    #[test]
    fn test_no_candidate_available() {
        let host = host_with(&["Standard"]);
        let result = select_shader(&host, &ShaderSelection::Mode(ShaderMode::Toon), &RestoreConfig::default());
        match result {
            Err(RestoreError::ShaderNotFound { candidates }) => assert_eq!(candidates.len(), TOON_SHADERS.len()),
            other => panic!("Expected ShaderNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_configured_candidates() {
        let host = host_with(&["Standard", "My/Toon"]);
        let config = RestoreConfig {
            toon_shaders: vec!["My/Toon".to_string()],
            ..Default::default()
        };
        let shader = select_shader(&host, &ShaderSelection::Mode(ShaderMode::Toon), &config).unwrap();
        assert_eq!(shader.name, "My/Toon");
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("Toon".parse::<ShaderMode>(), Ok(ShaderMode::Toon));
        assert_eq!("pbr".parse::<ShaderMode>(), Ok(ShaderMode::Standard));
        assert!("unlit".parse::<ShaderMode>().is_err());
    }
}
