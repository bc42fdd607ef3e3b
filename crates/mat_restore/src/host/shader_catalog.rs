//! Shader catalog
//!
//! Shaders that cannot be discovered by scanning project files, most
//! importantly the ones built into the editor. A catalog can be loaded from
//! TOML or RON and merged over the built-in defaults.

use serde::{Deserialize, Serialize};

use super::{AssetReference, ShaderHandle, ShaderPropertySet};
use crate::config::Config;

/// A shader known by name, reference and declared properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShaderDefinition {
    /// Shader name
    pub name: String,
    /// Declared property names
    #[serde(default)]
    pub properties: Vec<String>,
    /// Object reference written into materials using this shader
    pub reference: AssetReference,
}

impl ShaderDefinition {
    /// Build the handle the restorer works with
    pub fn to_handle(&self) -> ShaderHandle {
        ShaderHandle {
            name: self.name.clone(),
            reference: self.reference.clone(),
            properties: self.properties.iter().cloned().collect::<ShaderPropertySet>(),
        }
    }
}

/// Collection of shader definitions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShaderCatalog {
    /// Definitions, looked up by name
    pub shaders: Vec<ShaderDefinition>,
}

impl Config for ShaderCatalog {}

const STANDARD_COMMON: &[&str] = &[
    "_Color", "_MainTex", "_Cutoff", "_Glossiness", "_GlossMapScale",
    "_SmoothnessTextureChannel", "_SpecularHighlights", "_GlossyReflections",
    "_BumpScale", "_BumpMap", "_Parallax", "_ParallaxMap", "_OcclusionStrength",
    "_OcclusionMap", "_EmissionColor", "_EmissionMap", "_DetailMask",
    "_DetailAlbedoMap", "_DetailNormalMapScale", "_DetailNormalMap", "_UVSec",
    "_Mode", "_SrcBlend", "_DstBlend", "_ZWrite",
];

const URP_LIT: &[&str] = &[
    "_WorkflowMode", "_BaseMap", "_BaseColor", "_Cutoff", "_Smoothness",
    "_SmoothnessTextureChannel", "_Metallic", "_MetallicGlossMap", "_SpecColor",
    "_SpecGlossMap", "_SpecularHighlights", "_EnvironmentReflections", "_BumpScale",
    "_BumpMap", "_Parallax", "_ParallaxMap", "_OcclusionStrength", "_OcclusionMap",
    "_EmissionColor", "_EmissionMap", "_DetailMask", "_DetailAlbedoMapScale",
    "_DetailAlbedoMap", "_DetailNormalMapScale", "_DetailNormalMap", "_ClearCoatMask",
    "_ClearCoatSmoothness", "_Surface", "_Blend", "_Cull", "_AlphaClip", "_SrcBlend",
    "_DstBlend", "_ZWrite", "_ReceiveShadows", "_QueueOffset", "_MainTex", "_Color",
    "_GlossMapScale",
];

/// GUID of the Universal Render Pipeline `Lit` shader asset
const URP_LIT_GUID: &str = "933532a4fcc9baf4fa0491de14d08ed7";

impl ShaderCatalog {
    /// Shaders shipped with the editor and the URP Lit shader
    pub fn builtin() -> Self {
        let metallic = STANDARD_COMMON
            .iter()
            .chain(&["_Metallic", "_MetallicGlossMap"])
            .map(ToString::to_string)
            .collect();
        let specular = STANDARD_COMMON
            .iter()
            .chain(&["_SpecColor", "_SpecGlossMap"])
            .map(ToString::to_string)
            .collect();

        Self {
            shaders: vec![
                ShaderDefinition {
                    name: "Standard".to_string(),
                    properties: metallic,
                    reference: AssetReference::builtin(46),
                },
                ShaderDefinition {
                    name: "Standard (Specular setup)".to_string(),
                    properties: specular,
                    reference: AssetReference::builtin(45),
                },
                ShaderDefinition {
                    name: "Unlit/Texture".to_string(),
                    properties: vec!["_MainTex".to_string()],
                    reference: AssetReference::builtin(10752),
                },
                ShaderDefinition {
                    name: "Unlit/Color".to_string(),
                    properties: vec!["_Color".to_string()],
                    reference: AssetReference::builtin(10755),
                },
                ShaderDefinition {
                    name: "Universal Render Pipeline/Lit".to_string(),
                    properties: URP_LIT.iter().map(ToString::to_string).collect(),
                    reference: AssetReference::shader(URP_LIT_GUID),
                },
            ],
        }
    }

    /// Find a definition by exact name
    pub fn find(&self, name: &str) -> Option<&ShaderDefinition> {
        self.shaders.iter().find(|shader| shader.name == name)
    }

    /// Add definitions from `other`, replacing same-named entries
    pub fn merge(&mut self, other: Self) {
        for definition in other.shaders {
            match self.shaders.iter_mut().find(|shader| shader.name == definition.name) {
                Some(existing) => *existing = definition,
                None => self.shaders.push(definition),
            }
        }
    }

    /// Number of definitions
    pub fn len(&self) -> usize {
        self.shaders.len()
    }

    /// True when the catalog has no definitions
    pub fn is_empty(&self) -> bool {
        self.shaders.is_empty()
    }
}
