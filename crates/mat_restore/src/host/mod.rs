//! Asset host abstraction
//!
//! The restorer never talks to an engine directly. Shader and texture
//! lookups go through [`AssetHost`], so the property mapping runs the same
//! against an on-disk project index or an in-memory registry.

pub mod memory;
pub mod project_index;
pub mod shader_catalog;
pub mod shaderlab;

pub use memory::MemoryHost;
pub use project_index::{HostError, ProjectAssetIndex};
pub use shader_catalog::{ShaderCatalog, ShaderDefinition};
pub use shaderlab::{ShaderLabError, ShaderLabParser, ShaderSource};

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// GUID Unity uses for shaders shipped inside the editor
pub const BUILTIN_EXTRA_GUID: &str = "0000000000000000f000000000000000";

/// Local file ID of the main object in an imported texture
pub const TEXTURE_FILE_ID: i64 = 2_800_000;

/// Local file ID of the main object in an imported shader
pub const SHADER_FILE_ID: i64 = 4_800_000;

/// Reference type of objects stored in imported assets
pub const ASSET_REFERENCE_TYPE: i32 = 3;

/// Reference to a serialized Unity object (`{fileID, guid, type}`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetReference {
    /// Local identifier inside the referenced file
    pub file_id: i64,
    /// GUID of the referenced asset
    pub guid: String,
    /// Reference type (0 = built-in, 3 = imported asset)
    #[serde(rename = "type")]
    pub kind: i32,
}

impl AssetReference {
    /// Reference to the main object of an imported texture
    pub fn texture(guid: impl Into<String>) -> Self {
        Self {
            file_id: TEXTURE_FILE_ID,
            guid: guid.into(),
            kind: ASSET_REFERENCE_TYPE,
        }
    }

    /// Reference to an imported `.shader` asset
    pub fn shader(guid: impl Into<String>) -> Self {
        Self {
            file_id: SHADER_FILE_ID,
            guid: guid.into(),
            kind: ASSET_REFERENCE_TYPE,
        }
    }

    /// Reference to a shader built into the editor
    pub fn builtin(file_id: i64) -> Self {
        Self {
            file_id,
            guid: BUILTIN_EXTRA_GUID.to_string(),
            kind: 0,
        }
    }
}

impl fmt::Display for AssetReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{fileID: {}, guid: {}, type: {}}}", self.file_id, self.guid, self.kind)
    }
}

/// Property names a shader declares
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShaderPropertySet(BTreeSet<String>);

impl ShaderPropertySet {
    /// Create an empty property set
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the shader declares a property with this exact name
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    /// Add a property name
    pub fn insert(&mut self, name: impl Into<String>) {
        self.0.insert(name.into());
    }

    /// Number of declared properties
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when the shader declares no properties
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for ShaderPropertySet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// A shader the host can assign to a material
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderHandle {
    /// Shader name as used by `Shader "..."`
    pub name: String,
    /// Object reference written into `m_Shader`
    pub reference: AssetReference,
    /// Declared properties
    pub properties: ShaderPropertySet,
}

/// A texture the host can bind to a texture slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureHandle {
    /// Asset name (file name without extension)
    pub name: String,
    /// Asset path inside the project
    pub path: PathBuf,
    /// Object reference written into `m_Texture`
    pub reference: AssetReference,
}

/// Capabilities the restorer needs from the asset environment
pub trait AssetHost {
    /// Look up a shader by its exact name
    fn find_shader_by_name(&self, name: &str) -> Option<ShaderHandle>;

    /// Look up a texture asset by name
    ///
    /// Implementations follow [`match_texture`]: a case-insensitive substring
    /// search narrows the candidates, then the first case-insensitive exact
    /// file-name match wins.
    fn find_texture_by_name(&self, name: &str) -> Option<TextureHandle>;

    /// Names of all shaders the host knows, sorted
    fn shader_names(&self) -> Vec<String>;
}

/// Resolve a texture name among candidate assets
///
/// Candidates are searched in iteration order, so callers should iterate in
/// a stable order (the hosts in this crate iterate by asset path).
pub fn match_texture<'a>(
    candidates: impl IntoIterator<Item = &'a TextureHandle>,
    name: &str,
) -> Option<&'a TextureHandle> {
    if name.is_empty() {
        return None;
    }

    let wanted = name.to_lowercase();
    candidates
        .into_iter()
        .filter(|texture| texture.name.to_lowercase().contains(&wanted))
        .find(|texture| texture.name.to_lowercase() == wanted)
}
