//! In-memory asset host for tests and embedding

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::{match_texture, AssetHost, AssetReference, ShaderHandle, ShaderPropertySet, TextureHandle};

/// Asset host backed by plain maps
///
/// # Example
///
/// ```
/// use mat_restore::host::{AssetHost, AssetReference, MemoryHost};
///
/// let mut host = MemoryHost::new();
/// host.insert_shader("Standard", AssetReference::builtin(46), ["_Color", "_MainTex"]);
/// host.insert_texture("Assets/Textures/Body.png", "6f1c0a5e2b7d4c3e9a8b1d2c3e4f5a6b");
///
/// assert!(host.find_shader_by_name("Standard").is_some());
/// assert!(host.find_texture_by_name("body").is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryHost {
    shaders: BTreeMap<String, ShaderHandle>,
    textures: BTreeMap<PathBuf, TextureHandle>,
}

impl MemoryHost {
    /// Create an empty host
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a shader, replacing any shader with the same name
    pub fn insert_shader<I, S>(&mut self, name: &str, reference: AssetReference, properties: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let handle = ShaderHandle {
            name: name.to_string(),
            reference,
            properties: properties.into_iter().collect::<ShaderPropertySet>(),
        };
        self.shaders.insert(name.to_string(), handle);
    }

    /// Register a texture asset by path; its name is the file stem
    pub fn insert_texture(&mut self, path: impl AsRef<Path>, guid: &str) -> TextureHandle {
        let path = path.as_ref().to_path_buf();
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let handle = TextureHandle {
            name,
            path: path.clone(),
            reference: AssetReference::texture(guid),
        };
        self.textures.insert(path, handle.clone());
        handle
    }

    /// Number of registered textures
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }
}

impl AssetHost for MemoryHost {
    fn find_shader_by_name(&self, name: &str) -> Option<ShaderHandle> {
        self.shaders.get(name).cloned()
    }

    fn find_texture_by_name(&self, name: &str) -> Option<TextureHandle> {
        match_texture(self.textures.values(), name).cloned()
    }

    fn shader_names(&self) -> Vec<String> {
        self.shaders.keys().cloned().collect()
    }
}
