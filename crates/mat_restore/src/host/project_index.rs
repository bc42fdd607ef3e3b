//! On-disk project asset index
//!
//! Scans a Unity project for `.shader` sources and texture files. Assets are
//! only usable when their `.meta` file carries a GUID, since materials
//! reference everything by GUID.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::shader_catalog::ShaderCatalog;
use super::shaderlab::ShaderLabParser;
use super::{match_texture, AssetHost, AssetReference, ShaderHandle, TextureHandle};
use crate::config::{Config, ConfigError, RestoreConfig};

/// Asset index errors
#[derive(Error, Debug)]
pub enum HostError {
    /// A directory could not be listed
    #[error("Failed to read directory {path:?}: {source}")]
    Io {
        /// Directory being listed
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// None of the search paths exist
    #[error("No search path exists: {0:?}")]
    NoSearchPath(Vec<PathBuf>),

    /// The extra shader catalog could not be loaded
    #[error("Failed to load shader catalog: {0}")]
    Catalog(#[from] ConfigError),
}

/// Index of the shaders and textures of a project
#[derive(Debug, Clone, Default)]
pub struct ProjectAssetIndex {
    /// Shaders parsed from `.shader` files, by name
    shaders: BTreeMap<String, ShaderHandle>,
    /// Shaders known without a source file
    catalog: ShaderCatalog,
    /// Texture assets, by path
    textures: BTreeMap<PathBuf, TextureHandle>,
}

impl ProjectAssetIndex {
    /// Index holding only catalog shaders and no textures
    pub fn from_catalog(catalog: ShaderCatalog) -> Self {
        Self {
            catalog,
            ..Default::default()
        }
    }

    /// Open the project at `project_root` as described by `config`
    ///
    /// The built-in catalog is extended with `config.catalog` when set, and
    /// every existing search path below the root is scanned.
    pub fn open(project_root: impl AsRef<Path>, config: &RestoreConfig) -> Result<Self, HostError> {
        let project_root = project_root.as_ref();
        let catalog = Self::catalog_for(config)?;

        let roots: Vec<PathBuf> = config
            .search_paths
            .iter()
            .map(|path| project_root.join(path))
            .collect();

        Self::scan(&roots, catalog)
    }

    /// Built-in catalog extended with the catalog file named by `config`
    pub fn catalog_for(config: &RestoreConfig) -> Result<ShaderCatalog, HostError> {
        let mut catalog = ShaderCatalog::builtin();
        if let Some(extra) = &config.catalog {
            catalog.merge(ShaderCatalog::load_from_file(extra)?);
        }
        Ok(catalog)
    }

    /// Recursively index the given root directories
    ///
    /// Missing roots are skipped; it is an error only if none exist.
    pub fn scan(roots: &[PathBuf], catalog: ShaderCatalog) -> Result<Self, HostError> {
        let mut index = Self::from_catalog(catalog);

        let existing: Vec<&PathBuf> = roots.iter().filter(|root| root.is_dir()).collect();
        if existing.is_empty() {
            return Err(HostError::NoSearchPath(roots.to_vec()));
        }

        for root in existing {
            index.scan_directory(root)?;
        }

        log::info!(
            "Indexed {} shader(s) and {} texture(s) under {:?}",
            index.shaders.len(),
            index.textures.len(),
            roots
        );
        Ok(index)
    }

    fn scan_directory(&mut self, dir: &Path) -> Result<(), HostError> {
        let entries = fs::read_dir(dir).map_err(|source| HostError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        for entry in entries {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    log::warn!("Error reading entry in {:?}: {}", dir, e);
                    continue;
                }
            };

            let path = entry.path();
            if is_ignored(&path) {
                continue;
            }

            if path.is_dir() {
                self.scan_directory(&path)?;
            } else if has_extension(&path, "shader") {
                self.index_shader(&path);
            } else if is_texture_file(&path) {
                self.index_texture(&path);
            }
        }

        Ok(())
    }

    fn index_shader(&mut self, path: &Path) {
        let Some(guid) = read_meta_guid(path) else {
            log::debug!("Skipping shader without .meta GUID: {:?}", path);
            return;
        };

        let source = match fs::read_to_string(path) {
            Ok(source) => source,
            Err(e) => {
                log::warn!("Failed to read shader {:?}: {}", path, e);
                return;
            }
        };

        match ShaderLabParser::parse(&source) {
            Ok(parsed) => {
                let handle = ShaderHandle {
                    name: parsed.name.clone(),
                    reference: AssetReference::shader(guid),
                    properties: parsed.property_set(),
                };
                log::debug!("Indexed shader '{}' ({} properties)", handle.name, handle.properties.len());
                self.shaders.insert(parsed.name, handle);
            }
            Err(e) => log::warn!("Failed to parse shader {:?}: {}", path, e),
        }
    }

    fn index_texture(&mut self, path: &Path) {
        let Some(guid) = read_meta_guid(path) else {
            log::debug!("Skipping texture without .meta GUID: {:?}", path);
            return;
        };
        let Some(name) = path.file_stem().map(|stem| stem.to_string_lossy().into_owned()) else {
            return;
        };

        let handle = TextureHandle {
            name,
            path: path.to_path_buf(),
            reference: AssetReference::texture(guid),
        };
        self.textures.insert(path.to_path_buf(), handle);
    }

    /// Number of shaders parsed from project files
    pub fn shader_count(&self) -> usize {
        self.shaders.len()
    }

    /// Number of indexed textures
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }
}

impl AssetHost for ProjectAssetIndex {
    fn find_shader_by_name(&self, name: &str) -> Option<ShaderHandle> {
        self.shaders
            .get(name)
            .cloned()
            .or_else(|| self.catalog.find(name).map(|definition| definition.to_handle()))
    }

    fn find_texture_by_name(&self, name: &str) -> Option<TextureHandle> {
        match_texture(self.textures.values(), name).cloned()
    }

    fn shader_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .shaders
            .keys()
            .cloned()
            .chain(self.catalog.shaders.iter().map(|shader| shader.name.clone()))
            .collect();
        names.sort();
        names.dedup();
        names
    }
}

/// Hidden entries and `Name~` folders are never imported
fn is_ignored(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map_or(false, |name| name.starts_with('.') || name.ends_with('~'))
}

fn has_extension(path: &Path, wanted: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| ext.eq_ignore_ascii_case(wanted))
}

fn is_texture_file(path: &Path) -> bool {
    image::ImageFormat::from_path(path).is_ok() || has_extension(path, "psd")
}

/// GUID from the `.meta` file next to `asset`
pub fn read_meta_guid(asset: &Path) -> Option<String> {
    let mut meta = asset.as_os_str().to_owned();
    meta.push(".meta");

    let contents = fs::read_to_string(PathBuf::from(meta)).ok()?;
    contents
        .lines()
        .filter_map(|line| line.trim().strip_prefix("guid:"))
        .map(str::trim)
        .find(|guid| guid.len() == 32 && guid.chars().all(|c| c.is_ascii_hexdigit()))
        .map(str::to_string)
}
