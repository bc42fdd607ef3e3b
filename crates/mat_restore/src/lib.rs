//! # Material Restore
//!
//! Rebuilds Unity material assets from JSON material dumps.
//!
//! ## Features
//!
//! - **Shader-aware mapping**: Only properties the target shader declares are
//!   restored, everything else is reported and skipped
//! - **Texture lookup**: Texture references are rebound by asset name
//! - **Project indexing**: Shaders and textures are discovered from a project
//!   folder, with a catalog for shaders built into the editor
//! - **Asset output**: Materials are written as `.mat` YAML assets
//!
//! ## Quick Start
//!
//! ```rust
//! use mat_restore::prelude::*;
//!
//! let mut host = MemoryHost::new();
//! host.insert_shader("Standard", AssetReference::builtin(46), ["_Color", "_Glossiness"]);
//!
//! let restorer = MaterialRestorer::new(&host, RestoreConfig::default());
//! let request = RestoreRequest::new("Body.json", ShaderSelection::Mode(ShaderMode::Standard), "Out");
//!
//! let outcome = restorer
//!     .restore_str(r#"{ "m_SavedProperties": { "m_Floats": { "_Glossiness": 0.5, "_Outline": 1 } } }"#, &request)
//!     .unwrap();
//! assert_eq!(outcome.material.name(), "Body");
//! assert_eq!(outcome.report.applied, 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::must_use_candidate)]

pub mod config;
pub mod description;
pub mod foundation;
pub mod host;
pub mod restore;
pub mod writer;

/// Common imports for library users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, RestoreConfig, UnmatchedPolicy},
        description::{dump_material, parse_description, MaterialDescription},
        foundation::math::{Color, Vec2},
        host::{AssetHost, AssetReference, MemoryHost, ProjectAssetIndex, ShaderCatalog, ShaderHandle, TextureHandle},
        restore::{
            MaterialRestorer, PropertyAssignment, PropertyRestorer, RestoreError, RestoreOutcome, RestoreReport,
            RestoreRequest, ShaderMode, ShaderSelection, TargetMaterial,
        },
        writer::MaterialWriter,
    };
}
