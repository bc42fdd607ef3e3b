//! Property restoration
//!
//! Maps the property groups of a [`MaterialDescription`] onto the slots a
//! shader declares. The mapping is best effort: anything the shader does not
//! declare, and any texture the host cannot find, is skipped and recorded in
//! the [`RestoreReport`] instead of failing the restore.

pub mod pipeline;
pub mod request;
pub mod shader_select;

#[cfg(test)]
mod test_round_trip;

pub use pipeline::{MaterialRestorer, RestoreError, RestoreOutcome};
pub use request::{RequestError, RestoreRequest};
pub use shader_select::{select_shader, ShaderMode, ShaderSelection};

use std::collections::BTreeMap;
use std::fmt;

use crate::description::MaterialDescription;
use crate::foundation::math::{unit_scale, Color, Vec2};
use crate::host::{AssetHost, ShaderHandle, ShaderPropertySet, TextureHandle};

/// A single property write on a material
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyAssignment {
    /// Set a float property
    Float {
        /// Property name
        name: String,
        /// Value, unchanged from the source
        value: f32,
    },
    /// Set a color property
    Color {
        /// Property name
        name: String,
        /// Value, unchanged from the source
        value: Color,
    },
    /// Set tiling and offset of a texture slot
    TextureTiling {
        /// Property name
        name: String,
        /// Tiling
        scale: Vec2,
        /// Offset
        offset: Vec2,
    },
    /// Bind a texture asset to a texture slot
    Texture {
        /// Property name
        name: String,
        /// Resolved texture
        texture: TextureHandle,
    },
}

impl PropertyAssignment {
    /// Name of the property being written
    pub fn name(&self) -> &str {
        match self {
            Self::Float { name, .. }
            | Self::Color { name, .. }
            | Self::TextureTiling { name, .. }
            | Self::Texture { name, .. } => name,
        }
    }
}

/// Texture slot state of a material
#[derive(Debug, Clone, PartialEq)]
pub struct TexEnv {
    /// Bound texture, if any
    pub texture: Option<TextureHandle>,
    /// Tiling
    pub scale: Vec2,
    /// Offset
    pub offset: Vec2,
}

impl Default for TexEnv {
    fn default() -> Self {
        Self {
            texture: None,
            scale: unit_scale(),
            offset: Vec2::zeros(),
        }
    }
}

/// In-memory material produced by a restore
#[derive(Debug, Clone, PartialEq)]
pub struct TargetMaterial {
    name: String,
    shader: ShaderHandle,
    floats: BTreeMap<String, f32>,
    colors: BTreeMap<String, Color>,
    tex_envs: BTreeMap<String, TexEnv>,
}

impl TargetMaterial {
    /// Create an empty material using `shader`
    pub fn new(name: impl Into<String>, shader: ShaderHandle) -> Self {
        Self {
            name: name.into(),
            shader,
            floats: BTreeMap::new(),
            colors: BTreeMap::new(),
            tex_envs: BTreeMap::new(),
        }
    }

    /// Apply one assignment
    ///
    /// Tiling and texture binding write independent parts of the same slot.
    pub fn apply(&mut self, assignment: PropertyAssignment) {
        match assignment {
            PropertyAssignment::Float { name, value } => {
                self.floats.insert(name, value);
            }
            PropertyAssignment::Color { name, value } => {
                self.colors.insert(name, value);
            }
            PropertyAssignment::TextureTiling { name, scale, offset } => {
                let env = self.tex_envs.entry(name).or_default();
                env.scale = scale;
                env.offset = offset;
            }
            PropertyAssignment::Texture { name, texture } => {
                self.tex_envs.entry(name).or_default().texture = Some(texture);
            }
        }
    }

    /// Material name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Shader the material uses
    pub fn shader(&self) -> &ShaderHandle {
        &self.shader
    }

    /// Float properties
    pub fn floats(&self) -> &BTreeMap<String, f32> {
        &self.floats
    }

    /// Color properties
    pub fn colors(&self) -> &BTreeMap<String, Color> {
        &self.colors
    }

    /// Texture slots
    pub fn tex_envs(&self) -> &BTreeMap<String, TexEnv> {
        &self.tex_envs
    }

    /// Number of properties with a value
    pub fn property_count(&self) -> usize {
        self.floats.len() + self.colors.len() + self.tex_envs.len()
    }
}

/// Property group an entry came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyGroup {
    /// `m_Floats`
    Floats,
    /// `m_Colors`
    Colors,
    /// `m_TexEnvs`
    TexEnvs,
}

impl fmt::Display for PropertyGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = match self {
            Self::Floats => "m_Floats",
            Self::Colors => "m_Colors",
            Self::TexEnvs => "m_TexEnvs",
        };
        f.write_str(key)
    }
}

/// Why an entry was not applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The shader does not declare the property
    NotDeclared,
    /// The referenced texture could not be found
    TextureNotFound(String),
}

/// An entry that produced no assignment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedProperty {
    /// Source group
    pub group: PropertyGroup,
    /// Property name
    pub name: String,
    /// Reason
    pub reason: SkipReason,
}

impl fmt::Display for SkippedProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            SkipReason::NotDeclared => write!(f, "{}.{}: not declared by shader", self.group, self.name),
            SkipReason::TextureNotFound(texture) => {
                write!(f, "{}.{}: texture '{}' not found", self.group, self.name, texture)
            }
        }
    }
}

/// Outcome details of a restore
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreReport {
    /// Number of assignments applied
    pub applied: usize,
    /// Entries that were skipped
    pub skipped: Vec<SkippedProperty>,
}

impl RestoreReport {
    /// Skipped entries whose property the shader does not declare
    pub fn undeclared(&self) -> impl Iterator<Item = &SkippedProperty> {
        self.skipped.iter().filter(|skip| skip.reason == SkipReason::NotDeclared)
    }

    fn skip(&mut self, group: PropertyGroup, name: &str, reason: SkipReason) {
        self.skipped.push(SkippedProperty {
            group,
            name: name.to_string(),
            reason,
        });
    }
}

/// Maps material descriptions onto shader properties
pub struct PropertyRestorer<'h> {
    host: &'h dyn AssetHost,
}

impl<'h> PropertyRestorer<'h> {
    /// Create a restorer resolving textures through `host`
    pub fn new(host: &'h dyn AssetHost) -> Self {
        Self { host }
    }

    /// Compute the assignments for `description` against `properties`
    ///
    /// Floats, colors and texture slots are handled independently. Tiling of
    /// a texture slot is assigned whether or not its texture resolves.
    pub fn plan(
        &self,
        description: &MaterialDescription,
        properties: &ShaderPropertySet,
    ) -> (Vec<PropertyAssignment>, RestoreReport) {
        let mut assignments = Vec::new();
        let mut report = RestoreReport::default();
        let saved = &description.properties;

        for (name, value) in &saved.floats {
            if properties.contains(name) {
                assignments.push(PropertyAssignment::Float { name: name.clone(), value: *value });
            } else {
                report.skip(PropertyGroup::Floats, name, SkipReason::NotDeclared);
            }
        }

        for (name, value) in &saved.colors {
            if properties.contains(name) {
                assignments.push(PropertyAssignment::Color { name: name.clone(), value: *value });
            } else {
                report.skip(PropertyGroup::Colors, name, SkipReason::NotDeclared);
            }
        }

        for (name, binding) in &saved.tex_envs {
            if !properties.contains(name) {
                report.skip(PropertyGroup::TexEnvs, name, SkipReason::NotDeclared);
                continue;
            }

            if let (Some(scale), Some(offset)) = (binding.scale, binding.offset) {
                assignments.push(PropertyAssignment::TextureTiling {
                    name: name.clone(),
                    scale,
                    offset,
                });
            }

            if let Some(texture_name) = binding.texture_name() {
                match self.host.find_texture_by_name(texture_name) {
                    Some(texture) => assignments.push(PropertyAssignment::Texture {
                        name: name.clone(),
                        texture,
                    }),
                    None => report.skip(
                        PropertyGroup::TexEnvs,
                        name,
                        SkipReason::TextureNotFound(texture_name.to_string()),
                    ),
                }
            }
        }

        report.applied = assignments.len();
        (assignments, report)
    }

    /// Build a material named `name` using `shader` from `description`
    pub fn restore(
        &self,
        description: &MaterialDescription,
        name: &str,
        shader: &ShaderHandle,
    ) -> (TargetMaterial, RestoreReport) {
        let (assignments, report) = self.plan(description, &shader.properties);

        let mut material = TargetMaterial::new(name, shader.clone());
        for assignment in assignments {
            material.apply(assignment);
        }

        (material, report)
    }
}
