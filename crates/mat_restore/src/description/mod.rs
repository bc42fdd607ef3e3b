//! Material description parsing
//!
//! Reads the JSON dump of a serialized material into a [`MaterialDescription`].
//! Only the top-level document has to be well formed: the property groups
//! below `m_SavedProperties` are read leniently and anything malformed is
//! treated as absent.

mod wire;

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::foundation::math::{Color, Vec2};
use crate::restore::TargetMaterial;
use wire::{WireColor, WireDescription, WireFloat, WireSavedProperties, WireTexEnv, WireTextureRef, WireVec2};

/// Texture slot as found in the dump
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextureBinding {
    /// Tiling (`m_Scale`)
    pub scale: Option<Vec2>,
    /// Offset (`m_Offset`)
    pub offset: Option<Vec2>,
    /// Name of the referenced texture asset (`m_Texture.Name`)
    pub texture_name: Option<String>,
}

impl TextureBinding {
    /// Texture name, if present and non-empty
    pub fn texture_name(&self) -> Option<&str> {
        self.texture_name.as_deref().filter(|name| !name.is_empty())
    }
}

/// The three property groups of a serialized material
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SavedProperties {
    /// Float properties (`m_Floats`)
    pub floats: BTreeMap<String, f32>,
    /// Color properties (`m_Colors`)
    pub colors: BTreeMap<String, Color>,
    /// Texture properties (`m_TexEnvs`)
    pub tex_envs: BTreeMap<String, TextureBinding>,
}

impl SavedProperties {
    /// Total number of entries across all groups
    pub fn len(&self) -> usize {
        self.floats.len() + self.colors.len() + self.tex_envs.len()
    }

    /// True when no group has entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Parsed material dump
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterialDescription {
    /// Material name (`m_Name`), `None` when absent or empty
    pub name: Option<String>,
    /// Saved property groups
    pub properties: SavedProperties,
}

/// Material description errors
#[derive(Error, Debug)]
pub enum DescriptionError {
    /// The document is not valid JSON
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The document is valid JSON but not an object
    #[error("Expected a JSON object at the top level, found {0}")]
    NotAnObject(&'static str),
}

/// Parse a material dump
///
/// Fails only when the document itself cannot be read as a JSON object.
pub fn parse_description(json: &str) -> Result<MaterialDescription, DescriptionError> {
    let document: Value = serde_json::from_str(json)?;
    let root = match &document {
        Value::Object(map) => map,
        other => return Err(DescriptionError::NotAnObject(kind_of(other))),
    };

    let name = root
        .get("m_Name")
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())
        .map(str::to_string);

    let properties = root
        .get("m_SavedProperties")
        .and_then(Value::as_object)
        .map(parse_saved_properties)
        .unwrap_or_default();

    Ok(MaterialDescription { name, properties })
}

fn parse_saved_properties(saved: &Map<String, Value>) -> SavedProperties {
    SavedProperties {
        floats: parse_group(saved, "m_Floats", parse_float),
        colors: parse_group(saved, "m_Colors", parse_color),
        tex_envs: parse_group(saved, "m_TexEnvs", parse_tex_env),
    }
}

/// Read one property group, skipping entries `parse_entry` rejects
fn parse_group<T>(
    saved: &Map<String, Value>,
    key: &str,
    parse_entry: impl Fn(&Value) -> Option<T>,
) -> BTreeMap<String, T> {
    let Some(group) = saved.get(key).and_then(Value::as_object) else {
        log::debug!("Property group {} missing or not an object", key);
        return BTreeMap::new();
    };

    group
        .iter()
        .filter_map(|(name, value)| match parse_entry(value) {
            Some(entry) => Some((name.clone(), entry)),
            None => {
                log::debug!("Skipping malformed {} entry '{}'", key, name);
                None
            }
        })
        .collect()
}

#[allow(clippy::cast_possible_truncation)]
fn parse_float(value: &Value) -> Option<f32> {
    match value {
        Value::Number(number) => number.as_f64().map(|v| v as f32),
        Value::String(text) => text.trim().parse::<f32>().ok(),
        _ => None,
    }
}

fn parse_color(value: &Value) -> Option<Color> {
    WireColor::deserialize_from(value).map(Color::from)
}

fn parse_tex_env(value: &Value) -> Option<TextureBinding> {
    let entry = value.as_object()?;
    let scale = entry.get("m_Scale").and_then(WireVec2::deserialize_from).map(Vec2::from);
    let offset = entry.get("m_Offset").and_then(WireVec2::deserialize_from).map(Vec2::from);
    let texture_name = entry
        .get("m_Texture")
        .and_then(|texture| texture.get("Name"))
        .and_then(Value::as_str)
        .map(str::to_string);

    Some(TextureBinding { scale, offset, texture_name })
}

const fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Dump a restored material back into the description format
///
/// Texture slots keep their tiling and offset; the texture name is the
/// bound asset's name, if any.
pub fn dump_material(material: &TargetMaterial) -> MaterialDescription {
    let tex_envs = material
        .tex_envs()
        .iter()
        .map(|(name, env)| {
            let binding = TextureBinding {
                scale: Some(env.scale),
                offset: Some(env.offset),
                texture_name: env.texture.as_ref().map(|texture| texture.name.clone()),
            };
            (name.clone(), binding)
        })
        .collect();

    MaterialDescription {
        name: Some(material.name().to_string()),
        properties: SavedProperties {
            floats: material.floats().clone(),
            colors: material.colors().clone(),
            tex_envs,
        },
    }
}

/// Serialize a description to pretty-printed JSON
pub fn description_to_json(description: &MaterialDescription) -> Result<String, DescriptionError> {
    let properties = &description.properties;
    let wire = WireDescription {
        name: description.name.clone().unwrap_or_default(),
        saved_properties: WireSavedProperties {
            floats: properties.floats.iter().map(|(k, v)| (k.clone(), WireFloat(*v))).collect(),
            colors: properties.colors.iter().map(|(k, v)| (k.clone(), WireColor::from(*v))).collect(),
            tex_envs: properties
                .tex_envs
                .iter()
                .map(|(name, binding)| {
                    let env = WireTexEnv {
                        scale: binding.scale.map(WireVec2::from),
                        offset: binding.offset.map(WireVec2::from),
                        texture: binding
                            .texture_name()
                            .map(|name| WireTextureRef { name: name.to_string() }),
                    };
                    (name.clone(), env)
                })
                .collect(),
        },
    };

    Ok(serde_json::to_string_pretty(&wire)?)
}
