//! Serde mirror of the JSON dump layout

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::foundation::math::{Color, Vec2};

/// Floats as JSON numbers, with `NaN`/`Infinity`/`-Infinity` strings for
/// values JSON numbers cannot hold. Numeric strings are read back.
mod lenient_float {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::writer::format_float;

    pub(super) fn serialize<S: Serializer>(value: &f32, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_f32(*value)
        } else {
            serializer.serialize_str(&format_float(*value))
        }
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f32, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Number(f32),
            Text(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Number(value) => Ok(value),
            Repr::Text(text) => text.trim().parse().map_err(D::Error::custom),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub(super) struct WireFloat(#[serde(with = "lenient_float")] pub(super) f32);

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub(super) struct WireColor {
    #[serde(with = "lenient_float")]
    r: f32,
    #[serde(with = "lenient_float")]
    g: f32,
    #[serde(with = "lenient_float")]
    b: f32,
    #[serde(with = "lenient_float")]
    a: f32,
}

impl WireColor {
    pub(super) fn deserialize_from(value: &Value) -> Option<Self> {
        Self::deserialize(value).ok()
    }
}

impl From<WireColor> for Color {
    fn from(c: WireColor) -> Self {
        Self::new(c.r, c.g, c.b, c.a)
    }
}

impl From<Color> for WireColor {
    fn from(c: Color) -> Self {
        Self { r: c.r, g: c.g, b: c.b, a: c.a }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub(super) struct WireVec2 {
    #[serde(rename = "X", alias = "x", with = "lenient_float")]
    x: f32,
    #[serde(rename = "Y", alias = "y", with = "lenient_float")]
    y: f32,
}

impl WireVec2 {
    pub(super) fn deserialize_from(value: &Value) -> Option<Self> {
        Self::deserialize(value).ok()
    }
}

impl From<WireVec2> for Vec2 {
    fn from(v: WireVec2) -> Self {
        Self::new(v.x, v.y)
    }
}

impl From<Vec2> for WireVec2 {
    fn from(v: Vec2) -> Self {
        Self { x: v.x, y: v.y }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct WireTextureRef {
    #[serde(rename = "Name")]
    pub(super) name: String,
}

#[derive(Debug, Serialize)]
pub(super) struct WireTexEnv {
    #[serde(rename = "m_Scale", skip_serializing_if = "Option::is_none")]
    pub(super) scale: Option<WireVec2>,
    #[serde(rename = "m_Offset", skip_serializing_if = "Option::is_none")]
    pub(super) offset: Option<WireVec2>,
    #[serde(rename = "m_Texture", skip_serializing_if = "Option::is_none")]
    pub(super) texture: Option<WireTextureRef>,
}

#[derive(Debug, Serialize)]
pub(super) struct WireSavedProperties {
    #[serde(rename = "m_Floats")]
    pub(super) floats: BTreeMap<String, WireFloat>,
    #[serde(rename = "m_Colors")]
    pub(super) colors: BTreeMap<String, WireColor>,
    #[serde(rename = "m_TexEnvs")]
    pub(super) tex_envs: BTreeMap<String, WireTexEnv>,
}

#[derive(Debug, Serialize)]
pub(super) struct WireDescription {
    #[serde(rename = "m_Name")]
    pub(super) name: String,
    #[serde(rename = "m_SavedProperties")]
    pub(super) saved_properties: WireSavedProperties,
}
