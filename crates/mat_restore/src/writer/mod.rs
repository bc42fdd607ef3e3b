//! Material asset writer
//!
//! Serializes a [`TargetMaterial`] as a Unity `.mat` asset (YAML 1.1 with the
//! `!u!` tag). Property groups are emitted sorted by name so that restoring
//! the same dump twice produces identical files.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::foundation::math::{Color, Vec2};
use crate::restore::{TargetMaterial, TexEnv};

/// Class ID of `Material` in serialized files
const MATERIAL_CLASS_ID: u32 = 21;

/// Local file ID of the main object of a `.mat` file
const MATERIAL_FILE_ID: u64 = 2_100_000;

/// Asset writing errors
#[derive(Error, Debug)]
pub enum WriteError {
    /// Filesystem failure
    #[error("Failed to write {path:?}: {source}")]
    Io {
        /// Path being written
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// The target path has no file name
    #[error("Invalid output path {0:?}")]
    InvalidPath(PathBuf),
}

/// Material asset writer
pub struct MaterialWriter;

impl MaterialWriter {
    /// Render `material` as `.mat` YAML
    pub fn to_yaml(material: &TargetMaterial) -> String {
        let mut out = String::with_capacity(1024);
        // Writing into a String cannot fail.
        let _ = Self::write_yaml(&mut out, material);
        out
    }

    fn write_yaml(out: &mut String, material: &TargetMaterial) -> std::fmt::Result {
        writeln!(out, "%YAML 1.1")?;
        writeln!(out, "%TAG !u! tag:unity3d.com,2011:")?;
        writeln!(out, "--- !u!{MATERIAL_CLASS_ID} &{MATERIAL_FILE_ID}")?;
        writeln!(out, "Material:")?;
        writeln!(out, "  serializedVersion: 6")?;
        writeln!(out, "  m_ObjectHideFlags: 0")?;
        writeln!(out, "  m_CorrespondingSourceObject: {{fileID: 0}}")?;
        writeln!(out, "  m_PrefabInstance: {{fileID: 0}}")?;
        writeln!(out, "  m_PrefabAsset: {{fileID: 0}}")?;
        writeln!(out, "  m_Name: {}", yaml_scalar(material.name()))?;
        writeln!(out, "  m_Shader: {}", material.shader().reference)?;
        writeln!(out, "  m_ShaderKeywords: ")?;
        writeln!(out, "  m_LightmapFlags: 4")?;
        writeln!(out, "  m_EnableInstancingVariants: 0")?;
        writeln!(out, "  m_DoubleSidedGI: 0")?;
        writeln!(out, "  m_CustomRenderQueue: -1")?;
        writeln!(out, "  stringTagMap: {{}}")?;
        writeln!(out, "  disabledShaderPasses: []")?;
        writeln!(out, "  m_SavedProperties:")?;
        writeln!(out, "    serializedVersion: 3")?;

        write_group(out, "m_TexEnvs", material.tex_envs(), write_tex_env)?;
        write_group(out, "m_Floats", material.floats(), |out, value| {
            writeln!(out, " {}", format_float(*value))
        })?;
        write_group(out, "m_Colors", material.colors(), |out, color| {
            writeln!(out, " {}", format_color(color))
        })?;

        writeln!(out, "  m_BuildTextureStacks: []")
    }

    /// Write `material` to `path`
    ///
    /// Missing folders are created. The asset is written to a temporary file
    /// next to `path` and renamed into place, so an existing asset is never
    /// left half written.
    pub fn write(material: &TargetMaterial, path: impl AsRef<Path>) -> Result<(), WriteError> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .ok_or_else(|| WriteError::InvalidPath(path.to_path_buf()))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| WriteError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let mut temp_name = std::ffi::OsString::from(".");
        temp_name.push(file_name);
        temp_name.push(".tmp");
        let temp_path = path.with_file_name(temp_name);

        let yaml = Self::to_yaml(material);
        if let Err(source) = fs::write(&temp_path, yaml) {
            let _ = fs::remove_file(&temp_path);
            return Err(WriteError::Io { path: temp_path, source });
        }

        fs::rename(&temp_path, path).map_err(|source| {
            let _ = fs::remove_file(&temp_path);
            WriteError::Io {
                path: path.to_path_buf(),
                source,
            }
        })?;

        log::debug!("Wrote material asset {:?}", path);
        Ok(())
    }
}

/// Write a `name: [ - key: value ]` group, or `name: []` when empty
fn write_group<'a, T: 'a>(
    out: &mut String,
    name: &str,
    entries: impl IntoIterator<Item = (&'a String, &'a T)>,
    mut write_value: impl FnMut(&mut String, &T) -> std::fmt::Result,
) -> std::fmt::Result {
    let mut entries = entries.into_iter().peekable();
    if entries.peek().is_none() {
        return writeln!(out, "    {name}: []");
    }

    writeln!(out, "    {name}:")?;
    for (key, value) in entries {
        write!(out, "    - {}:", yaml_scalar(key))?;
        write_value(out, value)?;
    }
    Ok(())
}

fn write_tex_env(out: &mut String, env: &TexEnv) -> std::fmt::Result {
    writeln!(out)?;
    match &env.texture {
        Some(texture) => writeln!(out, "        m_Texture: {}", texture.reference)?,
        None => writeln!(out, "        m_Texture: {{fileID: 0}}")?,
    }
    writeln!(out, "        m_Scale: {}", format_vec2(&env.scale))?;
    writeln!(out, "        m_Offset: {}", format_vec2(&env.offset))
}

/// Shortest decimal form, with YAML spellings for non-finite values
pub fn format_float(value: f32) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value == f32::INFINITY {
        "Infinity".to_string()
    } else if value == f32::NEG_INFINITY {
        "-Infinity".to_string()
    } else {
        value.to_string()
    }
}

fn format_vec2(v: &Vec2) -> String {
    format!("{{x: {}, y: {}}}", format_float(v.x), format_float(v.y))
}

fn format_color(c: &Color) -> String {
    format!(
        "{{r: {}, g: {}, b: {}, a: {}}}",
        format_float(c.r),
        format_float(c.g),
        format_float(c.b),
        format_float(c.a)
    )
}

/// Plain scalar when safe, single-quoted otherwise
fn yaml_scalar(text: &str) -> String {
    let needs_quotes = text.is_empty()
        || text.starts_with(|c: char| c.is_whitespace() || "-?:,[]{}#&*!|>'\"%@`".contains(c))
        || text.ends_with(char::is_whitespace)
        || text.ends_with(':')
        || text.contains(": ")
        || text.contains(" #")
        || text.contains(|c: char| c.is_control());

    if needs_quotes {
        format!("'{}'", text.replace('\'', "''"))
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{AssetHost, AssetReference, MemoryHost};
    use crate::restore::PropertyAssignment;

    fn material() -> TargetMaterial {
        let mut host = MemoryHost::new();
        host.insert_shader("Standard", AssetReference::builtin(46), ["_Color", "_MainTex"]);
        let texture = host.insert_texture("Assets/Body.png", "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");
        let shader = host.find_shader_by_name("Standard").unwrap();

        let mut material = TargetMaterial::new("Body", shader);
        material.apply(PropertyAssignment::Float { name: "_Metallic".into(), value: 0.5 });
        material.apply(PropertyAssignment::Float { name: "_Glossiness".into(), value: 1.0 });
        material.apply(PropertyAssignment::Color {
            name: "_Color".into(),
            value: Color::new(1.0, 0.5, 0.25, 1.0),
        });
        material.apply(PropertyAssignment::Texture { name: "_MainTex".into(), texture });
        material.apply(PropertyAssignment::TextureTiling {
            name: "_BumpMap".into(),
            scale: Vec2::new(2.0, 2.0),
            offset: Vec2::new(0.0, 0.5),
        });
        material
    }

    #[test]
    fn test_yaml_layout() {
        let yaml = MaterialWriter::to_yaml(&material());

        assert!(yaml.starts_with("%YAML 1.1\n%TAG !u! tag:unity3d.com,2011:\n--- !u!21 &2100000\nMaterial:\n"));
        assert!(yaml.contains("  m_Name: Body\n"));
        assert!(yaml.contains("  m_Shader: {fileID: 46, guid: 0000000000000000f000000000000000, type: 0}\n"));

        let expected = "\
    m_TexEnvs:
    - _BumpMap:
        m_Texture: {fileID: 0}
        m_Scale: {x: 2, y: 2}
        m_Offset: {x: 0, y: 0.5}
    - _MainTex:
        m_Texture: {fileID: 2800000, guid: aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa, type: 3}
        m_Scale: {x: 1, y: 1}
        m_Offset: {x: 0, y: 0}
    m_Floats:
    - _Glossiness: 1
    - _Metallic: 0.5
    m_Colors:
    - _Color: {r: 1, g: 0.5, b: 0.25, a: 1}
";
        assert!(yaml.contains(expected), "unexpected groups:\n{yaml}");
    }

    #[test]
    fn test_empty_groups() {
        let handle = crate::host::ShaderCatalog::builtin().find("Unlit/Color").unwrap().to_handle();
        let yaml = MaterialWriter::to_yaml(&TargetMaterial::new("Empty", handle));
        assert!(yaml.contains("    m_TexEnvs: []\n    m_Floats: []\n    m_Colors: []\n"));
    }

    #[test]
    fn test_format_float() {
        assert_eq!(format_float(0.1), "0.1");
        assert_eq!(format_float(3.0), "3");
        assert_eq!(format_float(-2.5), "-2.5");
        assert_eq!(format_float(f32::NAN), "NaN");
        assert_eq!(format_float(f32::INFINITY), "Infinity");
        assert_eq!(format_float(f32::NEG_INFINITY), "-Infinity");
    }

    #[test]
    fn test_yaml_scalar_quoting() {
        assert_eq!(yaml_scalar("Body"), "Body");
        assert_eq!(yaml_scalar("Hair Front"), "Hair Front");
        assert_eq!(yaml_scalar(""), "''");
        assert_eq!(yaml_scalar("-Outline"), "'-Outline'");
        assert_eq!(yaml_scalar("it's: odd"), "'it''s: odd'");
        assert_eq!(yaml_scalar("Mat:"), "'Mat:'");
        assert_eq!(yaml_scalar("Skin:Dark"), "Skin:Dark");
    }

    #[test]
    fn test_write_creates_folder_and_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Assets/Restored/Body.mat");

        MaterialWriter::write(&material(), &path).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written, MaterialWriter::to_yaml(&material()));

        let leftovers: Vec<_> = fs::read_dir(path.parent().unwrap())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, vec![std::ffi::OsString::from("Body.mat")]);
    }

    #[test]
    fn test_write_overwrites_existing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Body.mat");
        fs::write(&path, "old").unwrap();

        MaterialWriter::write(&material(), &path).unwrap();
        assert!(fs::read_to_string(&path).unwrap().starts_with("%YAML 1.1"));
    }
}
