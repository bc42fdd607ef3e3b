use std::fs;

use approx::assert_relative_eq;

use super::*;
use crate::config::RestoreConfig;
use crate::description::{description_to_json, dump_material, parse_description};
use crate::host::{AssetReference, MemoryHost};

const TEXTURE_GUID: &str = "6f1c0a5e2b7d4c3e9a8b1d2c3e4f5a6b";

fn sample_host() -> MemoryHost {
    let mut host = MemoryHost::new();
    host.insert_shader(
        "Standard",
        AssetReference::builtin(46),
        ["_Color", "_EmissionColor", "_MainTex", "_BumpMap", "_Glossiness", "_Metallic", "_Cutoff"],
    );
    host.insert_shader(
        "lilToon",
        AssetReference::shader("df12117ecd77c31469c224178886498e"),
        ["_Color", "_MainTex", "_ShadowColor", "_OutlineWidth"],
    );
    host.insert_texture("Assets/Characters/Hair/Textures/hair_albedo.png", TEXTURE_GUID);
    host.insert_texture("Assets/Characters/Hair/Textures/hair_albedo_mask.png", "22222222222222222222222222222222");
    host
}

const HAIR_DUMP: &str = r#"{
    "m_Name": "Hair",
    "m_SavedProperties": {
        "m_Floats": {
            "_Glossiness": 0.35,
            "_Metallic": 0,
            "_Cutoff": 0.5,
            "_OutlineWidth": 0.08
        },
        "m_Colors": {
            "_Color": { "r": 0.9, "g": 0.8, "b": 0.7, "a": 1 },
            "_EmissionColor": { "r": 4.0, "g": 2.5, "b": 0, "a": 1 },
            "_ShadowColor": { "r": 0.5, "g": 0.5, "b": 0.6, "a": 1 }
        },
        "m_TexEnvs": {
            "_MainTex": {
                "m_Scale": { "X": 1, "Y": 1 },
                "m_Offset": { "X": 0, "Y": 0 },
                "m_Texture": { "Name": "HAIR_ALBEDO" }
            },
            "_BumpMap": {
                "m_Scale": { "X": 2, "Y": 2 },
                "m_Offset": { "X": 0.5, "Y": 0 },
                "m_Texture": { "Name": "" }
            },
            "_OutlineMask": {
                "m_Scale": { "X": 1, "Y": 1 },
                "m_Offset": { "X": 0, "Y": 0 }
            }
        }
    }
}"#;

fn standard() -> ShaderHandle {
    sample_host().find_shader_by_name("Standard").unwrap()
}

#[test]
fn test_restore_keeps_only_declared_properties() {
    let host = sample_host();
    let description = parse_description(HAIR_DUMP).unwrap();
    let (material, report) = PropertyRestorer::new(&host).restore(&description, "Hair", &standard());

    let floats: Vec<_> = material.floats().keys().map(String::as_str).collect();
    assert_eq!(floats, vec!["_Cutoff", "_Glossiness", "_Metallic"]);
    let colors: Vec<_> = material.colors().keys().map(String::as_str).collect();
    assert_eq!(colors, vec!["_Color", "_EmissionColor"]);
    let tex_envs: Vec<_> = material.tex_envs().keys().map(String::as_str).collect();
    assert_eq!(tex_envs, vec!["_BumpMap", "_MainTex"]);

    let undeclared: Vec<_> = report.undeclared().map(|s| s.name.as_str()).collect();
    assert_eq!(undeclared, vec!["_OutlineWidth", "_ShadowColor", "_OutlineMask"]);
}

#[test]
fn test_values_are_not_transformed() {
    let host = sample_host();
    let description = parse_description(HAIR_DUMP).unwrap();
    let (material, _) = PropertyRestorer::new(&host).restore(&description, "Hair", &standard());

    assert_eq!(material.floats()["_Glossiness"], description.properties.floats["_Glossiness"]);
    assert_eq!(material.colors()["_EmissionColor"], Color::new(4.0, 2.5, 0.0, 1.0));
}

#[test]
fn test_texture_resolved_case_insensitively() {
    let host = sample_host();
    let description = parse_description(HAIR_DUMP).unwrap();
    let (material, _) = PropertyRestorer::new(&host).restore(&description, "Hair", &standard());

    let main_tex = &material.tex_envs()["_MainTex"];
    let texture = main_tex.texture.as_ref().unwrap();
    assert_eq!(texture.name, "hair_albedo");
    assert_eq!(texture.reference, AssetReference::texture(TEXTURE_GUID));

    let bump = &material.tex_envs()["_BumpMap"];
    assert!(bump.texture.is_none());
    assert_relative_eq!(bump.scale.x, 2.0);
    assert_relative_eq!(bump.offset.x, 0.5);
}

#[test]
fn test_dump_then_restore_gives_same_assignments() {
    let host = sample_host();
    let shader = standard();
    let restorer = PropertyRestorer::new(&host);

    let (first, _) = restorer.restore(&parse_description(HAIR_DUMP).unwrap(), "Hair", &shader);

    let json = description_to_json(&dump_material(&first)).unwrap();
    let reparsed = parse_description(&json).unwrap();
    assert_eq!(reparsed.name.as_deref(), Some("Hair"));

    let (first_plan, first_report) = restorer.plan(&dump_material(&first), &shader.properties);
    let (second_plan, second_report) = restorer.plan(&reparsed, &shader.properties);
    assert_eq!(first_plan, second_plan);
    assert!(first_report.skipped.is_empty());
    assert!(second_report.skipped.is_empty());

    let (second, _) = restorer.restore(&reparsed, "Hair", &shader);
    assert_eq!(first, second);
}

#[test]
fn test_toon_shader_receives_its_own_properties() {
    let host = sample_host();
    let description = parse_description(HAIR_DUMP).unwrap();
    let toon = host.find_shader_by_name("lilToon").unwrap();
    let (material, _) = PropertyRestorer::new(&host).restore(&description, "Hair", &toon);

    assert_relative_eq!(material.floats()["_OutlineWidth"], 0.08);
    assert!(material.colors().contains_key("_ShadowColor"));
    assert!(!material.floats().contains_key("_Glossiness"));
}

#[test]
fn test_run_writes_material_asset() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("hair_dump.json");
    fs::write(&input, HAIR_DUMP).unwrap();

    let host = sample_host();
    let restorer = MaterialRestorer::new(&host, RestoreConfig::default());
    let request = RestoreRequest::new(&input, ShaderSelection::Mode(ShaderMode::Standard), dir.path().join("Out"));

    let outcome = restorer.run(&request).unwrap();
    assert_eq!(outcome.path, dir.path().join("Out").join("Hair.mat"));

    let yaml = fs::read_to_string(&outcome.path).unwrap();
    assert!(yaml.contains("  m_Name: Hair\n"));
    assert!(yaml.contains(&format!("m_Texture: {{fileID: 2800000, guid: {TEXTURE_GUID}, type: 3}}")));
    assert!(yaml.contains("    - _Cutoff: 0.5\n"));
    assert!(!yaml.contains("_OutlineWidth"));
}

#[test]
fn test_unnamed_dump_uses_file_stem() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("Face_01.json");
    fs::write(&input, r#"{ "m_SavedProperties": { "m_Floats": { "_Metallic": 1 } } }"#).unwrap();

    let host = sample_host();
    let restorer = MaterialRestorer::new(&host, RestoreConfig::default());
    let request = RestoreRequest::new(&input, ShaderSelection::default(), dir.path());

    let outcome = restorer.run(&request).unwrap();
    assert_eq!(outcome.material.name(), "Face_01");
    assert!(dir.path().join("Face_01.mat").is_file());
}

#[test]
fn test_missing_saved_properties_writes_empty_material() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("bare.json");
    fs::write(&input, r#"{ "m_Name": "Bare" }"#).unwrap();

    let host = sample_host();
    let restorer = MaterialRestorer::new(&host, RestoreConfig::default());
    let outcome = restorer
        .run(&RestoreRequest::new(&input, ShaderSelection::default(), dir.path()))
        .unwrap();

    assert_eq!(outcome.material.property_count(), 0);
    assert_eq!(outcome.report.applied, 0);
    assert!(outcome.path.is_file());
}

#[test]
fn test_malformed_json_fails_once_without_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("Broken.json");
    fs::write(&input, r#"{ "m_Name": "Broken", "m_SavedProperties": { "#).unwrap();
    let out = dir.path().join("Out");

    let host = sample_host();
    let restorer = MaterialRestorer::new(&host, RestoreConfig::default());
    let result = restorer.run(&RestoreRequest::new(&input, ShaderSelection::default(), &out));

    assert!(matches!(result, Err(RestoreError::Description(_))));
    assert!(!out.exists());
}

#[test]
fn test_rerun_overwrites_identically() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("hair.json");
    fs::write(&input, HAIR_DUMP).unwrap();

    let host = sample_host();
    let restorer = MaterialRestorer::new(&host, RestoreConfig::default());
    let request = RestoreRequest::new(&input, ShaderSelection::default(), dir.path().join("Out"));

    let first = restorer.run(&request).unwrap();
    let first_yaml = fs::read_to_string(&first.path).unwrap();
    let second = restorer.run(&request).unwrap();
    assert_eq!(fs::read_to_string(&second.path).unwrap(), first_yaml);
}
