// Texture role recovery and colorspace selection, on their own and through
// an import/export round trip.

use fmdl_tools_lib::fmdl::{decode, encode};
use fmdl_tools_lib::host::MemoryHost;
use fmdl_tools_lib::pipeline::{export_scene, import_bytes, ExportOptions, ImportOptions};
use fmdl_tools_lib::scene::{ColorspaceIntent, TextureRole};
use fmdl_tools_lib::texture::colorspace::resolve_colorspace;
use fmdl_tools_lib::texture::role::{resolve_role, RoleSignals, RoleSource};
use fmdl_tools_lib::validation::report::Diagnostics;

#[path = "common/mod.rs"]
mod common;

fn available(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[test]
fn structured_role_beats_display_name() {
    let signals = RoleSignals {
        structured: Some("NormalMap_Tex_NRM".into()),
        custom: None,
        display_name: Some("[Base_Tex_SRGB] foo.png".into()),
    };
    let resolution = resolve_role(&signals);
    assert_eq!(resolution.role, TextureRole::NormalMap);
    assert_eq!(resolution.source, Some(RoleSource::Structured));
}

#[test]
fn bare_token_display_name_resolves() {
    let signals = RoleSignals {
        display_name: Some("NormalMap_Tex_NRM".into()),
        ..Default::default()
    };
    let resolution = resolve_role(&signals);
    assert_eq!(resolution.role, TextureRole::NormalMap);
    assert_eq!(resolution.source, Some(RoleSource::DisplayName));
}

#[test]
fn missing_linear_colorspace_falls_back_once() {
    let mut diagnostics = Diagnostics::new();
    let chosen = resolve_colorspace(
        ColorspaceIntent::Linear,
        &available(&["sRGB", "Non-Color"]),
        "face_srm.dds",
        &mut diagnostics,
    );
    assert_eq!(chosen, "sRGB");
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics.warning_count, 1);
    assert!(diagnostics.has_code("COLORSPACE_DEFAULTED"));
}

#[test]
fn import_assigns_colorspaces_and_labels() {
    let bytes = encode(&common::sample_scene()).unwrap();
    let mut host = MemoryHost::new().with_colorspaces(&["sRGB", "Non-Color"]);

    let report = import_bytes(&bytes, None, &mut host, &ImportOptions::default()).unwrap();
    for item in &report.diagnostics.items {
        println!("  [{}] {}: {}", item.code, item.subject, item.message);
    }

    let scene = &host.scene;
    let colorspace_of = |name: &str| {
        scene
            .image(name)
            .and_then(|i| i.colorspace.clone())
            .unwrap_or_default()
    };
    assert_eq!(colorspace_of("[Base_Tex_SRGB] face_bsm.dds"), "sRGB");
    assert_eq!(colorspace_of("[NormalMap_Tex_NRM] dummy_nrm.dds"), "Non-Color");
    assert_eq!(colorspace_of("[SpecularMap_Tex_LIN] face_srm.dds"), "sRGB");

    // The shared normal map is resolved once even though two materials bind it.
    let defaulted: Vec<_> = report
        .diagnostics
        .items
        .iter()
        .filter(|d| d.code == "COLORSPACE_DEFAULTED")
        .map(|d| d.subject.as_str())
        .collect();
    assert_eq!(defaulted, vec!["face_srm.dds", "sword_bsm.dds"]);

    let skin = scene.material("skin").expect("skin material");
    let labels: Vec<&str> = skin.graph.image_nodes().map(|n| n.label.as_str()).collect();
    assert_eq!(labels, vec!["Base_Tex_SRGB", "NormalMap_Tex_NRM", "SpecularMap_Tex_LIN"]);
}

#[test]
fn roles_survive_a_host_round_trip() {
    let original = common::sample_scene();
    let bytes = encode(&original).unwrap();
    let mut host = MemoryHost::new();
    import_bytes(&bytes, None, &mut host, &ImportOptions::default()).unwrap();

    let report = export_scene(&host, &ExportOptions::default()).unwrap();
    let decoded = decode(&report.bytes).unwrap();

    for material in &original.materials {
        let exported = decoded
            .materials
            .iter()
            .find(|m| m.name == material.name)
            .expect("material exported");
        let roles: Vec<&TextureRole> = exported.bindings.iter().map(|b| &b.role).collect();
        let expected: Vec<&TextureRole> = material.bindings.iter().map(|b| &b.role).collect();
        assert_eq!(roles, expected, "material {}", material.name);
    }
}

#[test]
fn renamed_image_keeps_its_structured_role() {
    let bytes = encode(&common::sample_scene()).unwrap();
    let mut host = MemoryHost::new();
    import_bytes(&bytes, None, &mut host, &ImportOptions::default()).unwrap();

    // Simulate a user renaming the image and clearing the node label.
    let old_name = "[NormalMap_Tex_NRM] dummy_nrm.dds";
    let new_name = "[Base_Tex_SRGB] renamed.dds";
    for image in host.scene.images.iter_mut().filter(|i| i.name == old_name) {
        image.name = new_name.to_string();
    }
    for material in host.scene.materials.iter_mut() {
        for node in material.graph.nodes.iter_mut() {
            if node.image.as_deref() == Some(old_name) {
                node.image = Some(new_name.to_string());
                node.label.clear();
            }
        }
    }

    let report = export_scene(&host, &ExportOptions::default()).unwrap();
    let decoded = decode(&report.bytes).unwrap();
    let metal = decoded.material("metal").unwrap();
    assert_eq!(metal.bindings[1].role, TextureRole::NormalMap);
    assert_eq!(decoded.textures[metal.bindings[1].texture].filename, "dummy_nrm.dds");
}
