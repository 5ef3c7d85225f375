//! Human-readable listings: what an export would produce, and what a
//! container holds.

use super::error::FmdlError;
use super::export::prepare_scene;
use super::options::ExportOptions;
use crate::fmdl::{self, FormatError};
use crate::host::HostSceneAdapter;
use crate::mesh_processing::split::split_mesh;
use crate::scene::{BoundingBox, Scene};
use crate::validation::limits::ENGINE_BONE_GROUP_LIMIT;
use crate::validation::report::Diagnostics;

/// Describe what exporting the host scene with `options` would write,
/// without encoding anything.
pub fn export_summary(host: &dyn HostSceneAdapter, options: &ExportOptions) -> Result<String, FmdlError> {
    let mut diagnostics = Diagnostics::new();
    let scene = prepare_scene(host, options, &mut diagnostics)?;
    let mut out = String::new();

    out.push_str(&format!("Meshes ({}):\n", scene.meshes.len()));
    for mesh in &scene.meshes {
        let bones = mesh.bone_group().len();
        out.push_str(&format!(
            "  {}: {} vertices, {} triangles, {} bones, material '{}'\n",
            mesh.name,
            mesh.vertices.len(),
            mesh.triangle_count(),
            bones,
            mesh.material
        ));
        if mesh.exceeds_limit(options.limit) {
            if options.split_meshes {
                let parts = split_mesh(mesh, options.limit).len();
                out.push_str(&format!("    will be split into {} parts\n", parts));
            } else {
                out.push_str(&format!("    exceeds the limit of {} and will be skipped\n", options.limit));
            }
        }
        if bones > ENGINE_BONE_GROUP_LIMIT {
            out.push_str(&format!("    more than {} bones\n", ENGINE_BONE_GROUP_LIMIT));
        }
    }

    write_materials(&mut out, &scene);

    out.push_str(&format!("Skeleton: {} bones\n", scene.bone_count()));
    out.push_str(&format!(
        "Diagnostics: {} warnings, {} info\n",
        diagnostics.warning_count, diagnostics.info_count
    ));
    for item in &diagnostics.items {
        out.push_str(&format!("  [{}] {}: {}\n", item.code, item.subject, item.message));
    }
    Ok(out)
}

/// List the contents of an FMDL container.
pub fn inspect(bytes: &[u8]) -> Result<String, FormatError> {
    let scene = fmdl::decode(bytes)?;
    let mut out = String::new();

    out.push_str(&format!("FMDL {} bytes\n", bytes.len()));
    out.push_str(&format!("Meshes ({}):\n", scene.meshes.len()));
    for mesh in &scene.meshes {
        out.push_str(&format!(
            "  {}{}: {} vertices, {} triangles, {} uv sets{}{}, {} bones, material '{}'\n",
            mesh.name,
            mesh.group
                .as_deref()
                .map(|g| format!(" (group {})", g))
                .unwrap_or_default(),
            mesh.vertices.len(),
            mesh.triangle_count(),
            mesh.uv_set_count(),
            if mesh.has_colors() { ", colors" } else { "" },
            if mesh.has_tangents() { ", tangents" } else { "" },
            mesh.bone_group().len(),
            mesh.material
        ));
    }

    write_materials(&mut out, &scene);

    out.push_str(&format!("Textures ({}):\n", scene.textures.len()));
    for (i, texture) in scene.textures.iter().enumerate() {
        out.push_str(&format!(
            "  {:3} {} [{}]\n",
            i,
            texture.path(),
            texture.role_hint.as_deref().unwrap_or("-")
        ));
    }

    match &scene.skeleton {
        Some(skeleton) => {
            out.push_str(&format!("Bones ({}):\n", skeleton.bones.len()));
            for bone in &skeleton.bones {
                let parent = bone
                    .parent
                    .and_then(|p| skeleton.bones.get(p))
                    .map(|p| p.name.as_str())
                    .unwrap_or("-");
                out.push_str(&format!("  {} <- {}\n", bone.name, parent));
            }
        }
        None => out.push_str("Bones (0)\n"),
    }

    let authored = if scene.bounding_box.is_some() { "authored" } else { "computed" };
    out.push_str(&format!(
        "Bounding box ({}): {}\n",
        authored,
        describe_box(&scene.bounding_box())
    ));
    Ok(out)
}

fn write_materials(out: &mut String, scene: &Scene) {
    out.push_str(&format!("Materials ({}):\n", scene.materials.len()));
    for material in &scene.materials {
        out.push_str(&format!(
            "  {}: {} / {}{}\n",
            material.name,
            material.shader,
            material.technique,
            if material.anti_blur { " (anti-blur)" } else { "" }
        ));
        for binding in &material.bindings {
            let path = scene
                .textures
                .get(binding.texture)
                .map(|t| t.path())
                .unwrap_or_default();
            out.push_str(&format!("    {} = {}\n", binding.role, path));
        }
    }
}

fn describe_box(b: &BoundingBox) -> String {
    format!(
        "({:.3}, {:.3}, {:.3}) .. ({:.3}, {:.3}, {:.3})",
        b.min.x, b.min.y, b.min.z, b.max.x, b.max.y, b.max.z
    )
}
