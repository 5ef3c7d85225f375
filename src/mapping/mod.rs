//! Translation between the scene model and host-native data.

pub mod material;
pub mod mesh;
pub mod skeleton;

use std::collections::HashMap;

use crate::fmdl::EncodeError;
use crate::host::{HostBoundingBox, HostScene};
use crate::math::{y_up_to_z_up_vec3, z_up_to_y_up_vec3};
use crate::mesh_processing::bounds::envelope;
use crate::scene::{BoundingBox, Scene};
use crate::validation::report::Diagnostics;

pub use material::{ImportedTexture, MaterialExport};

/// Strip a host duplicate suffix: `body.001` → `body`.
pub fn simplify_name(name: &str) -> &str {
    if let Some(pos) = name.rfind('.') {
        let suffix = &name[pos + 1..];
        if pos > 0 && suffix.len() >= 3 && suffix.chars().all(|c| c.is_ascii_digit()) {
            return &name[..pos];
        }
    }
    name
}

pub fn bounding_box_to_host(bounds: &BoundingBox) -> HostBoundingBox {
    let corners = [y_up_to_z_up_vec3(bounds.min), y_up_to_z_up_vec3(bounds.max)];
    host_envelope(corners)
}

pub fn bounding_box_from_host(bounds: &HostBoundingBox) -> BoundingBox {
    let corners = [z_up_to_y_up_vec3(bounds.min), z_up_to_y_up_vec3(bounds.max)];
    envelope(corners).unwrap_or_else(BoundingBox::zero)
}

// Axis changes flip one axis, so the corners have to be re-sorted.
fn host_envelope(corners: [[f32; 3]; 2]) -> HostBoundingBox {
    let [a, b] = corners;
    HostBoundingBox {
        min: [a[0].min(b[0]), a[1].min(b[1]), a[2].min(b[2])],
        max: [a[0].max(b[0]), a[1].max(b[1]), a[2].max(b[2])],
    }
}

/// Build the host scene for an imported scene.
pub fn scene_to_host(scene: &Scene, imported: &[ImportedTexture], anti_blur: bool) -> HostScene {
    let skeleton = scene.skeleton.as_ref();
    let (materials, images) = material::materials_to_host(scene, imported, anti_blur);

    HostScene {
        objects: scene
            .meshes
            .iter()
            .map(|m| mesh::mesh_to_host(m, skeleton))
            .collect(),
        materials,
        images,
        armature: skeleton.map(skeleton::skeleton_to_host),
        bounding_box: scene.bounding_box.as_ref().map(bounding_box_to_host),
    }
}

/// Build a scene from a host snapshot. Meshes are not split and bone
/// bounds are not computed here.
pub fn host_to_scene(
    host: &HostScene,
    settings: MaterialExport<'_>,
    diagnostics: &mut Diagnostics,
) -> Result<Scene, EncodeError> {
    let skeleton = skeleton::skeleton_from_host(host.armature.as_ref(), &host.objects, diagnostics)?;
    let bones: HashMap<String, usize> = skeleton
        .iter()
        .flat_map(|s| s.bones.iter().enumerate())
        .map(|(i, b)| (b.name.clone(), i))
        .collect();

    let mut textures = vec![];
    let materials = host
        .materials
        .iter()
        .map(|m| material::material_from_host(m, &host.images, &mut textures, settings, diagnostics))
        .collect();

    let meshes = host
        .objects
        .iter()
        .map(|o| mesh::mesh_from_host(o, &bones, diagnostics))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Scene {
        meshes,
        materials,
        textures,
        skeleton,
        bounding_box: host.bounding_box.as_ref().map(bounding_box_from_host),
    })
}
