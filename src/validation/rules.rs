use serde::Serialize;
use thiserror::Error;

use super::limits::*;
use super::report::*;
use crate::scene::Mesh;

/// A mesh that exceeds the vertex/index limit while splitting is disabled.
/// Fatal for that mesh only; the rest of the scene still exports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("mesh '{mesh}' exceeds the limit of {limit} by {overage} ({vertex_count} vertices, {index_count} indices)")]
pub struct MeshLimitExceeded {
    pub mesh: String,
    pub vertex_count: usize,
    pub index_count: usize,
    pub limit: usize,
    /// How far the larger of the two counts is over the limit.
    pub overage: usize,
}

impl MeshLimitExceeded {
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::new(
            DiagnosticKind::MeshLimitExceeded,
            Severity::Error,
            "MESH_LIMIT_EXCEEDED",
            self.mesh.clone(),
            self.to_string(),
        )
    }
}

/// Check a mesh's vertex and index counts against `limit`.
pub fn validate_mesh_limit(mesh: &Mesh, limit: usize) -> Result<(), MeshLimitExceeded> {
    let vertex_count = mesh.vertices.len();
    let index_count = mesh.indices.len();
    let worst = vertex_count.max(index_count);
    if worst > limit {
        Err(MeshLimitExceeded {
            mesh: mesh.name.clone(),
            vertex_count,
            index_count,
            limit,
            overage: worst - limit,
        })
    } else {
        Ok(())
    }
}

/// An over-limit mesh whose split produced no parts (it has vertices but no
/// triangles) is dropped from the output.
pub fn validate_split_parts(mesh: &str, part_count: usize) -> Option<Diagnostic> {
    if part_count == 0 {
        Some(Diagnostic::warning(
            DiagnosticKind::Validation,
            "MESH_DROPPED",
            mesh,
            "Mesh exceeds the part limit but has no triangles to split. It is left out.",
        ))
    } else {
        None
    }
}

/// Validate a mesh part's bone group against the engine skinning limit.
pub fn validate_bone_group(mesh: &str, bone_count: usize) -> Option<Diagnostic> {
    if bone_count > ENGINE_BONE_GROUP_LIMIT {
        Some(Diagnostic::warning(
            DiagnosticKind::Validation,
            "BONE_GROUP_TOO_LARGE",
            mesh,
            format!(
                "Mesh references {} bones. The engine skins at most {} bones per mesh part.",
                bone_count, ENGINE_BONE_GROUP_LIMIT
            ),
        ))
    } else {
        None
    }
}

/// Validate blend weight count per vertex.
pub fn validate_blend_weights(mesh: &str, max_influences: usize) -> Option<Diagnostic> {
    if max_influences > MAX_BLEND_WEIGHTS {
        Some(Diagnostic::warning(
            DiagnosticKind::Validation,
            "BLEND_WEIGHT_EXCEEDED",
            mesh,
            format!(
                "Some vertices have {} bone influences. Only the {} largest are kept and renormalized.",
                max_influences, MAX_BLEND_WEIGHTS
            ),
        ))
    } else {
        None
    }
}

/// Validate texture dimensions.
pub fn validate_texture_dimensions(texture: &str, width: u32, height: u32) -> Vec<Diagnostic> {
    let mut items = vec![];

    if width > MAX_TEXTURE_DIMENSION || height > MAX_TEXTURE_DIMENSION {
        items.push(Diagnostic::warning(
            DiagnosticKind::Validation,
            "TEXTURE_TOO_LARGE",
            texture,
            format!(
                "Texture dimensions ({}x{}) exceed maximum ({}).",
                width, height, MAX_TEXTURE_DIMENSION
            ),
        ));
    }

    if !width.is_power_of_two() || !height.is_power_of_two() {
        items.push(Diagnostic::warning(
            DiagnosticKind::Validation,
            "TEXTURE_NOT_POT",
            texture,
            format!("Texture dimensions ({}x{}) are not power-of-two.", width, height),
        ));
    }

    items
}

/// Mesh has no UV set at all.
pub fn validate_texcoords(mesh: &Mesh) -> Option<Diagnostic> {
    if !mesh.vertices.is_empty() && mesh.uv_set_count() == 0 {
        Some(Diagnostic::warning(
            DiagnosticKind::Validation,
            "MISSING_TEXCOORDS",
            mesh.name.clone(),
            "Mesh has no texture coordinates. Textures will not display.",
        ))
    } else {
        None
    }
}
