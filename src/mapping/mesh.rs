use std::collections::HashMap;

use cgmath::Vector2;

use super::simplify_name;
use crate::fmdl::EncodeError;
use crate::host::{HostMeshObject, HostUvLayer, HostVertexGroup, DEFAULT_VERTEX_COLOR};
use crate::math::{y_up_to_z_up_vec3, z_up_to_y_up_vec3};
use crate::mesh_processing::tangents::compute_tangents;
use crate::mesh_processing::weights::limit_mesh_weights;
use crate::scene::{BoneWeight, Mesh, Skeleton, Vertex};
use crate::validation::report::Diagnostics;
use crate::validation::rules::validate_blend_weights;

pub const UV_MAP_COLOR: &str = "UVMap";
pub const UV_MAP_NORMALS: &str = "normal_map";

/// Host name of UV set `index`: `UVMap`, `normal_map`, `UVMap.001`, ...
pub fn uv_layer_name(index: usize) -> String {
    match index {
        0 => UV_MAP_COLOR.to_string(),
        1 => UV_MAP_NORMALS.to_string(),
        n => format!("{}.{:03}", UV_MAP_COLOR, n - 1),
    }
}

/// FMDL and the host measure V from opposite edges of the image.
fn flip_v(u: f32, v: f32) -> [f32; 2] {
    [u, 1.0 - v]
}

pub fn mesh_to_host(mesh: &Mesh, skeleton: Option<&Skeleton>) -> HostMeshObject {
    let uv_layers = (0..mesh.uv_set_count())
        .map(|set| HostUvLayer {
            name: uv_layer_name(set),
            coords: mesh
                .vertices
                .iter()
                .map(|v| v.uvs.get(set).map(|uv| flip_v(uv.x, uv.y)).unwrap_or([0.0, 1.0]))
                .collect(),
        })
        .collect();

    let mut vertex_groups: Vec<HostVertexGroup> = vec![];
    for bone in mesh.bone_group() {
        let name = skeleton
            .and_then(|s| s.bones.get(bone))
            .map(|b| b.name.clone())
            .unwrap_or_else(|| format!("bone{}", bone));
        let weights = mesh
            .vertices
            .iter()
            .enumerate()
            .flat_map(|(i, v)| {
                v.weights
                    .iter()
                    .filter(move |w| w.bone == bone)
                    .map(move |w| (i as u32, w.weight))
            })
            .collect();
        vertex_groups.push(HostVertexGroup { name, weights });
    }

    HostMeshObject {
        name: mesh.name.clone(),
        positions: mesh.vertices.iter().map(|v| y_up_to_z_up_vec3(v.position)).collect(),
        normals: mesh.vertices.iter().map(|v| y_up_to_z_up_vec3(v.normal)).collect(),
        uv_layers,
        colors: if mesh.has_colors() {
            mesh.vertices
                .iter()
                .map(|v| v.color.unwrap_or(DEFAULT_VERTEX_COLOR))
                .collect()
        } else {
            vec![]
        },
        vertex_groups,
        triangles: mesh.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]]).collect(),
        material: Some(mesh.material.clone()),
        parent_group: mesh.group.clone(),
    }
}

/// Order UV layers for export: `UVMap` first, `normal_map` second, the
/// rest as they come.
fn ordered_uv_layers(layers: &[HostUvLayer]) -> Vec<&HostUvLayer> {
    let mut ordered: Vec<&HostUvLayer> = vec![];
    for name in [UV_MAP_COLOR, UV_MAP_NORMALS] {
        if let Some(layer) = layers.iter().find(|l| l.name == name) {
            ordered.push(layer);
        }
    }
    for layer in layers {
        if !ordered.iter().any(|l| std::ptr::eq(*l, layer)) {
            ordered.push(layer);
        }
    }
    ordered
}

/// Build a scene mesh from a host object. `bones` maps bone names to
/// skeleton indices and must cover every vertex group. Tangents are derived
/// from the normals and the normal-map UV set.
pub fn mesh_from_host(
    object: &HostMeshObject,
    bones: &HashMap<String, usize>,
    diagnostics: &mut Diagnostics,
) -> Result<Mesh, EncodeError> {
    let name = simplify_name(&object.name).to_string();
    let material = match object.material.as_deref().map(simplify_name) {
        Some(material) if !material.is_empty() => material.to_string(),
        _ => return Err(EncodeError::MissingMaterial { mesh: name }),
    };

    let vertex_count = object.positions.len();
    for triangle in &object.triangles {
        if let Some(&index) = triangle.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(EncodeError::IndexOutOfRange {
                mesh: name,
                index,
                vertex_count,
            });
        }
    }
    let layers = ordered_uv_layers(&object.uv_layers);

    let mut vertices: Vec<Vertex> = object
        .positions
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let mut vertex = Vertex::at(z_up_to_y_up_vec3(*p));
            if let Some(n) = object.normals.get(i) {
                vertex.normal = z_up_to_y_up_vec3(*n);
            }
            vertex.uvs = layers
                .iter()
                .map(|layer| {
                    let uv = layer.coords.get(i).copied().unwrap_or([0.0, 0.0]);
                    let [u, v] = flip_v(uv[0], uv[1]);
                    Vector2::new(u, v)
                })
                .collect();
            if !object.colors.is_empty() {
                vertex.color = Some(object.colors.get(i).copied().unwrap_or(DEFAULT_VERTEX_COLOR));
            }
            vertex
        })
        .collect();

    for group in &object.vertex_groups {
        let Some(&bone) = bones.get(&group.name) else {
            continue;
        };
        for &(index, weight) in &group.weights {
            if weight <= 0.0 {
                continue;
            }
            let vertex = vertices
                .get_mut(index as usize)
                .ok_or_else(|| EncodeError::IndexOutOfRange {
                    mesh: name.clone(),
                    index,
                    vertex_count,
                })?;
            vertex.weights.push(BoneWeight { bone, weight });
        }
    }

    let mut mesh = Mesh {
        name,
        group: object.parent_group.as_deref().map(|g| simplify_name(g).to_string()),
        vertices,
        indices: object.triangles.iter().flatten().copied().collect(),
        material,
    };

    compute_tangents(&mut mesh);
    let (_, max_influences) = limit_mesh_weights(&mut mesh);
    if let Some(diagnostic) = validate_blend_weights(&mesh.name, max_influences) {
        diagnostics.add(diagnostic);
    }

    Ok(mesh)
}
