//! FMDL container writer.
//!
//! Every chunk payload is staged in memory before the output is assembled,
//! so an `EncodeError` never leaves a partially written container behind.

use std::collections::{HashMap, HashSet};

use super::chunk::{
    write_chunk, write_record, TAG_BBOX, TAG_BONE, TAG_FMDL, TAG_MESH, TAG_MTRL, TAG_STRS, TAG_TXTR,
};
use super::error::EncodeError;
use super::records::*;
use super::strings::StringTableBuilder;
use crate::math::{FmdlMatrix44, FmdlVector2, FmdlVector3, FmdlVector4};
use crate::scene::{Mesh, Scene};
use crate::validation::limits::{MAX_BLEND_WEIGHTS, MAX_BONE_GROUP_SIZE, MAX_TABLE_ENTRIES, MAX_UV_SETS};

/// Encode a scene into container bytes.
pub fn encode(scene: &Scene) -> Result<Vec<u8>, EncodeError> {
    check_scene(scene)?;

    let mut strings = StringTableBuilder::new();
    let bones = encode_bones(scene, &mut strings)?;
    let materials = encode_materials(scene, &mut strings)?;
    let textures = encode_textures(scene, &mut strings)?;
    let meshes = encode_meshes(scene, &mut strings)?;
    let bbox = encode_bounding_box(scene)?;

    let mut header = vec![];
    write_record(
        &mut header,
        &HeaderRecord {
            version: FMDL_VERSION,
            reserved: 0,
        },
    )?;

    let mut out = vec![];
    write_chunk(&mut out, TAG_FMDL, &header)?;
    write_chunk(&mut out, TAG_STRS, &strings.to_payload()?)?;
    write_chunk(&mut out, TAG_BONE, &bones)?;
    write_chunk(&mut out, TAG_MTRL, &materials)?;
    write_chunk(&mut out, TAG_TXTR, &textures)?;
    write_chunk(&mut out, TAG_MESH, &meshes)?;
    write_chunk(&mut out, TAG_BBOX, &bbox)?;

    log::debug!(
        "encoded FMDL: {} bytes, {} strings, {} meshes",
        out.len(),
        strings.len(),
        scene.meshes.len()
    );
    Ok(out)
}

// ============================================================================
// Scene-level checks
// ============================================================================

fn check_scene(scene: &Scene) -> Result<(), EncodeError> {
    check_table("bone", scene.bone_count())?;
    check_table("material", scene.materials.len())?;
    check_table("texture", scene.textures.len())?;
    check_table("mesh", scene.meshes.len())?;

    let mut names = HashSet::new();
    for material in &scene.materials {
        if !names.insert(material.name.as_str()) {
            return Err(EncodeError::DuplicateMaterial(material.name.clone()));
        }
    }

    if let Some(skeleton) = &scene.skeleton {
        for bone in &skeleton.bones {
            if let Some(parent) = bone.parent {
                if parent >= skeleton.bones.len() {
                    return Err(EncodeError::BoneOutOfRange {
                        context: format!("bone '{}'", bone.name),
                        bone: parent,
                        count: skeleton.bones.len(),
                    });
                }
            }
        }
        if let Some(index) = skeleton.find_cycle() {
            return Err(EncodeError::BoneCycle {
                bone: skeleton.bones[index].name.clone(),
            });
        }
    }
    Ok(())
}

fn check_table(table: &'static str, count: usize) -> Result<(), EncodeError> {
    if count > MAX_TABLE_ENTRIES {
        return Err(EncodeError::TableTooLarge {
            table,
            count,
            max: MAX_TABLE_ENTRIES,
        });
    }
    Ok(())
}

// ============================================================================
// Chunk payloads
// ============================================================================

fn encode_bones(scene: &Scene, strings: &mut StringTableBuilder) -> Result<Vec<u8>, EncodeError> {
    let bones = scene.skeleton.as_ref().map(|s| s.bones.as_slice()).unwrap_or(&[]);

    let mut buf = vec![];
    write_record(&mut buf, &(bones.len() as u16))?;
    for bone in bones {
        let record = BoneRecord {
            name: strings.intern(&bone.name)?,
            parent: optional_index(bone.parent.map(|p| p as u16)),
            bind: FmdlMatrix44(bone.bind_transform),
            bounds_min: FmdlVector3(bone.bounds.min),
            bounds_max: FmdlVector3(bone.bounds.max),
        };
        write_record(&mut buf, &record)?;
    }
    Ok(buf)
}

fn encode_materials(scene: &Scene, strings: &mut StringTableBuilder) -> Result<Vec<u8>, EncodeError> {
    let mut buf = vec![];
    write_record(&mut buf, &(scene.materials.len() as u16))?;

    for material in &scene.materials {
        let header = MaterialHeader {
            name: strings.intern(&material.name)?,
            shader: strings.intern(&material.shader)?,
            technique: strings.intern(&material.technique)?,
            alpha_flags: material.alpha_flags,
            shadow_flags: material.shadow_flags,
            flags: if material.anti_blur { FLAG_ANTI_BLUR } else { 0 },
            reserved: 0,
        };
        write_record(&mut buf, &header)?;

        check_table("parameter", material.parameters.len())?;
        write_record(&mut buf, &(material.parameters.len() as u16))?;
        for parameter in &material.parameters {
            let record = ParameterRecord {
                name: strings.intern(&parameter.name)?,
                values: parameter.values,
            };
            write_record(&mut buf, &record)?;
        }

        check_table("binding", material.bindings.len())?;
        write_record(&mut buf, &(material.bindings.len() as u16))?;
        for binding in &material.bindings {
            if binding.texture >= scene.textures.len() {
                return Err(EncodeError::TextureOutOfRange {
                    material: material.name.clone(),
                    texture: binding.texture,
                    count: scene.textures.len(),
                });
            }
            let record = BindingRecord {
                role: strings.intern(binding.role.token().unwrap_or(""))?,
                texture: binding.texture as u16,
            };
            write_record(&mut buf, &record)?;
        }
    }
    Ok(buf)
}

fn encode_textures(scene: &Scene, strings: &mut StringTableBuilder) -> Result<Vec<u8>, EncodeError> {
    let mut buf = vec![];
    write_record(&mut buf, &(scene.textures.len() as u16))?;
    for texture in &scene.textures {
        let record = TextureRecord {
            directory: strings.intern(&texture.directory)?,
            filename: strings.intern(&texture.filename)?,
            role_hint: strings.intern_optional(texture.role_hint.as_deref())?,
        };
        write_record(&mut buf, &record)?;
    }
    Ok(buf)
}

fn encode_meshes(scene: &Scene, strings: &mut StringTableBuilder) -> Result<Vec<u8>, EncodeError> {
    let mut buf = vec![];
    write_record(&mut buf, &(scene.meshes.len() as u16))?;
    for mesh in &scene.meshes {
        encode_mesh(&mut buf, scene, mesh, strings)?;
    }
    Ok(buf)
}

fn encode_mesh(
    buf: &mut Vec<u8>,
    scene: &Scene,
    mesh: &Mesh,
    strings: &mut StringTableBuilder,
) -> Result<(), EncodeError> {
    if mesh.material.is_empty() {
        return Err(EncodeError::MissingMaterial {
            mesh: mesh.name.clone(),
        });
    }
    let material = scene
        .material_index(&mesh.material)
        .ok_or_else(|| EncodeError::UnknownMaterial {
            mesh: mesh.name.clone(),
            material: mesh.material.clone(),
        })?;

    let uv_sets = mesh.uv_set_count();
    if uv_sets > MAX_UV_SETS {
        return Err(EncodeError::TooManyUvSets {
            mesh: mesh.name.clone(),
            count: uv_sets,
            max: MAX_UV_SETS,
        });
    }

    let vertex_count = mesh.vertices.len();
    if u32::try_from(vertex_count).is_err() {
        return Err(EncodeError::TooManyVertices {
            mesh: mesh.name.clone(),
            count: vertex_count,
        });
    }
    let wide = u16::try_from(vertex_count).is_err();

    let bone_group = mesh.bone_group();
    if bone_group.len() > MAX_BONE_GROUP_SIZE {
        return Err(EncodeError::BoneGroupTooLarge {
            mesh: mesh.name.clone(),
            count: bone_group.len(),
            max: MAX_BONE_GROUP_SIZE,
        });
    }
    let bone_count = scene.bone_count();
    if let Some(&bone) = bone_group.iter().find(|&&b| b >= bone_count) {
        return Err(EncodeError::BoneOutOfRange {
            context: format!("mesh '{}'", mesh.name),
            bone,
            count: bone_count,
        });
    }
    let local: HashMap<usize, u8> = bone_group
        .iter()
        .enumerate()
        .map(|(i, &bone)| (bone, i as u8))
        .collect();

    if mesh.indices.len() % 3 != 0 {
        return Err(EncodeError::IncompleteTriangle {
            mesh: mesh.name.clone(),
            index_count: mesh.indices.len(),
        });
    }
    if let Some(&index) = mesh.indices.iter().find(|&&i| i as usize >= vertex_count) {
        return Err(EncodeError::IndexOutOfRange {
            mesh: mesh.name.clone(),
            index,
            vertex_count,
        });
    }

    let header = MeshHeader {
        name: strings.intern(&mesh.name)?,
        group: strings.intern_optional(mesh.group.as_deref())?,
        material: material as u16,
        uv_sets: uv_sets as u8,
        index_width: if wide { 4 } else { 2 },
        attributes: vertex_attribute_bits(mesh),
    };
    write_record(buf, &header)?;

    write_record(buf, &(bone_group.len() as u16))?;
    for &bone in &bone_group {
        write_record(buf, &(bone as u16))?;
    }

    write_record(buf, &(vertex_count as u32))?;
    for (i, vertex) in mesh.vertices.iter().enumerate() {
        if vertex.uvs.len() != uv_sets {
            return Err(EncodeError::InconsistentUvSets {
                mesh: mesh.name.clone(),
                vertex: i,
                expected: uv_sets,
                found: vertex.uvs.len(),
            });
        }
        check_vertex_attribute(mesh, i, "tangent", vertex.tangent.is_some(), mesh.has_tangents())?;
        check_vertex_attribute(mesh, i, "color", vertex.color.is_some(), mesh.has_colors())?;
        if vertex.weights.len() > MAX_BLEND_WEIGHTS {
            return Err(EncodeError::TooManyWeights {
                mesh: mesh.name.clone(),
                vertex: i,
                count: vertex.weights.len(),
                max: MAX_BLEND_WEIGHTS,
            });
        }

        write_record(
            buf,
            &VertexAttributes {
                position: FmdlVector3(vertex.position),
                normal: FmdlVector3(vertex.normal),
            },
        )?;
        if let Some(tangent) = vertex.tangent {
            write_record(buf, &FmdlVector4(tangent))?;
        }
        if let Some(color) = vertex.color {
            write_record(buf, &color)?;
        }
        for uv in &vertex.uvs {
            write_record(buf, &FmdlVector2(*uv))?;
        }
        write_record(buf, &(vertex.weights.len() as u8))?;
        for weight in &vertex.weights {
            let record = WeightRecord {
                local_bone: local[&weight.bone],
                weight: weight.weight,
            };
            write_record(buf, &record)?;
        }
    }

    write_record(buf, &(mesh.indices.len() as u32))?;
    for &index in &mesh.indices {
        if wide {
            write_record(buf, &index)?;
        } else {
            write_record(buf, &(index as u16))?;
        }
    }
    Ok(())
}

fn vertex_attribute_bits(mesh: &Mesh) -> u8 {
    let mut bits = 0;
    if mesh.has_colors() {
        bits |= VERTEX_COLOR;
    }
    if mesh.has_tangents() {
        bits |= VERTEX_TANGENT;
    }
    bits
}

/// Optional vertex fields are stored for all vertices of a mesh or none.
fn check_vertex_attribute(
    mesh: &Mesh,
    vertex: usize,
    attribute: &'static str,
    present: bool,
    expected: bool,
) -> Result<(), EncodeError> {
    if present == expected {
        return Ok(());
    }
    Err(EncodeError::InconsistentVertexAttributes {
        mesh: mesh.name.clone(),
        vertex,
        attribute,
        presence: if present { "has" } else { "lacks" },
    })
}

fn encode_bounding_box(scene: &Scene) -> Result<Vec<u8>, EncodeError> {
    let bb = scene.bounding_box();
    let mut buf = vec![];
    write_record(
        &mut buf,
        &BoundingBoxRecord {
            authored: scene.bounding_box.is_some() as u8,
            min: FmdlVector3(bb.min),
            max: FmdlVector3(bb.max),
        },
    )?;
    Ok(buf)
}
