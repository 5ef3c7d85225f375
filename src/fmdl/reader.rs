//! FMDL container reader.
//!
//! Binary layout (all little-endian):
//! ```text
//! chunk := tag[4] length(u32) payload[length]
//!
//! FMDL  version(u32 = 0x0203) reserved(u32)
//! STRS  count(u16) count × (len(u16) utf8[len])          index 0 is ""
//! BONE  count(u16) count × (name(u16) parent(u16) bind[f32;16] min[f32;3] max[f32;3])
//! MTRL  count(u16) count × (name shader technique(u16) alpha(u8) shadow(u8) flags(u8) pad(u8)
//!                           param_count(u16) × (name(u16) values[f32;4])
//!                           binding_count(u16) × (role(u16) texture(u16)))
//! TXTR  count(u16) count × (directory(u16) filename(u16) role_hint(u16))
//! MESH  count(u16) count × (name(u16) group(u16) material(u16) uv_sets(u8) index_width(u8)
//!                           attributes(u8) bone_group_count(u16) bone_group[u16]
//!                           vertex_count(u32) vertices index_count(u32) indices)
//!       vertex := position[f32;3] normal[f32;3] tangent[f32;4]? color[f32;4]?
//!                 uv_sets × [f32;2] weight_count(u8) × (local_bone(u8) weight(f32))
//! BBOX  authored(u8) min[f32;3] max[f32;3]
//! ```
//! Index fields use 0xFFFF for "none". Chunks appear exactly once, in the
//! order above.

use std::collections::HashSet;

use cgmath::Vector2;

use super::chunk::{ChunkReader, Payload, TAG_BBOX, TAG_BONE, TAG_FMDL, TAG_MESH, TAG_MTRL, TAG_STRS, TAG_TXTR};
use super::error::FormatError;
use super::records::*;
use super::strings::StringTable;
use crate::math::{FmdlVector2, FmdlVector4};
use crate::scene::{
    Bone, BoneWeight, BoundingBox, Material, MaterialParameter, Mesh, Scene, Skeleton, Texture,
    TextureBinding, TextureRole, Vertex,
};

/// Decode a complete container. No partial scene is returned on failure.
pub fn decode(bytes: &[u8]) -> Result<Scene, FormatError> {
    let mut chunks = ChunkReader::new(bytes);

    let mut payload = chunks.expect(TAG_FMDL)?;
    read_header(&mut payload)?;
    payload.finish()?;

    let mut payload = chunks.expect(TAG_STRS)?;
    let strings = StringTable::read(&mut payload)?;
    payload.finish()?;

    let mut payload = chunks.expect(TAG_BONE)?;
    let bones = read_bones(&mut payload, &strings)?;
    payload.finish()?;

    let mut payload = chunks.expect(TAG_MTRL)?;
    let materials = read_materials(&mut payload, &strings)?;
    payload.finish()?;

    let mut payload = chunks.expect(TAG_TXTR)?;
    let textures = read_textures(&mut payload, &strings)?;
    payload.finish()?;

    let mut payload = chunks.expect(TAG_MESH)?;
    let meshes = read_meshes(&mut payload, &strings, &materials, bones.len())?;
    payload.finish()?;

    let mut payload = chunks.expect(TAG_BBOX)?;
    let bounding_box = read_bounding_box(&mut payload)?;
    payload.finish()?;

    chunks.finish()?;

    for material in &materials {
        for binding in &material.bindings {
            if binding.texture >= textures.len() {
                return Err(FormatError::IndexOutOfRange {
                    chunk: TAG_MTRL,
                    table: "texture",
                    index: binding.texture,
                    count: textures.len(),
                });
            }
        }
    }

    let skeleton = if bones.is_empty() {
        None
    } else {
        Some(Skeleton { bones })
    };

    log::debug!(
        "decoded FMDL: {} meshes, {} materials, {} textures, {} bones",
        meshes.len(),
        materials.len(),
        textures.len(),
        skeleton.as_ref().map(|s| s.bones.len()).unwrap_or(0)
    );

    Ok(Scene {
        meshes,
        materials,
        textures,
        skeleton,
        bounding_box,
    })
}

fn read_header(payload: &mut Payload) -> Result<(), FormatError> {
    let header: HeaderRecord = payload.read("header")?;
    if header.version != FMDL_VERSION {
        return Err(FormatError::UnsupportedVersion {
            found: header.version,
            expected: FMDL_VERSION,
        });
    }
    Ok(())
}

fn read_bones(payload: &mut Payload, strings: &StringTable) -> Result<Vec<Bone>, FormatError> {
    let count = payload.read::<u16>("bone count")? as usize;
    let mut bones = Vec::with_capacity(count);

    for _ in 0..count {
        let record: BoneRecord = payload.read("bone")?;
        let parent = index_or_none(record.parent).map(usize::from);
        if let Some(parent) = parent {
            if parent >= count {
                return Err(FormatError::IndexOutOfRange {
                    chunk: TAG_BONE,
                    table: "bone",
                    index: parent,
                    count,
                });
            }
        }
        bones.push(Bone {
            name: strings.get(TAG_BONE, record.name)?.to_string(),
            parent,
            bind_transform: record.bind.0,
            bounds: BoundingBox::new(record.bounds_min.0, record.bounds_max.0),
        });
    }

    let skeleton = Skeleton { bones };
    if let Some(index) = skeleton.find_cycle() {
        return Err(FormatError::BoneCycle {
            bone: skeleton.bones[index].name.clone(),
        });
    }
    Ok(skeleton.bones)
}

fn read_materials(payload: &mut Payload, strings: &StringTable) -> Result<Vec<Material>, FormatError> {
    let count = payload.read::<u16>("material count")? as usize;
    let mut materials: Vec<Material> = Vec::with_capacity(count);
    let mut names = HashSet::new();

    for _ in 0..count {
        let header: MaterialHeader = payload.read("material")?;
        let name = strings.get(TAG_MTRL, header.name)?.to_string();
        if !names.insert(name.clone()) {
            return Err(FormatError::DuplicateMaterial(name));
        }

        let param_count = payload.read::<u16>("parameter count")?;
        let mut parameters = vec![];
        for _ in 0..param_count {
            let record: ParameterRecord = payload.read("parameter")?;
            parameters.push(MaterialParameter {
                name: strings.get(TAG_MTRL, record.name)?.to_string(),
                values: record.values,
            });
        }

        let binding_count = payload.read::<u16>("binding count")?;
        let mut bindings = vec![];
        for _ in 0..binding_count {
            let record: BindingRecord = payload.read("binding")?;
            let token = strings.get(TAG_MTRL, record.role)?;
            bindings.push(TextureBinding {
                role: TextureRole::from_token(token).unwrap_or(TextureRole::Unknown),
                texture: record.texture as usize,
                colorspace: None,
            });
        }

        materials.push(Material {
            name,
            shader: strings.get(TAG_MTRL, header.shader)?.to_string(),
            technique: strings.get(TAG_MTRL, header.technique)?.to_string(),
            parameters,
            bindings,
            alpha_flags: header.alpha_flags,
            shadow_flags: header.shadow_flags,
            anti_blur: header.flags & FLAG_ANTI_BLUR != 0,
        });
    }

    Ok(materials)
}

fn read_textures(payload: &mut Payload, strings: &StringTable) -> Result<Vec<Texture>, FormatError> {
    let count = payload.read::<u16>("texture count")?;
    let mut textures = vec![];

    for _ in 0..count {
        let record: TextureRecord = payload.read("texture")?;
        textures.push(Texture {
            directory: strings.get(TAG_TXTR, record.directory)?.to_string(),
            filename: strings.get(TAG_TXTR, record.filename)?.to_string(),
            role_hint: strings
                .get_optional(TAG_TXTR, record.role_hint)?
                .map(str::to_string),
        });
    }

    Ok(textures)
}

fn read_meshes(
    payload: &mut Payload,
    strings: &StringTable,
    materials: &[Material],
    bone_count: usize,
) -> Result<Vec<Mesh>, FormatError> {
    let count = payload.read::<u16>("mesh count")?;
    let mut meshes = vec![];

    for _ in 0..count {
        let header: MeshHeader = payload.read("mesh")?;
        let name = strings.get(TAG_MESH, header.name)?.to_string();
        let group = strings
            .get_optional(TAG_MESH, header.group)?
            .map(str::to_string);
        let material = materials
            .get(header.material as usize)
            .ok_or(FormatError::IndexOutOfRange {
                chunk: TAG_MESH,
                table: "material",
                index: header.material as usize,
                count: materials.len(),
            })?
            .name
            .clone();

        let invalid = |message: String| FormatError::InvalidMesh {
            mesh: name.clone(),
            message,
        };

        if header.index_width != 2 && header.index_width != 4 {
            return Err(invalid(format!("index width {} (expected 2 or 4)", header.index_width)));
        }
        if header.attributes & !(VERTEX_COLOR | VERTEX_TANGENT) != 0 {
            return Err(invalid(format!("unknown vertex attribute bits {:#04x}", header.attributes)));
        }
        let has_tangent = header.attributes & VERTEX_TANGENT != 0;
        let has_color = header.attributes & VERTEX_COLOR != 0;

        let group_count = payload.read::<u16>("bone group count")?;
        let mut bone_group = vec![];
        for _ in 0..group_count {
            let bone = payload.read::<u16>("bone group entry")? as usize;
            if bone >= bone_count {
                return Err(FormatError::IndexOutOfRange {
                    chunk: TAG_MESH,
                    table: "bone",
                    index: bone,
                    count: bone_count,
                });
            }
            bone_group.push(bone);
        }

        let vertex_count = payload.read::<u32>("vertex count")? as usize;
        let mut vertices = vec![];
        for _ in 0..vertex_count {
            let attributes: VertexAttributes = payload.read("vertex")?;
            let tangent = if has_tangent {
                Some(payload.read::<FmdlVector4>("tangent")?.0)
            } else {
                None
            };
            let color = if has_color {
                Some(payload.read::<[f32; 4]>("color")?)
            } else {
                None
            };
            let mut uvs = Vec::with_capacity(header.uv_sets as usize);
            for _ in 0..header.uv_sets {
                let uv: FmdlVector2 = payload.read("uv")?;
                uvs.push(Vector2::new(uv.0.x, uv.0.y));
            }
            let weight_count = payload.read::<u8>("weight count")?;
            let mut weights = Vec::with_capacity(weight_count as usize);
            for _ in 0..weight_count {
                let record: WeightRecord = payload.read("weight")?;
                let bone = bone_group.get(record.local_bone as usize).ok_or_else(|| {
                    invalid(format!(
                        "local bone {} outside its bone group of {}",
                        record.local_bone,
                        bone_group.len()
                    ))
                })?;
                weights.push(BoneWeight {
                    bone: *bone,
                    weight: record.weight,
                });
            }
            vertices.push(Vertex {
                position: attributes.position.0,
                normal: attributes.normal.0,
                tangent,
                color,
                uvs,
                weights,
            });
        }

        let index_count = payload.read::<u32>("index count")? as usize;
        if index_count % 3 != 0 {
            return Err(invalid(format!("{} indices is not a triangle list", index_count)));
        }
        let mut indices = vec![];
        for _ in 0..index_count {
            let index = if header.index_width == 2 {
                payload.read::<u16>("index")? as u32
            } else {
                payload.read::<u32>("index")?
            };
            if index as usize >= vertex_count {
                return Err(invalid(format!(
                    "index {} out of range ({} vertices)",
                    index, vertex_count
                )));
            }
            indices.push(index);
        }

        meshes.push(Mesh {
            name,
            group,
            vertices,
            indices,
            material,
        });
    }

    Ok(meshes)
}

fn read_bounding_box(payload: &mut Payload) -> Result<Option<BoundingBox>, FormatError> {
    let record: BoundingBoxRecord = payload.read("bounding box")?;
    Ok((record.authored != 0).then(|| BoundingBox::new(record.min.0, record.max.0)))
}
