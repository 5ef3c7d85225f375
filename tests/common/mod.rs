// Common test utilities and scene builders
#![allow(dead_code)]

use cgmath::{Matrix4, Vector2, Vector3};
use fmdl_tools_lib::scene::{
    Bone, BoneWeight, BoundingBox, Material, MaterialParameter, Mesh, Scene, Skeleton, Texture,
    TextureBinding, TextureRole, Vertex,
};

pub fn push_u8(buf: &mut Vec<u8>, v: u8) {
    buf.push(v);
}

pub fn push_u16(buf: &mut Vec<u8>, v: u16) {
    buf.extend_from_slice(&v.to_le_bytes());
}

pub fn push_u32(buf: &mut Vec<u8>, v: u32) {
    buf.extend_from_slice(&v.to_le_bytes());
}

pub fn push_f32(buf: &mut Vec<u8>, v: f32) {
    buf.extend_from_slice(&v.to_le_bytes());
}

pub fn push_chunk(buf: &mut Vec<u8>, tag: &[u8; 4], payload: &[u8]) {
    buf.extend_from_slice(tag);
    push_u32(buf, payload.len() as u32);
    buf.extend_from_slice(payload);
}

/// Split a container into `(tag, payload)` pairs without interpreting it.
pub fn split_chunks(bytes: &[u8]) -> Vec<([u8; 4], Vec<u8>)> {
    let mut chunks = vec![];
    let mut offset = 0;
    while offset + 8 <= bytes.len() {
        let mut tag = [0u8; 4];
        tag.copy_from_slice(&bytes[offset..offset + 4]);
        let len = u32::from_le_bytes([
            bytes[offset + 4],
            bytes[offset + 5],
            bytes[offset + 6],
            bytes[offset + 7],
        ]) as usize;
        chunks.push((tag, bytes[offset + 8..offset + 8 + len].to_vec()));
        offset += 8 + len;
    }
    chunks
}

pub fn join_chunks(chunks: &[([u8; 4], Vec<u8>)]) -> Vec<u8> {
    let mut out = vec![];
    for (tag, payload) in chunks {
        push_chunk(&mut out, tag, payload);
    }
    out
}

pub fn vertex(position: [f32; 3], uv: [f32; 2]) -> Vertex {
    let mut v = Vertex::at(Vector3::new(position[0], position[1], position[2]));
    v.uvs.push(Vector2::new(uv[0], uv[1]));
    v
}

/// Flat grid of `columns × rows` vertices in the XZ plane, two triangles
/// per cell.
pub fn grid_mesh(name: &str, material: &str, columns: u32, rows: u32) -> Mesh {
    let mut vertices = Vec::with_capacity((columns * rows) as usize);
    for row in 0..rows {
        for column in 0..columns {
            vertices.push(vertex(
                [column as f32 * 0.01, 0.0, row as f32 * 0.01],
                [column as f32 / columns as f32, row as f32 / rows as f32],
            ));
        }
    }

    let mut indices = vec![];
    for row in 0..rows - 1 {
        for column in 0..columns - 1 {
            let a = row * columns + column;
            let b = a + 1;
            let c = a + columns;
            let d = c + 1;
            indices.extend_from_slice(&[a, c, b, b, c, d]);
        }
    }

    Mesh {
        name: name.to_string(),
        group: None,
        vertices,
        indices,
        material: material.to_string(),
    }
}

fn binding(role: TextureRole, texture: usize) -> TextureBinding {
    TextureBinding {
        role,
        texture,
        colorspace: None,
    }
}

/// A small character: three-bone skeleton, skinned body with two UV sets,
/// an unskinned prop split into a named group, two materials.
pub fn sample_scene() -> Scene {
    let mut root = Bone::new("sk_root", None);
    root.bind_transform = Matrix4::from_translation(Vector3::new(0.0, 1.0, 0.0));
    let mut spine = Bone::new("sk_spine", Some(0));
    spine.bind_transform = Matrix4::from_translation(Vector3::new(0.0, 1.5, 0.1));
    spine.bounds = BoundingBox::new(Vector3::new(-0.5, 1.0, -0.2), Vector3::new(0.5, 2.0, 0.2));
    let head = Bone::new("sk_head", Some(1));

    let mut body = grid_mesh("body", "skin", 4, 4);
    for (i, v) in body.vertices.iter_mut().enumerate() {
        v.uvs.push(Vector2::new(0.5, 0.25));
        v.normal = Vector3::new(0.0, 0.0, 1.0);
        v.weights = vec![
            BoneWeight { bone: i % 3, weight: 0.75 },
            BoneWeight { bone: (i + 1) % 3, weight: 0.25 },
        ];
    }

    let mut prop = grid_mesh("sword_part0", "metal", 3, 2);
    prop.group = Some("sword".to_string());

    let mut skin = Material::new("skin");
    skin.shader = "fox3ddf_blin".into();
    skin.technique = "fox3DDF_Blin".into();
    skin.alpha_flags = 128;
    skin.anti_blur = true;
    skin.parameters.push(MaterialParameter {
        name: "MatParamIndex_0".into(),
        values: [0.0, 1.0, 2.0, 3.0],
    });
    skin.bindings = vec![
        binding(TextureRole::BaseColorSrgb, 0),
        binding(TextureRole::NormalMap, 1),
        binding(TextureRole::Custom("SpecularMap_Tex_LIN".into()), 2),
    ];

    let mut metal = Material::new("metal");
    metal.shader = "fox3ddf_ggx".into();
    metal.technique = "fox3DDF_GGX".into();
    metal.shadow_flags = 5;
    metal.bindings = vec![binding(TextureRole::BaseColorLinear, 3), binding(TextureRole::NormalMap, 1)];

    let mut textures = vec![
        Texture::new("/Assets/pes16/model/character/face/", "face_bsm.dds"),
        Texture::new("/Assets/pes16/model/character/common/sourceimages/", "dummy_nrm.dds"),
        Texture::new("/Assets/pes16/model/character/face/", "face_srm.dds"),
        Texture::new("/Assets/pes16/model/character/prop/", "sword_bsm.dds"),
    ];
    textures[0].role_hint = Some("Base_Tex_SRGB".into());
    textures[1].role_hint = Some("NormalMap_Tex_NRM".into());

    Scene {
        meshes: vec![body, prop],
        materials: vec![skin, metal],
        textures,
        skeleton: Some(Skeleton {
            bones: vec![root, spine, head],
        }),
        bounding_box: Some(BoundingBox::new(
            Vector3::new(-1.0, 0.0, -1.0),
            Vector3::new(1.0, 2.0, 1.0),
        )),
    }
}

/// Bit patterns of every vertex position, `-0.0` folded into `0.0`.
pub fn position_set(meshes: &[Mesh]) -> std::collections::BTreeSet<[u32; 3]> {
    meshes
        .iter()
        .flat_map(|m| m.vertices.iter())
        .map(|v| {
            [
                (v.position.x + 0.0).to_bits(),
                (v.position.y + 0.0).to_bits(),
                (v.position.z + 0.0).to_bits(),
            ]
        })
        .collect()
}
