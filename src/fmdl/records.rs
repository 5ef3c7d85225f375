//! Fixed-size records stored inside the FMDL chunks.
//!
//! Counted sections (string entries, parameter/binding lists, vertices,
//! indices) are walked by the reader and writer; only the fixed parts are
//! described here.

use binrw::binrw;

use crate::math::{FmdlMatrix44, FmdlVector3};

pub const FMDL_VERSION: u32 = 0x0000_0203;

/// Sentinel for "no entry" in u16 index fields.
pub const NO_INDEX: u16 = 0xFFFF;

/// Material flags bit 0.
pub const FLAG_ANTI_BLUR: u8 = 0x01;

/// Mesh attribute bits: which optional per-vertex fields are stored.
pub const VERTEX_COLOR: u8 = 0x01;
pub const VERTEX_TANGENT: u8 = 0x02;

#[binrw]
#[brw(little)]
#[derive(Debug, Clone, Copy)]
pub struct HeaderRecord {
    pub version: u32,
    pub reserved: u32,
}

/// 94 bytes.
#[binrw]
#[brw(little)]
#[derive(Debug, Clone, Copy)]
pub struct BoneRecord {
    pub name: u16,
    pub parent: u16,
    pub bind: FmdlMatrix44,
    pub bounds_min: FmdlVector3,
    pub bounds_max: FmdlVector3,
}

#[binrw]
#[brw(little)]
#[derive(Debug, Clone, Copy)]
pub struct MaterialHeader {
    pub name: u16,
    pub shader: u16,
    pub technique: u16,
    pub alpha_flags: u8,
    pub shadow_flags: u8,
    pub flags: u8,
    pub reserved: u8,
}

#[binrw]
#[brw(little)]
#[derive(Debug, Clone, Copy)]
pub struct ParameterRecord {
    pub name: u16,
    pub values: [f32; 4],
}

#[binrw]
#[brw(little)]
#[derive(Debug, Clone, Copy)]
pub struct BindingRecord {
    /// String index of the role token; 0 (empty) for an unknown role.
    pub role: u16,
    pub texture: u16,
}

#[binrw]
#[brw(little)]
#[derive(Debug, Clone, Copy)]
pub struct TextureRecord {
    pub directory: u16,
    pub filename: u16,
    pub role_hint: u16,
}

#[binrw]
#[brw(little)]
#[derive(Debug, Clone, Copy)]
pub struct MeshHeader {
    pub name: u16,
    pub group: u16,
    pub material: u16,
    pub uv_sets: u8,
    /// Bytes per index, 2 or 4.
    pub index_width: u8,
    pub attributes: u8,
}

#[binrw]
#[brw(little)]
#[derive(Debug, Clone, Copy)]
pub struct VertexAttributes {
    pub position: FmdlVector3,
    pub normal: FmdlVector3,
}

#[binrw]
#[brw(little)]
#[derive(Debug, Clone, Copy)]
pub struct WeightRecord {
    /// Index into the mesh's bone group.
    pub local_bone: u8,
    pub weight: f32,
}

#[binrw]
#[brw(little)]
#[derive(Debug, Clone, Copy)]
pub struct BoundingBoxRecord {
    pub authored: u8,
    pub min: FmdlVector3,
    pub max: FmdlVector3,
}

pub fn optional_index(value: Option<u16>) -> u16 {
    value.unwrap_or(NO_INDEX)
}

pub fn index_or_none(value: u16) -> Option<u16> {
    (value != NO_INDEX).then_some(value)
}
