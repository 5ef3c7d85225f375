/// Format-imposed and engine-recommended limits for FMDL models.

/// Default vertex/index limit per mesh part.
pub const DEFAULT_MESH_LIMIT: usize = 65535;

/// Smallest limit that still fits one triangle.
pub const MIN_MESH_LIMIT: usize = 3;

/// Longest string the string table can hold, in bytes.
pub const MAX_STRING_BYTES: usize = u16::MAX as usize;

/// Maximum entries in any counted table.
pub const MAX_TABLE_ENTRIES: usize = u16::MAX as usize;

/// Local bone indices are stored as u8.
pub const MAX_BONE_GROUP_SIZE: usize = 256;

/// Bones per bone group the engine's skinning shaders accept.
pub const ENGINE_BONE_GROUP_LIMIT: usize = 32;

/// Maximum number of blend weights per vertex.
pub const MAX_BLEND_WEIGHTS: usize = 4;

/// Maximum UV sets per vertex.
pub const MAX_UV_SETS: usize = 4;

/// Maximum texture dimension (width or height).
pub const MAX_TEXTURE_DIMENSION: u32 = 4096;
