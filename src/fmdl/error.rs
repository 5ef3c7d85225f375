//! Fatal codec errors.

use thiserror::Error;

use super::chunk::FourCC;

/// Malformed or unsupported container bytes. Aborts the whole decode.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("not an FMDL container: leading tag is {found}")]
    BadMagic { found: FourCC },

    #[error("unsupported FMDL version {found:#010x} (expected {expected:#010x})")]
    UnsupportedVersion { found: u32, expected: u32 },

    /// Chunks must appear in canonical order.
    #[error("expected chunk {expected}, found {found}")]
    UnexpectedChunk { expected: FourCC, found: FourCC },

    #[error("chunk {chunk} declares {declared} bytes but only {remaining} remain")]
    ChunkOverrun {
        chunk: FourCC,
        declared: u32,
        remaining: usize,
    },

    #[error("chunk {chunk} truncated while reading {context}")]
    Truncated { chunk: FourCC, context: String },

    #[error("chunk {chunk} has {unread} bytes left after its last record")]
    ChunkLengthMismatch { chunk: FourCC, unread: usize },

    #[error("{0} trailing bytes after the last chunk")]
    TrailingData(usize),

    #[error("chunk {chunk}: {table} index {index} out of range ({count} entries)")]
    IndexOutOfRange {
        chunk: FourCC,
        table: &'static str,
        index: usize,
        count: usize,
    },

    #[error("string {index} is not valid UTF-8")]
    InvalidUtf8 { index: usize },

    #[error("string table must start with the empty string")]
    MissingEmptyString,

    #[error("mesh '{mesh}': {message}")]
    InvalidMesh { mesh: String, message: String },

    #[error("bone '{bone}' is part of a parent cycle")]
    BoneCycle { bone: String },

    #[error("duplicate material name '{0}'")]
    DuplicateMaterial(String),
}

/// A scene value the container cannot represent. Raised before any byte is
/// returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("string of {len} bytes exceeds the {max} byte limit: '{preview}...'")]
    StringTooLong {
        preview: String,
        len: usize,
        max: usize,
    },

    #[error("{table} table has {count} entries (max {max})")]
    TableTooLarge {
        table: &'static str,
        count: usize,
        max: usize,
    },

    #[error("chunk {chunk} payload of {len} bytes does not fit a u32 length")]
    ChunkTooLarge { chunk: FourCC, len: usize },

    #[error("mesh '{mesh}' has no material")]
    MissingMaterial { mesh: String },

    #[error("mesh '{mesh}' references unknown material '{material}'")]
    UnknownMaterial { mesh: String, material: String },

    #[error("mesh '{mesh}' references {count} bones (max {max})")]
    BoneGroupTooLarge {
        mesh: String,
        count: usize,
        max: usize,
    },

    #[error("mesh '{mesh}' vertex {vertex} has {count} weights (max {max})")]
    TooManyWeights {
        mesh: String,
        vertex: usize,
        count: usize,
        max: usize,
    },

    #[error("mesh '{mesh}' has {count} UV sets (max {max})")]
    TooManyUvSets {
        mesh: String,
        count: usize,
        max: usize,
    },

    #[error("mesh '{mesh}' vertex {vertex} has {found} UV sets, expected {expected}")]
    InconsistentUvSets {
        mesh: String,
        vertex: usize,
        expected: usize,
        found: usize,
    },

    #[error("mesh '{mesh}' vertex {vertex} {presence} a {attribute} unlike vertex 0")]
    InconsistentVertexAttributes {
        mesh: String,
        vertex: usize,
        attribute: &'static str,
        presence: &'static str,
    },

    #[error("mesh '{mesh}' has {count} vertices, more than a u32 index can address")]
    TooManyVertices { mesh: String, count: usize },

    #[error("mesh '{mesh}' index {index} is out of range ({vertex_count} vertices)")]
    IndexOutOfRange {
        mesh: String,
        index: u32,
        vertex_count: usize,
    },

    #[error("mesh '{mesh}' has {index_count} indices, not a whole number of triangles")]
    IncompleteTriangle { mesh: String, index_count: usize },

    #[error("{context} references bone {bone}, but the skeleton has {count}")]
    BoneOutOfRange {
        context: String,
        bone: usize,
        count: usize,
    },

    #[error("bone '{bone}' is part of a parent cycle")]
    BoneCycle { bone: String },

    #[error("material '{material}' binds texture {texture}, but there are {count}")]
    TextureOutOfRange {
        material: String,
        texture: usize,
        count: usize,
    },

    #[error("duplicate material name '{0}'")]
    DuplicateMaterial(String),

    #[error("failed to serialize record: {0}")]
    Write(String),
}
