//! Host Scene Adapter: the narrow interface to the 3D-authoring environment.
//!
//! The core never touches a live host scene. It reads a [`HostScene`]
//! snapshot from the adapter on export and hands a freshly built one back on
//! import. Host data is Z-up and uses host naming (vertex groups, UV layers,
//! shader nodes); the `mapping` module converts between that and the FMDL
//! scene model.

pub mod json;
pub mod memory;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::texture::search::default_search_paths;

pub use json::JsonHost;
pub use memory::MemoryHost;

/// Name of the armature created on import.
pub const ARMATURE_NAME: &str = "Skeleton";

/// Custom-property keys used when a host cannot store typed image properties.
pub const PROP_TEXTURE_ROLE: &str = "fmdl_texture_role";
pub const PROP_TEXTURE_FILENAME: &str = "fmdl_texture_filename";
pub const PROP_TEXTURE_DIRECTORY: &str = "fmdl_texture_directory";

pub trait HostSceneAdapter {
    /// Snapshot of the host scene to export.
    fn read_host_scene(&self) -> anyhow::Result<HostScene>;

    /// Create host-native objects for an imported scene.
    fn write_host_scene(&mut self, scene: HostScene) -> anyhow::Result<()>;

    /// Colorspace names the host offers. Empty when it cannot enumerate them.
    fn available_colorspaces(&self) -> Vec<String> {
        vec![]
    }

    /// Directories searched for textures referenced by `fmdl_path`.
    fn texture_search_paths(&self, fmdl_path: &Path) -> Vec<PathBuf> {
        default_search_paths(fmdl_path)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostScene {
    pub objects: Vec<HostMeshObject>,
    pub materials: Vec<HostMaterial>,
    pub images: Vec<HostImage>,
    pub armature: Option<HostArmature>,
    pub bounding_box: Option<HostBoundingBox>,
}

impl HostScene {
    pub fn material(&self, name: &str) -> Option<&HostMaterial> {
        self.materials.iter().find(|m| m.name == name)
    }

    pub fn image(&self, name: &str) -> Option<&HostImage> {
        self.images.iter().find(|i| i.name == name)
    }
}

/// Per-vertex UV coordinates of one layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostUvLayer {
    pub name: String,
    pub coords: Vec<[f32; 2]>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostVertexGroup {
    /// Bone name.
    pub name: String,
    /// `(vertex index, weight)` pairs.
    pub weights: Vec<(u32, f32)>,
}

/// Color of vertices missing from a partial color layer.
pub const DEFAULT_VERTEX_COLOR: [f32; 4] = [1.0; 4];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostMeshObject {
    pub name: String,
    /// Z-up positions.
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uv_layers: Vec<HostUvLayer>,
    /// RGBA color layer, one entry per vertex; empty when the object has none.
    pub colors: Vec<[f32; 4]>,
    pub vertex_groups: Vec<HostVertexGroup>,
    pub triangles: Vec<[u32; 3]>,
    pub material: Option<String>,
    /// Logical mesh this object was split from.
    pub parent_group: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShaderNodeKind {
    PrincipledBsdf,
    MaterialOutput,
    ImageTexture,
    NormalMap,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShaderNode {
    pub name: String,
    pub kind: ShaderNodeKind,
    #[serde(default)]
    pub label: String,
    /// Image shown by an image-texture node.
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub colorspace: Option<String>,
    /// UV layer sampled by an image-texture node.
    #[serde(default)]
    pub uv_map: Option<String>,
}

impl ShaderNode {
    pub fn new(name: impl Into<String>, kind: ShaderNodeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            label: String::new(),
            image: None,
            colorspace: None,
            uv_map: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShaderLink {
    pub from_node: String,
    pub from_socket: String,
    pub to_node: String,
    pub to_socket: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShaderGraph {
    pub nodes: Vec<ShaderNode>,
    pub links: Vec<ShaderLink>,
}

impl ShaderGraph {
    pub fn node(&self, name: &str) -> Option<&ShaderNode> {
        self.nodes.iter().find(|n| n.name == name)
    }

    /// Add a node, suffixing its name `.001`, `.002`, ... when taken.
    pub fn add_node(&mut self, mut node: ShaderNode) -> String {
        let base = node.name.clone();
        let mut n = 0;
        while self.node(&node.name).is_some() {
            n += 1;
            node.name = format!("{}.{:03}", base, n);
        }
        let name = node.name.clone();
        self.nodes.push(node);
        name
    }

    pub fn link(&mut self, from_node: &str, from_socket: &str, to_node: &str, to_socket: &str) {
        self.links.push(ShaderLink {
            from_node: from_node.to_string(),
            from_socket: from_socket.to_string(),
            to_node: to_node.to_string(),
            to_socket: to_socket.to_string(),
        });
    }

    /// Whether anything feeds `socket` of node `to_node`.
    pub fn is_linked(&self, to_node: &str, socket: &str) -> bool {
        self.links
            .iter()
            .any(|l| l.to_node == to_node && l.to_socket == socket)
    }

    pub fn image_nodes(&self) -> impl Iterator<Item = &ShaderNode> {
        self.nodes
            .iter()
            .filter(|n| n.kind == ShaderNodeKind::ImageTexture)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostMaterialParameter {
    pub name: String,
    pub values: [f32; 4],
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostMaterial {
    pub name: String,
    pub shader: String,
    pub technique: String,
    pub parameters: Vec<HostMaterialParameter>,
    pub alpha_flags: u8,
    pub shadow_flags: u8,
    pub anti_blur: bool,
    pub graph: ShaderGraph,
}

/// Typed image properties written by a previous import.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextureProperties {
    pub texture_role: Option<String>,
    pub texture_filename: Option<String>,
    pub texture_directory: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostImage {
    /// Display name, `[role] filename` when the role is known.
    pub name: String,
    /// File on disk, or the declared engine path when none was found.
    pub filepath: String,
    pub colorspace: Option<String>,
    pub properties: TextureProperties,
    pub custom_properties: BTreeMap<String, String>,
    pub size: Option<(u32, u32)>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostBone {
    pub name: String,
    pub parent: Option<String>,
    pub head: [f32; 3],
    pub tail: [f32; 3],
    /// Column-major bind matrix in host space.
    pub matrix: [f32; 16],
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostArmature {
    pub name: String,
    pub bones: Vec<HostBone>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HostBoundingBox {
    pub min: [f32; 3],
    pub max: [f32; 3],
}
