//! In-memory scene that both import and export pivot through.
//!
//! A `Scene` is built fresh for every import/export call and owns everything
//! it references: meshes point at materials by name, bindings point at
//! textures by table index and bone weights point at skeleton bones by index.

use std::collections::BTreeSet;
use std::fmt;

use cgmath::{Matrix4, SquareMatrix, Vector2, Vector3, Vector4};
use serde::{Deserialize, Serialize};

use crate::mesh_processing::bounds::envelope;

pub const ROLE_BASE_COLOR_SRGB: &str = "Base_Tex_SRGB";
pub const ROLE_BASE_COLOR_LINEAR: &str = "Base_Tex_LIN";
pub const ROLE_NORMAL_MAP: &str = "NormalMap_Tex_NRM";

const ROLE_SUFFIX_SRGB: &str = "_Tex_SRGB";
const ROLE_SUFFIX_LINEAR: &str = "_Tex_LIN";
const ROLE_SUFFIX_NORMAL: &str = "_Tex_NRM";

/// Abstract color encoding a texture channel needs, independent of host naming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorspaceIntent {
    Srgb,
    Linear,
    NonColor,
}

/// Functional purpose of a texture inside a material.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TextureRole {
    BaseColorSrgb,
    BaseColorLinear,
    NormalMap,
    /// Any other `<Name>_Tex_<SRGB|LIN|NRM>` token.
    Custom(String),
    Unknown,
}

impl TextureRole {
    /// Parse a role token. Matching is case-sensitive; tokens outside the
    /// vocabulary yield `None`.
    pub fn from_token(token: &str) -> Option<TextureRole> {
        match token {
            ROLE_BASE_COLOR_SRGB => return Some(TextureRole::BaseColorSrgb),
            ROLE_BASE_COLOR_LINEAR => return Some(TextureRole::BaseColorLinear),
            ROLE_NORMAL_MAP => return Some(TextureRole::NormalMap),
            _ => {}
        }

        let stem = [ROLE_SUFFIX_SRGB, ROLE_SUFFIX_LINEAR, ROLE_SUFFIX_NORMAL]
            .iter()
            .find_map(|suffix| token.strip_suffix(suffix))?;
        if !stem.is_empty() && stem.chars().all(|c| c.is_ascii_alphanumeric()) {
            Some(TextureRole::Custom(token.to_string()))
        } else {
            None
        }
    }

    pub fn token(&self) -> Option<&str> {
        match self {
            TextureRole::BaseColorSrgb => Some(ROLE_BASE_COLOR_SRGB),
            TextureRole::BaseColorLinear => Some(ROLE_BASE_COLOR_LINEAR),
            TextureRole::NormalMap => Some(ROLE_NORMAL_MAP),
            TextureRole::Custom(token) => Some(token),
            TextureRole::Unknown => None,
        }
    }

    pub fn is_base_color(&self) -> bool {
        matches!(self, TextureRole::BaseColorSrgb | TextureRole::BaseColorLinear)
    }

    pub fn is_normal_map(&self) -> bool {
        matches!(self, TextureRole::NormalMap)
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, TextureRole::Unknown)
    }

    /// Colorspace required by the role, derived from its token suffix.
    pub fn colorspace_intent(&self) -> ColorspaceIntent {
        match self.token() {
            Some(token) if token.ends_with("_SRGB") => ColorspaceIntent::Srgb,
            Some(token) if token.ends_with("_LIN") => ColorspaceIntent::Linear,
            _ => ColorspaceIntent::NonColor,
        }
    }
}

impl fmt::Display for TextureRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token().unwrap_or("unknown"))
    }
}

/// Axis-aligned box given by its min and max corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Vector3<f32>,
    pub max: Vector3<f32>,
}

impl BoundingBox {
    pub fn new(min: Vector3<f32>, max: Vector3<f32>) -> Self {
        Self { min, max }
    }

    pub fn zero() -> Self {
        Self {
            min: Vector3::new(0.0, 0.0, 0.0),
            max: Vector3::new(0.0, 0.0, 0.0),
        }
    }

    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min: Vector3::new(
                self.min.x.min(other.min.x),
                self.min.y.min(other.min.y),
                self.min.z.min(other.min.z),
            ),
            max: Vector3::new(
                self.max.x.max(other.max.x),
                self.max.y.max(other.max.y),
                self.max.z.max(other.max.z),
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoneWeight {
    /// Index into the scene skeleton.
    pub bone: usize,
    pub weight: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    pub position: Vector3<f32>,
    pub normal: Vector3<f32>,
    /// xyz along +U in the surface plane, w the bitangent sign.
    pub tangent: Option<Vector4<f32>>,
    /// Linear RGBA.
    pub color: Option<[f32; 4]>,
    pub uvs: Vec<Vector2<f32>>,
    pub weights: Vec<BoneWeight>,
}

impl Vertex {
    pub fn at(position: Vector3<f32>) -> Self {
        Self {
            position,
            normal: Vector3::new(0.0, 1.0, 0.0),
            tangent: None,
            color: None,
            uvs: vec![],
            weights: vec![],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub name: String,
    /// Logical mesh this part belongs to; set on split parts.
    pub group: Option<String>,
    pub vertices: Vec<Vertex>,
    /// Triangle list.
    pub indices: Vec<u32>,
    /// Name of the material in the owning scene.
    pub material: String,
}

impl Mesh {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn uv_set_count(&self) -> usize {
        self.vertices.first().map(|v| v.uvs.len()).unwrap_or(0)
    }

    pub fn has_colors(&self) -> bool {
        self.vertices.first().is_some_and(|v| v.color.is_some())
    }

    pub fn has_tangents(&self) -> bool {
        self.vertices.first().is_some_and(|v| v.tangent.is_some())
    }

    /// Sorted, distinct skeleton indices referenced by vertex weights.
    pub fn bone_group(&self) -> Vec<usize> {
        let bones: BTreeSet<usize> = self
            .vertices
            .iter()
            .flat_map(|v| v.weights.iter().map(|w| w.bone))
            .collect();
        bones.into_iter().collect()
    }

    pub fn is_skinned(&self) -> bool {
        self.vertices.iter().any(|v| !v.weights.is_empty())
    }

    pub fn exceeds_limit(&self, limit: usize) -> bool {
        self.vertices.len() > limit || self.indices.len() > limit
    }

    /// Envelope of the vertex positions, `None` for an empty mesh.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        envelope(self.vertices.iter().map(|v| v.position))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MaterialParameter {
    pub name: String,
    pub values: [f32; 4],
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextureBinding {
    pub role: TextureRole,
    /// Index into `Scene::textures`.
    pub texture: usize,
    /// Filled in by the colorspace matcher; never persisted in the container.
    pub colorspace: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub shader: String,
    pub technique: String,
    pub parameters: Vec<MaterialParameter>,
    pub bindings: Vec<TextureBinding>,
    pub alpha_flags: u8,
    pub shadow_flags: u8,
    pub anti_blur: bool,
}

impl Material {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shader: String::new(),
            technique: String::new(),
            parameters: vec![],
            bindings: vec![],
            alpha_flags: 0,
            shadow_flags: 0,
            anti_blur: false,
        }
    }

    pub fn has_base_color(&self) -> bool {
        self.bindings.iter().any(|b| b.role.is_base_color())
    }

    pub fn has_normal_map(&self) -> bool {
        self.bindings.iter().any(|b| b.role.is_normal_map())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    pub directory: String,
    pub filename: String,
    /// Role token declared for this texture by a previous round-trip.
    pub role_hint: Option<String>,
}

impl Texture {
    pub fn new(directory: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            filename: filename.into(),
            role_hint: None,
        }
    }

    /// Display name in the `[role] filename` convention.
    pub fn display_name(&self, role: &TextureRole) -> String {
        match role.token() {
            Some(token) => format!("[{}] {}", token, self.filename),
            None => self.filename.clone(),
        }
    }

    pub fn path(&self) -> String {
        format!("{}{}", self.directory, self.filename)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bone {
    pub name: String,
    pub parent: Option<usize>,
    pub bind_transform: Matrix4<f32>,
    /// Envelope of the vertices weighted to this bone.
    pub bounds: BoundingBox,
}

impl Bone {
    pub fn new(name: impl Into<String>, parent: Option<usize>) -> Self {
        Self {
            name: name.into(),
            parent,
            bind_transform: Matrix4::identity(),
            bounds: BoundingBox::zero(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Skeleton {
    pub bones: Vec<Bone>,
}

impl Skeleton {
    /// Returns the index of a bone that takes part in a parent cycle, if any.
    /// Each bone is walked once; a parent index past the table ends a walk.
    pub fn find_cycle(&self) -> Option<usize> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Unseen,
            OnWalk,
            Rooted,
        }

        let mut marks = vec![Mark::Unseen; self.bones.len()];
        let mut walk = vec![];
        for start in 0..self.bones.len() {
            let mut current = Some(start);
            while let Some(bone) = current {
                match marks[bone] {
                    Mark::OnWalk => return Some(bone),
                    Mark::Rooted => break,
                    Mark::Unseen => {}
                }
                marks[bone] = Mark::OnWalk;
                walk.push(bone);
                current = self.bones[bone].parent.filter(|&p| p < self.bones.len());
            }
            for bone in walk.drain(..) {
                marks[bone] = Mark::Rooted;
            }
        }
        None
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Scene {
    pub meshes: Vec<Mesh>,
    pub materials: Vec<Material>,
    pub textures: Vec<Texture>,
    pub skeleton: Option<Skeleton>,
    /// Authored box; `None` means the envelope is computed on demand.
    pub bounding_box: Option<BoundingBox>,
}

impl Scene {
    pub fn material(&self, name: &str) -> Option<&Material> {
        self.materials.iter().find(|m| m.name == name)
    }

    pub fn material_index(&self, name: &str) -> Option<usize> {
        self.materials.iter().position(|m| m.name == name)
    }

    pub fn bone_count(&self) -> usize {
        self.skeleton.as_ref().map(|s| s.bones.len()).unwrap_or(0)
    }

    /// Authored bounding box, or the envelope of every mesh vertex.
    pub fn bounding_box(&self) -> BoundingBox {
        if let Some(authored) = self.bounding_box {
            return authored;
        }
        envelope(
            self.meshes
                .iter()
                .flat_map(|m| m.vertices.iter().map(|v| v.position)),
        )
        .unwrap_or_else(BoundingBox::zero)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fixed_role_vocabulary() {
        assert_eq!(TextureRole::from_token("Base_Tex_SRGB"), Some(TextureRole::BaseColorSrgb));
        assert_eq!(TextureRole::from_token("Base_Tex_LIN"), Some(TextureRole::BaseColorLinear));
        assert_eq!(TextureRole::from_token("NormalMap_Tex_NRM"), Some(TextureRole::NormalMap));
    }

    #[test]
    fn accepts_custom_roles_and_rejects_noise() {
        assert_eq!(
            TextureRole::from_token("SpecularMap_Tex_LIN"),
            Some(TextureRole::Custom("SpecularMap_Tex_LIN".to_string()))
        );
        assert_eq!(TextureRole::from_token("normalmap_tex_nrm"), None);
        assert_eq!(TextureRole::from_token("_Tex_SRGB"), None);
        assert_eq!(TextureRole::from_token("Diffuse Map"), None);
    }

    #[test]
    fn role_suffix_drives_colorspace_intent() {
        assert_eq!(TextureRole::BaseColorSrgb.colorspace_intent(), ColorspaceIntent::Srgb);
        assert_eq!(TextureRole::BaseColorLinear.colorspace_intent(), ColorspaceIntent::Linear);
        assert_eq!(TextureRole::NormalMap.colorspace_intent(), ColorspaceIntent::NonColor);
        assert_eq!(
            TextureRole::Custom("GlassReflection_Tex_SRGB".into()).colorspace_intent(),
            ColorspaceIntent::Srgb
        );
        assert_eq!(TextureRole::Unknown.colorspace_intent(), ColorspaceIntent::NonColor);
    }

    #[test]
    fn computed_bounding_box_spans_all_meshes() {
        let mesh = |name: &str, a: [f32; 3], b: [f32; 3]| Mesh {
            name: name.into(),
            group: None,
            vertices: vec![
                Vertex::at(Vector3::new(a[0], a[1], a[2])),
                Vertex::at(Vector3::new(b[0], b[1], b[2])),
                Vertex::at(Vector3::new(a[0], b[1], a[2])),
            ],
            indices: vec![0, 1, 2],
            material: "m".into(),
        };
        let scene = Scene {
            meshes: vec![
                mesh("a", [0.0, 0.0, 0.0], [1.0, 1.0, 1.0]),
                mesh("b", [-2.0, 0.5, 0.0], [0.0, 3.0, 0.5]),
            ],
            ..Default::default()
        };
        let bb = scene.bounding_box();
        assert_eq!(bb.min, Vector3::new(-2.0, 0.0, 0.0));
        assert_eq!(bb.max, Vector3::new(1.0, 3.0, 1.0));
    }

    #[test]
    fn detects_parent_cycles() {
        let mut skeleton = Skeleton {
            bones: vec![Bone::new("root", None), Bone::new("a", Some(2)), Bone::new("b", Some(1))],
        };
        assert!(skeleton.find_cycle().is_some());
        skeleton.bones[1].parent = Some(0);
        assert_eq!(skeleton.find_cycle(), None);
    }

    #[test]
    fn cycle_behind_a_long_chain_is_found() {
        let count: usize = 65_535;
        let mut bones: Vec<Bone> = (0..count)
            .map(|i| Bone::new(format!("b{}", i), i.checked_sub(1)))
            .collect();
        let mut skeleton = Skeleton { bones: bones.clone() };
        assert_eq!(skeleton.find_cycle(), None);

        bones[0].parent = Some(count - 1);
        skeleton.bones = bones;
        assert!(skeleton.find_cycle().is_some());
    }

    #[test]
    fn out_of_table_parent_is_not_a_cycle() {
        let skeleton = Skeleton {
            bones: vec![Bone::new("a", Some(7)), Bone::new("b", Some(0))],
        };
        assert_eq!(skeleton.find_cycle(), None);
    }
}
