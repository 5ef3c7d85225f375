//! Binary codec for the FMDL model container.

pub mod chunk;
pub mod error;
pub mod reader;
pub mod records;
pub mod strings;
pub mod writer;

pub use error::{EncodeError, FormatError};
pub use reader::decode;
pub use writer::encode;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Bone, BoneWeight, Material, Mesh, Scene, Skeleton, Vertex};
    use cgmath::{Vector2, Vector3, Vector4};

    fn triangle(material: &str) -> Mesh {
        let mut vertices = vec![];
        for p in [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]] {
            let mut v = Vertex::at(Vector3::new(p[0], p[1], p[2]));
            v.uvs.push(Vector2::new(p[0], p[1]));
            vertices.push(v);
        }
        Mesh {
            name: "tri".into(),
            group: None,
            vertices,
            indices: vec![0, 1, 2],
            material: material.into(),
        }
    }

    fn scene_with(mesh: Mesh) -> Scene {
        Scene {
            meshes: vec![mesh],
            materials: vec![Material::new("mat")],
            ..Default::default()
        }
    }

    #[test]
    fn missing_material_is_rejected() {
        let err = encode(&scene_with(triangle(""))).unwrap_err();
        assert_eq!(err, EncodeError::MissingMaterial { mesh: "tri".into() });
    }

    #[test]
    fn index_out_of_range_is_rejected() {
        let mut mesh = triangle("mat");
        mesh.indices[2] = 3;
        assert!(matches!(
            encode(&scene_with(mesh)),
            Err(EncodeError::IndexOutOfRange { index: 3, .. })
        ));
    }

    #[test]
    fn partial_triangle_is_rejected() {
        let mut mesh = triangle("mat");
        mesh.indices.push(0);
        assert!(matches!(
            encode(&scene_with(mesh)),
            Err(EncodeError::IncompleteTriangle { index_count: 4, .. })
        ));
    }

    #[test]
    fn mixed_uv_counts_are_rejected() {
        let mut mesh = triangle("mat");
        mesh.vertices[1].uvs.push(Vector2::new(0.5, 0.5));
        assert!(matches!(
            encode(&scene_with(mesh)),
            Err(EncodeError::InconsistentUvSets { vertex: 1, .. })
        ));
    }

    #[test]
    fn five_weights_are_rejected() {
        let mut mesh = triangle("mat");
        mesh.vertices[0].weights = (0..5).map(|bone| BoneWeight { bone, weight: 0.2 }).collect();
        let mut scene = scene_with(mesh);
        scene.skeleton = Some(Skeleton {
            bones: (0..5).map(|i| Bone::new(format!("b{}", i), None)).collect(),
        });
        assert!(matches!(
            encode(&scene),
            Err(EncodeError::TooManyWeights { count: 5, .. })
        ));
    }

    #[test]
    fn weights_need_a_skeleton() {
        let mut mesh = triangle("mat");
        mesh.vertices[0].weights.push(BoneWeight { bone: 0, weight: 1.0 });
        assert!(matches!(
            encode(&scene_with(mesh)),
            Err(EncodeError::BoneOutOfRange { bone: 0, count: 0, .. })
        ));
    }

    #[test]
    fn bone_cycle_is_rejected() {
        let mut scene = scene_with(triangle("mat"));
        scene.skeleton = Some(Skeleton {
            bones: vec![Bone::new("a", Some(1)), Bone::new("b", Some(0))],
        });
        assert!(matches!(encode(&scene), Err(EncodeError::BoneCycle { .. })));
    }

    #[test]
    fn duplicate_material_names_are_rejected() {
        let mut scene = scene_with(triangle("mat"));
        scene.materials.push(Material::new("mat"));
        assert_eq!(
            encode(&scene).unwrap_err(),
            EncodeError::DuplicateMaterial("mat".into())
        );
    }

    #[test]
    fn minimal_scene_round_trips() {
        let scene = scene_with(triangle("mat"));
        let decoded = decode(&encode(&scene).unwrap()).unwrap();
        assert_eq!(decoded, scene);
    }

    #[test]
    fn colors_and_tangents_round_trip() {
        let mut mesh = triangle("mat");
        for (i, v) in mesh.vertices.iter_mut().enumerate() {
            v.color = Some([i as f32 * 0.5, 0.25, 1.0, 1.0]);
            v.tangent = Some(Vector4::new(1.0, 0.0, 0.0, 1.0));
        }
        let scene = scene_with(mesh);
        let decoded = decode(&encode(&scene).unwrap()).unwrap();
        assert_eq!(decoded.meshes[0].vertices[2].color, Some([1.0, 0.25, 1.0, 1.0]));
        assert!(decoded.meshes[0].has_tangents());
        assert_eq!(decoded, scene);
    }

    #[test]
    fn partial_color_layer_is_rejected() {
        let mut mesh = triangle("mat");
        mesh.vertices[0].color = Some([1.0; 4]);
        mesh.vertices[1].color = Some([1.0; 4]);
        assert_eq!(
            encode(&scene_with(mesh)).unwrap_err(),
            EncodeError::InconsistentVertexAttributes {
                mesh: "tri".into(),
                vertex: 2,
                attribute: "color",
                presence: "lacks",
            }
        );
    }

    #[test]
    fn unknown_vertex_attribute_bits_are_rejected() {
        let mut bytes = encode(&scene_with(triangle("mat"))).unwrap();
        let mesh_chunk = bytes.windows(4).position(|w| w == b"MESH").unwrap();
        // tag, length, mesh count, then name group material uv_sets index_width.
        let attributes = mesh_chunk + 8 + 2 + 8;
        assert_eq!(bytes[attributes], 0);
        bytes[attributes] = 0x80;
        assert!(matches!(decode(&bytes), Err(FormatError::InvalidMesh { .. })));
    }
}
