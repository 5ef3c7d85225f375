//! Mesh splitting for the per-part vertex/index limit.
//!
//! Triangles are grouped greedily in their original order. A part grows one
//! triangle at a time; when the next triangle would push the part's unique
//! vertex count or its index count over the limit, the part is closed and a
//! new one starts with that triangle. Vertices shared by triangles that land
//! in different parts are duplicated into each part.

use std::collections::HashMap;

use crate::scene::Mesh;
use crate::validation::limits::MIN_MESH_LIMIT;

/// Split `mesh` into parts that each hold at most `limit` vertices and
/// `limit` indices. A mesh that already fits is returned unchanged as a
/// single part.
///
/// Parts are named `{mesh}_part{n}` and grouped under the mesh's own group,
/// or under the mesh name when it has none. An over-limit mesh without
/// triangles yields no parts.
pub fn split_mesh(mesh: &Mesh, limit: usize) -> Vec<Mesh> {
    let limit = limit.max(MIN_MESH_LIMIT);
    if !mesh.exceeds_limit(limit) {
        return vec![mesh.clone()];
    }

    let group = mesh.group.clone().unwrap_or_else(|| mesh.name.clone());
    let mut parts = vec![];
    let mut builder = PartBuilder::default();

    for triangle in mesh.indices.chunks_exact(3) {
        if !builder.is_empty() && !builder.fits(triangle, limit) {
            parts.push(builder.finish(mesh, &group, parts.len()));
            builder = PartBuilder::default();
        }
        builder.push(triangle);
    }
    if !builder.is_empty() {
        parts.push(builder.finish(mesh, &group, parts.len()));
    }

    log::debug!(
        "split mesh '{}' ({} vertices, {} indices) into {} parts",
        mesh.name,
        mesh.vertices.len(),
        mesh.indices.len(),
        parts.len()
    );
    parts
}

#[derive(Default)]
struct PartBuilder {
    /// Source vertex index to part-local index.
    remap: HashMap<u32, u32>,
    order: Vec<u32>,
    indices: Vec<u32>,
}

impl PartBuilder {
    fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    fn fits(&self, triangle: &[u32], limit: usize) -> bool {
        let mut new_vertices = 0;
        for (i, index) in triangle.iter().enumerate() {
            let repeated = triangle[..i].contains(index);
            if !repeated && !self.remap.contains_key(index) {
                new_vertices += 1;
            }
        }
        self.order.len() + new_vertices <= limit && self.indices.len() + triangle.len() <= limit
    }

    fn push(&mut self, triangle: &[u32]) {
        for &index in triangle {
            let next = self.order.len() as u32;
            let local = *self.remap.entry(index).or_insert(next);
            if local == next {
                self.order.push(index);
            }
            self.indices.push(local);
        }
    }

    fn finish(self, mesh: &Mesh, group: &str, n: usize) -> Mesh {
        Mesh {
            name: format!("{}_part{}", mesh.name, n),
            group: Some(group.to_string()),
            vertices: self
                .order
                .iter()
                .map(|&i| mesh.vertices[i as usize].clone())
                .collect(),
            indices: self.indices,
            material: mesh.material.clone(),
        }
    }
}

/// Source mesh name of a part name `{source}_part{n}`.
pub fn split_source(name: &str) -> Option<&str> {
    let (source, n) = name.rsplit_once("_part")?;
    if source.is_empty() || n.is_empty() || !n.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(source)
}

/// Whether `mesh` looks like a part produced by [`split_mesh`].
pub fn is_split_part(mesh: &Mesh) -> bool {
    mesh.group.is_some() && split_source(&mesh.name).is_some()
}

/// Concatenate parts into one mesh named after their source mesh. The
/// source's group is restored unless it was only the source name itself.
pub fn merge_meshes(parts: &[Mesh]) -> Option<Mesh> {
    let first = parts.first()?;
    let name = split_source(&first.name).unwrap_or(&first.name).to_string();
    let group = first.group.clone().filter(|g| *g != name);

    let mut merged = Mesh {
        name,
        group,
        vertices: vec![],
        indices: vec![],
        material: first.material.clone(),
    };
    for part in parts {
        let offset = merged.vertices.len() as u32;
        merged.vertices.extend(part.vertices.iter().cloned());
        merged.indices.extend(part.indices.iter().map(|i| i + offset));
    }
    Some(merged)
}

/// Recombine consecutive split parts of the same source mesh back into one
/// mesh each. Other meshes pass through untouched.
pub fn recombine_parts(meshes: &[Mesh]) -> Vec<Mesh> {
    let mut out: Vec<Mesh> = vec![];
    let mut run: Vec<Mesh> = vec![];

    let flush = |run: &mut Vec<Mesh>, out: &mut Vec<Mesh>| {
        if let Some(merged) = merge_meshes(run) {
            out.push(merged);
        }
        run.clear();
    };

    for mesh in meshes {
        if !is_split_part(mesh) {
            flush(&mut run, &mut out);
            out.push(mesh.clone());
            continue;
        }
        let continues = run
            .last()
            .map(|prev| {
                split_source(&prev.name) == split_source(&mesh.name)
                    && prev.group == mesh.group
                    && prev.material == mesh.material
            })
            .unwrap_or(true);
        if !continues {
            flush(&mut run, &mut out);
        }
        run.push(mesh.clone());
    }
    flush(&mut run, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{BoneWeight, Vertex};
    use cgmath::{Vector2, Vector3};

    /// A strip of `quads` quads: 2 * (quads + 1) vertices, 2 * quads triangles.
    fn strip(quads: usize) -> Mesh {
        let mut vertices = vec![];
        for i in 0..=quads {
            for y in 0..2 {
                let mut v = Vertex::at(Vector3::new(i as f32, y as f32, 0.0));
                v.uvs.push(Vector2::new(i as f32 / quads as f32, y as f32));
                v.weights.push(BoneWeight { bone: i % 3, weight: 1.0 });
                vertices.push(v);
            }
        }
        let mut indices = vec![];
        for i in 0..quads as u32 {
            let a = i * 2;
            indices.extend_from_slice(&[a, a + 2, a + 1, a + 1, a + 2, a + 3]);
        }
        Mesh {
            name: "strip".into(),
            group: None,
            vertices,
            indices,
            material: "mat".into(),
        }
    }

    fn triangle_positions(mesh: &Mesh) -> Vec<[[u32; 3]; 3]> {
        mesh.indices
            .chunks_exact(3)
            .map(|t| {
                let p = |i: u32| {
                    let v = mesh.vertices[i as usize].position;
                    [v.x.to_bits(), v.y.to_bits(), v.z.to_bits()]
                };
                [p(t[0]), p(t[1]), p(t[2])]
            })
            .collect()
    }

    #[test]
    fn compliant_mesh_is_returned_unchanged() {
        let mesh = strip(4);
        let parts = split_mesh(&mesh, 100);
        assert_eq!(parts, vec![mesh]);
    }

    #[test]
    fn parts_respect_limit_and_keep_triangles() {
        let mesh = strip(50);
        let parts = split_mesh(&mesh, 30);
        assert!(parts.len() >= 2);

        let mut all = vec![];
        for part in &parts {
            assert!(part.vertices.len() <= 30);
            assert!(part.indices.len() <= 30);
            assert_eq!(part.indices.len() % 3, 0);
            assert!(part.indices.iter().all(|&i| (i as usize) < part.vertices.len()));
            assert_eq!(part.material, "mat");
            assert_eq!(part.group.as_deref(), Some("strip"));
            all.extend(triangle_positions(part));
        }
        assert_eq!(all, triangle_positions(&mesh));
    }

    #[test]
    fn split_is_idempotent_on_parts() {
        for part in split_mesh(&strip(50), 30) {
            assert_eq!(split_mesh(&part, 30), vec![part.clone()]);
        }
    }

    #[test]
    fn limit_below_three_is_raised() {
        let parts = split_mesh(&strip(2), 1);
        assert_eq!(parts.len(), 4);
        assert!(parts.iter().all(|p| p.vertices.len() == 3));
    }

    #[test]
    fn boundary_vertices_carry_attributes() {
        let mesh = strip(20);
        for part in split_mesh(&mesh, 12) {
            for v in &part.vertices {
                let original = mesh
                    .vertices
                    .iter()
                    .find(|o| o.position == v.position)
                    .unwrap();
                assert_eq!(original, v);
            }
        }
    }

    #[test]
    fn recombine_merges_parts_back() {
        let mesh = strip(50);
        let mut meshes = split_mesh(&mesh, 30);
        let mut other = strip(1);
        other.name = "other".into();
        meshes.push(other.clone());

        let recombined = recombine_parts(&meshes);
        assert_eq!(recombined.len(), 2);
        assert_eq!(recombined[0].name, "strip");
        assert_eq!(recombined[0].group, None);
        assert_eq!(triangle_positions(&recombined[0]), triangle_positions(&mesh));
        assert_eq!(recombined[1], other);
    }

    #[test]
    fn split_part_names() {
        let parts = split_mesh(&strip(50), 30);
        assert_eq!(parts[0].name, "strip_part0");
        assert!(is_split_part(&parts[1]));
        assert!(!is_split_part(&strip(1)));
        assert_eq!(split_source("lod_part_part12"), Some("lod_part"));
        assert_eq!(split_source("strip_partA"), None);
        assert_eq!(split_source("_part0"), None);
    }

    #[test]
    fn meshes_sharing_a_group_keep_their_identity() {
        let mut body_a = strip(5);
        body_a.name = "body_a".into();
        body_a.group = Some("body".into());
        let mut body_b = body_a.clone();
        body_b.name = "body_b".into();

        let mut parts = split_mesh(&body_a, 9);
        parts.extend(split_mesh(&body_b, 9));
        let names: Vec<&str> = parts.iter().map(|p| p.name.as_str()).collect();
        println!("Parts: {:?}", names);
        assert!(names.contains(&"body_a_part0"));
        assert!(names.contains(&"body_b_part0"));
        assert!(parts.iter().all(|p| p.group.as_deref() == Some("body")));

        let recombined = recombine_parts(&parts);
        assert_eq!(recombined.len(), 2);
        assert_eq!(recombined[0].name, "body_a");
        assert_eq!(recombined[1].name, "body_b");
        assert_eq!(recombined[0].group.as_deref(), Some("body"));
        assert_eq!(triangle_positions(&recombined[1]), triangle_positions(&body_b));
    }

    #[test]
    fn over_limit_mesh_without_triangles_yields_no_parts() {
        let mut mesh = strip(10);
        mesh.indices.clear();
        assert!(split_mesh(&mesh, 9).is_empty());
    }
}
