use cgmath::{InnerSpace, Vector3, Vector4, Zero};

use crate::scene::Mesh;

/// UV set tangents follow: the normal-map set when present, else the color set.
pub fn tangent_uv_set(mesh: &Mesh) -> Option<usize> {
    match mesh.uv_set_count() {
        0 => None,
        1 => Some(0),
        _ => Some(1),
    }
}

/// Fill in a per-vertex tangent for every vertex of `mesh`.
///
/// Face tangents (the direction of increasing U) are summed over the
/// triangles sharing a vertex, made orthogonal to the vertex normal and
/// normalized. Vertices with no usable UV gradient get an arbitrary tangent
/// perpendicular to their normal. `w` is always 1.0.
pub fn compute_tangents(mesh: &mut Mesh) {
    let mut sums = vec![Vector3::<f32>::zero(); mesh.vertices.len()];

    if let Some(set) = tangent_uv_set(mesh) {
        for triangle in mesh.indices.chunks_exact(3) {
            let corners = [triangle[0] as usize, triangle[1] as usize, triangle[2] as usize];
            let (Some(a), Some(b), Some(c)) = (
                mesh.vertices.get(corners[0]),
                mesh.vertices.get(corners[1]),
                mesh.vertices.get(corners[2]),
            ) else {
                continue;
            };
            let (Some(uv_a), Some(uv_b), Some(uv_c)) = (a.uvs.get(set), b.uvs.get(set), c.uvs.get(set)) else {
                continue;
            };

            let edge1 = b.position - a.position;
            let edge2 = c.position - a.position;
            let du1 = uv_b.x - uv_a.x;
            let dv1 = uv_b.y - uv_a.y;
            let du2 = uv_c.x - uv_a.x;
            let dv2 = uv_c.y - uv_a.y;

            let det = du1 * dv2 - du2 * dv1;
            if det.abs() < 1e-12 {
                continue;
            }
            let tangent = (edge1 * dv2 - edge2 * dv1) / det;
            for corner in corners {
                sums[corner] += tangent;
            }
        }
    }

    for (vertex, sum) in mesh.vertices.iter_mut().zip(sums) {
        vertex.tangent = Some(finish_tangent(vertex.normal, sum));
    }
}

fn finish_tangent(normal: Vector3<f32>, sum: Vector3<f32>) -> Vector4<f32> {
    let normal = if normal.magnitude2() > 0.0 {
        normal.normalize()
    } else {
        Vector3::unit_y()
    };
    let orthogonal = sum - normal * normal.dot(sum);
    let tangent = if orthogonal.magnitude2() > 1e-12 {
        orthogonal.normalize()
    } else {
        perpendicular(normal)
    };
    tangent.extend(1.0)
}

/// Unit vector perpendicular to `normal`, built from the least parallel axis.
fn perpendicular(normal: Vector3<f32>) -> Vector3<f32> {
    let mut best = Vector3::unit_x();
    for axis in [Vector3::unit_y(), Vector3::unit_z()] {
        if axis.dot(normal).abs() < best.dot(normal).abs() {
            best = axis;
        }
    }
    best.cross(normal).normalize()
}
