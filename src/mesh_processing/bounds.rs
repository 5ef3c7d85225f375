use cgmath::Vector3;

use crate::scene::{BoundingBox, Mesh};

/// Axis-aligned envelope of a set of points, `None` when there are none.
pub fn envelope(points: impl IntoIterator<Item = Vector3<f32>>) -> Option<BoundingBox> {
    let mut iter = points.into_iter();
    let first = iter.next()?;

    let mut min = first;
    let mut max = first;

    for p in iter {
        if p.x < min.x { min.x = p.x; }
        if p.y < min.y { min.y = p.y; }
        if p.z < min.z { min.z = p.z; }
        if p.x > max.x { max.x = p.x; }
        if p.y > max.y { max.y = p.y; }
        if p.z > max.z { max.z = p.z; }
    }

    Some(BoundingBox::new(min, max))
}

/// Per-bone envelope of every vertex carrying a non-zero weight for that
/// bone. Bones without weighted vertices get a zero box.
pub fn bone_bounds(meshes: &[Mesh], bone_count: usize) -> Vec<BoundingBox> {
    let mut boxes: Vec<Option<BoundingBox>> = vec![None; bone_count];

    for vertex in meshes.iter().flat_map(|m| m.vertices.iter()) {
        for w in vertex.weights.iter().filter(|w| w.weight > 0.0) {
            let Some(slot) = boxes.get_mut(w.bone) else {
                continue;
            };
            let point = BoundingBox::new(vertex.position, vertex.position);
            *slot = Some(match slot {
                Some(existing) => existing.union(&point),
                None => point,
            });
        }
    }

    boxes
        .into_iter()
        .map(|b| b.unwrap_or_else(BoundingBox::zero))
        .collect()
}
