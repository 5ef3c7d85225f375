use crate::scene::{BoneWeight, Mesh};
use crate::validation::limits::MAX_BLEND_WEIGHTS;

/// Normalize a set of weights so they sum to 1.0.
pub fn normalize_weights(weights: &mut [BoneWeight]) {
    let sum: f32 = weights.iter().map(|w| w.weight).sum();
    if sum > 0.0 {
        for w in weights.iter_mut() {
            w.weight /= sum;
        }
    } else if let Some(first) = weights.first_mut() {
        // If all weights are zero, assign full weight to first bone
        first.weight = 1.0;
    }
}

/// Reduce a vertex to its `max` largest influences and renormalize.
/// Returns whether anything was dropped; compliant vertices are untouched.
pub fn limit_weights(weights: &mut Vec<BoneWeight>, max: usize) -> bool {
    if weights.len() <= max {
        return false;
    }

    weights.retain(|w| w.weight > 0.0);
    // Stable, so equal weights keep their original order
    weights.sort_by(|a, b| {
        b.weight
            .partial_cmp(&a.weight)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    weights.truncate(max);
    normalize_weights(weights);
    true
}

/// Apply [`limit_weights`] to every vertex of a mesh.
/// Returns `(vertices fixed, largest influence count seen)`.
pub fn limit_mesh_weights(mesh: &mut Mesh) -> (usize, usize) {
    let mut fixed = 0;
    let mut max_influences = 0;

    for vertex in mesh.vertices.iter_mut() {
        max_influences = max_influences.max(vertex.weights.len());
        if limit_weights(&mut vertex.weights, MAX_BLEND_WEIGHTS) {
            fixed += 1;
        }
    }

    (fixed, max_influences)
}
