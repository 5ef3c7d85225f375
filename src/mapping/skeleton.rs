use std::collections::{HashMap, HashSet};

use cgmath::{Matrix4, SquareMatrix};

use crate::fmdl::EncodeError;
use crate::host::{HostArmature, HostBone, HostMeshObject, ARMATURE_NAME};
use crate::math::{y_up_to_z_up_mat4, z_up_to_y_up_mat4, FmdlMatrix44};
use crate::scene::{Bone, Skeleton};
use crate::validation::report::{Diagnostic, DiagnosticKind, Diagnostics};

// Bones shorter than this are dropped by hosts that edit in head/tail form.
const MIN_BONE_LENGTH_SQUARED: f32 = 0.000_000_000_1;
const DEGENERATE_TAIL_OFFSET: f32 = 0.000_01;

/// Build the host armature. Each bone's head is its bind translation; the
/// tail points at the first child, or just below the head for leaves.
pub fn skeleton_to_host(skeleton: &Skeleton) -> HostArmature {
    let matrices: Vec<[f32; 16]> = skeleton
        .bones
        .iter()
        .map(|b| y_up_to_z_up_mat4(b.bind_transform))
        .collect();
    let heads: Vec<[f32; 3]> = matrices
        .iter()
        .map(|m| {
            let t = FmdlMatrix44::from_slice(m).translation();
            [t.x, t.y, t.z]
        })
        .collect();

    let mut first_child: Vec<Option<usize>> = vec![None; skeleton.bones.len()];
    for (i, bone) in skeleton.bones.iter().enumerate().rev() {
        if let Some(parent) = bone.parent.filter(|&p| p < first_child.len()) {
            first_child[parent] = Some(i);
        }
    }

    let bones = skeleton
        .bones
        .iter()
        .enumerate()
        .map(|(i, bone)| {
            let head = heads[i];
            let mut tail = first_child[i].map(|c| heads[c]).unwrap_or(head);
            let length_squared: f32 = (0..3).map(|k| (tail[k] - head[k]).powi(2)).sum();
            if length_squared < MIN_BONE_LENGTH_SQUARED {
                tail = [head[0], head[1], head[2] - DEGENERATE_TAIL_OFFSET];
            }

            HostBone {
                name: bone.name.clone(),
                parent: bone
                    .parent
                    .and_then(|p| skeleton.bones.get(p))
                    .map(|p| p.name.clone()),
                head,
                tail,
                matrix: matrices[i],
            }
        })
        .collect();

    HostArmature {
        name: ARMATURE_NAME.to_string(),
        bones,
    }
}

/// Build the scene skeleton from the armature and the vertex groups of
/// every mesh object.
///
/// Armature bones come out parents-first. A parent name missing from the
/// armature makes the bone a root. Vertex groups naming no armature bone
/// are appended as root bones with an identity bind.
pub fn skeleton_from_host(
    armature: Option<&HostArmature>,
    objects: &[HostMeshObject],
    diagnostics: &mut Diagnostics,
) -> Result<Option<Skeleton>, EncodeError> {
    let mut skeleton = Skeleton::default();

    if let Some(armature) = armature {
        add_armature_bones(armature, &mut skeleton)?;
    }

    let mut known: HashSet<String> = skeleton.bones.iter().map(|b| b.name.clone()).collect();
    for object in objects {
        for group in &object.vertex_groups {
            if !known.insert(group.name.clone()) {
                continue;
            }
            diagnostics.add(Diagnostic::warning(
                DiagnosticKind::Validation,
                "UNKNOWN_BONE",
                object.name.clone(),
                format!(
                    "Vertex group '{}' names no armature bone; exported as a root bone.",
                    group.name
                ),
            ));
            skeleton.bones.push(Bone::new(group.name.clone(), None));
        }
    }

    if skeleton.bones.is_empty() {
        Ok(None)
    } else {
        Ok(Some(skeleton))
    }
}

/// Append the armature parents-first. Bones sharing a name collapse into
/// the first one.
fn add_armature_bones(armature: &HostArmature, skeleton: &mut Skeleton) -> Result<(), EncodeError> {
    let mut by_name: HashMap<&str, usize> = HashMap::new();
    for (i, bone) in armature.bones.iter().enumerate() {
        by_name.entry(bone.name.as_str()).or_insert(i);
    }
    let parent_of = |bone: &HostBone| bone.parent.as_deref().and_then(|p| by_name.get(p).copied());

    let mut placed: Vec<Option<usize>> = vec![None; armature.bones.len()];
    let mut on_chain = vec![false; armature.bones.len()];
    let mut chain = vec![];

    for bone in &armature.bones {
        // Climb to a placed ancestor or a root, then place the chain top-down.
        let mut current = by_name.get(bone.name.as_str()).copied();
        while let Some(i) = current {
            if placed[i].is_some() {
                break;
            }
            if on_chain[i] {
                return Err(EncodeError::BoneCycle {
                    bone: armature.bones[i].name.clone(),
                });
            }
            on_chain[i] = true;
            chain.push(i);
            current = parent_of(&armature.bones[i]);
        }

        while let Some(i) = chain.pop() {
            on_chain[i] = false;
            let host_bone = &armature.bones[i];
            let parent = parent_of(host_bone).and_then(|p| placed[p]);
            let mut scene_bone = Bone::new(host_bone.name.clone(), parent);
            scene_bone.bind_transform = bind_from_host(&host_bone.matrix);
            placed[i] = Some(skeleton.bones.len());
            skeleton.bones.push(scene_bone);
        }
    }
    Ok(())
}

fn bind_from_host(matrix: &[f32; 16]) -> Matrix4<f32> {
    // An all-zero matrix means the host never set one.
    if matrix.iter().all(|v| *v == 0.0) {
        Matrix4::identity()
    } else {
        z_up_to_y_up_mat4(*matrix)
    }
}
