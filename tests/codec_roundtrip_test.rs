// Round-trip test: Scene → FMDL bytes → Scene

use fmdl_tools_lib::fmdl::{decode, encode};
use fmdl_tools_lib::scene::TextureRole;

#[path = "common/mod.rs"]
mod common;

fn count_occurrences(haystack: &[u8], needle: &[u8]) -> usize {
    haystack.windows(needle.len()).filter(|w| *w == needle).count()
}

#[test]
fn sample_scene_round_trips() {
    let scene = common::sample_scene();
    let bytes = encode(&scene).expect("encode sample scene");
    let decoded = decode(&bytes).expect("decode sample scene");

    assert_eq!(decoded.meshes, scene.meshes);
    assert_eq!(decoded.materials, scene.materials);
    assert_eq!(decoded.textures, scene.textures);
    assert_eq!(decoded.skeleton, scene.skeleton);
    assert_eq!(decoded.bounding_box, scene.bounding_box);
}

#[test]
fn encoding_is_deterministic_and_stable() {
    let scene = common::sample_scene();
    let first = encode(&scene).unwrap();
    let second = encode(&decode(&first).unwrap()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn chunks_are_written_in_canonical_order() {
    let bytes = encode(&common::sample_scene()).unwrap();
    let tags: Vec<[u8; 4]> = common::split_chunks(&bytes).into_iter().map(|(t, _)| t).collect();
    assert_eq!(
        tags,
        vec![*b"FMDL", *b"STRS", *b"BONE", *b"MTRL", *b"TXTR", *b"MESH", *b"BBOX"]
    );
}

#[test]
fn shared_strings_are_stored_once() {
    let mut scene = common::sample_scene();
    scene.materials[1].shader = scene.materials[0].shader.clone();
    let bytes = encode(&scene).unwrap();

    assert_eq!(count_occurrences(&bytes, b"fox3ddf_blin"), 1);
    assert_eq!(count_occurrences(&bytes, b"SpecularMap_Tex_LIN"), 1);
}

#[test]
fn custom_roles_survive() {
    let decoded = decode(&encode(&common::sample_scene()).unwrap()).unwrap();
    assert_eq!(
        decoded.materials[0].bindings[2].role,
        TextureRole::Custom("SpecularMap_Tex_LIN".into())
    );
    assert!(decoded.materials.iter().all(|m| m.bindings.iter().all(|b| b.colorspace.is_none())));
}

#[test]
fn wide_meshes_use_32_bit_indices() {
    let mut scene = common::sample_scene();
    scene.meshes = vec![common::grid_mesh("field", "skin", 300, 230)];
    assert!(scene.meshes[0].vertices.len() > u16::MAX as usize);

    let decoded = decode(&encode(&scene).unwrap()).unwrap();
    assert_eq!(decoded.meshes[0].indices, scene.meshes[0].indices);
    assert_eq!(
        decoded.meshes[0].indices.iter().max(),
        Some(&(scene.meshes[0].vertices.len() as u32 - 1))
    );
}

#[test]
fn computed_bounding_box_is_not_marked_authored() {
    let mut scene = common::sample_scene();
    scene.bounding_box = None;
    let decoded = decode(&encode(&scene).unwrap()).unwrap();
    assert_eq!(decoded.bounding_box, None);
    assert_eq!(decoded.bounding_box(), scene.bounding_box());
}
