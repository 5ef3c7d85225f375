// Over-limit meshes: split on import, recombine in the host, split again
// on export without losing geometry.

use fmdl_tools_lib::fmdl::{decode, encode};
use fmdl_tools_lib::host::MemoryHost;
use fmdl_tools_lib::pipeline::{export_scene, import_bytes, ExportOptions, ImportOptions};

#[path = "common/mod.rs"]
mod common;

fn terrain_bytes() -> (fmdl_tools_lib::scene::Scene, Vec<u8>) {
    let mut scene = common::sample_scene();
    scene.meshes = vec![common::grid_mesh("terrain", "skin", 350, 200)];
    println!(
        "Terrain: {} vertices, {} triangles",
        scene.meshes[0].vertices.len(),
        scene.meshes[0].triangle_count()
    );
    let bytes = encode(&scene).expect("encode terrain");
    (scene, bytes)
}

#[test]
fn import_splits_over_limit_mesh() {
    let (_, bytes) = terrain_bytes();
    let mut host = MemoryHost::new();

    let report = import_bytes(&bytes, None, &mut host, &ImportOptions::default()).unwrap();
    println!("Imported {} objects", report.mesh_objects);

    assert_eq!(report.split_meshes, 1);
    assert!(report.mesh_objects >= 2);
    for object in &host.scene.objects {
        assert_eq!(object.parent_group.as_deref(), Some("terrain"));
        assert!(object.name.starts_with("terrain_part"));
        assert!(object.positions.len() <= 65535);
        assert!(object.triangles.len() * 3 <= 65535);
    }
}

#[test]
fn import_without_splitting_keeps_one_object() {
    let (_, bytes) = terrain_bytes();
    let mut host = MemoryHost::new();
    let options = ImportOptions {
        split_meshes: false,
        ..Default::default()
    };

    let report = import_bytes(&bytes, None, &mut host, &options).unwrap();
    assert_eq!(report.split_meshes, 0);
    assert_eq!(host.scene.objects.len(), 1);
    assert_eq!(host.scene.objects[0].positions.len(), 70_000);
}

#[test]
fn recombined_import_exports_the_same_geometry() {
    let (original, bytes) = terrain_bytes();
    let mut host = MemoryHost::new().recombining();

    import_bytes(&bytes, None, &mut host, &ImportOptions::default()).unwrap();
    assert_eq!(host.scene.objects.len(), 1);
    assert_eq!(host.scene.objects[0].name, "terrain");

    let report = export_scene(&host, &ExportOptions::default()).unwrap();
    println!("Exported {} mesh parts, {} bytes", report.mesh_count, report.bytes.len());
    assert!(report.rejected.is_empty());
    assert!(report.mesh_count >= 2);

    let decoded = decode(&report.bytes).unwrap();
    let triangles: usize = decoded.meshes.iter().map(|m| m.triangle_count()).sum();
    assert_eq!(triangles, original.meshes[0].triangle_count());
    assert_eq!(
        common::position_set(&decoded.meshes),
        common::position_set(&original.meshes)
    );
}

#[test]
fn export_without_splitting_rejects_the_mesh() {
    let (_, bytes) = terrain_bytes();
    let mut host = MemoryHost::new().recombining();
    import_bytes(&bytes, None, &mut host, &ImportOptions::default()).unwrap();

    let options = ExportOptions {
        split_meshes: false,
        ..Default::default()
    };
    let report = export_scene(&host, &options).unwrap();
    assert_eq!(report.mesh_count, 0);
    assert_eq!(report.rejected.len(), 1);
    assert_eq!(report.rejected[0].mesh, "terrain");
    assert_eq!(report.diagnostics.error_count, 1);
}
