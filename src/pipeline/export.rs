use std::fs;
use std::path::Path;

use serde::Serialize;

use super::error::FmdlError;
use super::options::ExportOptions;
use crate::fmdl;
use crate::host::HostSceneAdapter;
use crate::mapping::{host_to_scene, MaterialExport};
use crate::mesh_processing::bounds::bone_bounds;
use crate::mesh_processing::split::split_mesh;
use crate::presets::preset;
use crate::scene::Scene;
use crate::validation::report::Diagnostics;
use crate::validation::rules::{
    validate_bone_group, validate_mesh_limit, validate_split_parts, validate_texcoords,
    MeshLimitExceeded,
};

#[derive(Debug, Clone, Default, Serialize)]
pub struct ExportReport {
    #[serde(skip)]
    pub bytes: Vec<u8>,
    pub diagnostics: Diagnostics,
    /// Meshes left out because they exceed the limit with splitting off.
    pub rejected: Vec<MeshLimitExceeded>,
    /// Mesh parts written.
    pub mesh_count: usize,
}

/// Build the scene model for the host's current contents, ready to encode.
pub(crate) fn prepare_scene(
    host: &dyn HostSceneAdapter,
    options: &ExportOptions,
    diagnostics: &mut Diagnostics,
) -> Result<Scene, FmdlError> {
    options.validate()?;
    let default_preset = preset(&options.default_preset).ok_or_else(|| {
        FmdlError::Options(format!("unknown material preset '{}'", options.default_preset))
    })?;

    let host_scene = host.read_host_scene().map_err(FmdlError::host)?;
    let settings = MaterialExport {
        anti_blur: options.anti_blur,
        default_preset,
    };
    Ok(host_to_scene(&host_scene, settings, diagnostics)?)
}

/// Export the host scene to FMDL bytes. Nothing is returned unless the
/// whole scene encodes.
pub fn export_scene(
    host: &dyn HostSceneAdapter,
    options: &ExportOptions,
) -> Result<ExportReport, FmdlError> {
    let mut report = ExportReport::default();
    let mut scene = prepare_scene(host, options, &mut report.diagnostics)?;

    report.rejected = fit_meshes(&mut scene, options, &mut report.diagnostics);
    for mesh in &scene.meshes {
        if let Some(diagnostic) = validate_bone_group(&mesh.name, mesh.bone_group().len()) {
            report.diagnostics.add(diagnostic);
        }
        if let Some(diagnostic) = validate_texcoords(mesh) {
            report.diagnostics.add(diagnostic);
        }
    }

    if let Some(skeleton) = scene.skeleton.as_mut() {
        let bounds = bone_bounds(&scene.meshes, skeleton.bones.len());
        for (bone, bounds) in skeleton.bones.iter_mut().zip(bounds) {
            bone.bounds = bounds;
        }
    }

    report.bytes = fmdl::encode(&scene)?;
    report.mesh_count = scene.meshes.len();

    log::info!(
        "export done: {} mesh parts, {} rejected, {} bytes, {} diagnostics",
        report.mesh_count,
        report.rejected.len(),
        report.bytes.len(),
        report.diagnostics.len()
    );
    Ok(report)
}

/// Export and write the result to `path`. The file is only touched once
/// encoding has succeeded.
pub fn export_file(
    path: &Path,
    host: &dyn HostSceneAdapter,
    options: &ExportOptions,
) -> Result<ExportReport, FmdlError> {
    let report = export_scene(host, options)?;
    fs::write(path, &report.bytes).map_err(|e| FmdlError::io(path, e))?;
    log::info!("wrote {}", path.display());
    Ok(report)
}

/// Split over-limit meshes, or drop them when splitting is off. Returns the
/// dropped meshes.
fn fit_meshes(
    scene: &mut Scene,
    options: &ExportOptions,
    diagnostics: &mut Diagnostics,
) -> Vec<MeshLimitExceeded> {
    let mut rejected = vec![];
    let mut meshes = Vec::with_capacity(scene.meshes.len());

    for mesh in scene.meshes.drain(..) {
        if options.split_meshes {
            let parts = split_mesh(&mesh, options.limit);
            if let Some(diagnostic) = validate_split_parts(&mesh.name, parts.len()) {
                diagnostics.add(diagnostic);
            }
            meshes.extend(parts);
            continue;
        }
        match validate_mesh_limit(&mesh, options.limit) {
            Ok(()) => meshes.push(mesh),
            Err(exceeded) => {
                diagnostics.add(exceeded.to_diagnostic());
                rejected.push(exceeded);
            }
        }
    }

    scene.meshes = meshes;
    rejected
}
