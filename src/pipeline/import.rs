use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::error::FmdlError;
use super::options::ImportOptions;
use crate::fmdl;
use crate::host::HostSceneAdapter;
use crate::mapping::{scene_to_host, ImportedTexture};
use crate::mesh_processing::split::split_mesh;
use crate::scene::{ColorspaceIntent, Scene, TextureRole};
use crate::texture::colorspace::resolve_colorspace;
use crate::texture::role::{resolve_role_reporting, RoleSignals};
use crate::texture::search::{find_texture, probe_texture};
use crate::validation::report::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::validation::rules::validate_split_parts;

#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportReport {
    pub diagnostics: Diagnostics,
    /// Host mesh objects created.
    pub mesh_objects: usize,
    /// Source meshes that had to be split.
    pub split_meshes: usize,
    pub textures_found: usize,
}

/// Import an FMDL file into `host`.
pub fn import_file(
    path: &Path,
    host: &mut dyn HostSceneAdapter,
    options: &ImportOptions,
) -> Result<ImportReport, FmdlError> {
    options.validate()?;
    let bytes = fs::read(path).map_err(|e| FmdlError::io(path, e))?;
    log::info!("importing {} ({} bytes)", path.display(), bytes.len());
    import_bytes(&bytes, Some(path), host, options)
}

/// Import FMDL bytes. `origin` is where the bytes came from; without it no
/// texture files are looked up.
pub fn import_bytes(
    bytes: &[u8],
    origin: Option<&Path>,
    host: &mut dyn HostSceneAdapter,
    options: &ImportOptions,
) -> Result<ImportReport, FmdlError> {
    options.validate()?;
    let mut report = ImportReport::default();

    let mut scene = fmdl::decode(bytes)?;

    if options.split_meshes {
        report.split_meshes = split_scene(&mut scene, options.limit, &mut report.diagnostics);
    }

    let colorspaces = host.available_colorspaces();
    let mut imported = resolve_textures(&mut scene, &colorspaces, &mut report.diagnostics);

    if options.load_textures {
        if let Some(origin) = origin {
            let search_paths = host.texture_search_paths(origin);
            report.textures_found =
                locate_textures(&scene, &mut imported, &search_paths, &mut report.diagnostics);
        }
    }

    let host_scene = scene_to_host(&scene, &imported, options.anti_blur);
    report.mesh_objects = host_scene.objects.len();
    host.write_host_scene(host_scene).map_err(FmdlError::host)?;

    log::info!(
        "import done: {} objects, {} split meshes, {} diagnostics",
        report.mesh_objects,
        report.split_meshes,
        report.diagnostics.len()
    );
    Ok(report)
}

/// Replace every over-limit mesh with its parts. Returns how many meshes
/// were split.
fn split_scene(scene: &mut Scene, limit: usize, diagnostics: &mut Diagnostics) -> usize {
    let mut split = 0;
    let mut meshes = Vec::with_capacity(scene.meshes.len());
    for mesh in scene.meshes.drain(..) {
        if mesh.exceeds_limit(limit) {
            split += 1;
            let parts = split_mesh(&mesh, limit);
            if let Some(diagnostic) = validate_split_parts(&mesh.name, parts.len()) {
                diagnostics.add(diagnostic);
            }
            meshes.extend(parts);
        } else {
            meshes.push(mesh);
        }
    }
    scene.meshes = meshes;
    split
}

/// Settle the role and colorspace of every binding and every texture.
///
/// Bindings resolve from the texture's declared hint, then the binding's
/// role token, then the filename. Textures take the role of their first
/// binding, or resolve on their own when nothing binds them.
fn resolve_textures(
    scene: &mut Scene,
    colorspaces: &[String],
    diagnostics: &mut Diagnostics,
) -> Vec<ImportedTexture> {
    let mut chosen: HashMap<(usize, ColorspaceIntent), String> = HashMap::new();
    let mut roles: Vec<Option<TextureRole>> = vec![None; scene.textures.len()];
    let textures = &scene.textures;

    let mut colorspace_for = |index: usize, role: &TextureRole, diagnostics: &mut Diagnostics| {
        let intent = role.colorspace_intent();
        chosen
            .entry((index, intent))
            .or_insert_with(|| {
                let subject = textures.get(index).map(|t| t.filename.as_str()).unwrap_or("");
                resolve_colorspace(intent, colorspaces, subject, diagnostics)
            })
            .clone()
    };

    for material in scene.materials.iter_mut() {
        for binding in material.bindings.iter_mut() {
            let Some(texture) = textures.get(binding.texture) else {
                continue;
            };
            let signals = RoleSignals {
                structured: texture.role_hint.clone(),
                custom: binding.role.token().map(str::to_string),
                display_name: Some(texture.filename.clone()),
            };
            let role = resolve_role_reporting(&texture.filename, &signals, diagnostics).role;
            binding.colorspace = Some(colorspace_for(binding.texture, &role, diagnostics));
            if roles[binding.texture].is_none() {
                roles[binding.texture] = Some(role.clone());
            }
            binding.role = role;
        }
    }

    textures
        .iter()
        .enumerate()
        .map(|(index, texture)| {
            let role = match roles[index].take() {
                Some(role) => role,
                None => {
                    let signals = RoleSignals {
                        structured: texture.role_hint.clone(),
                        custom: None,
                        display_name: Some(texture.filename.clone()),
                    };
                    resolve_role_reporting(&texture.filename, &signals, diagnostics).role
                }
            };
            let colorspace = colorspace_for(index, &role, diagnostics);
            ImportedTexture {
                role,
                colorspace,
                file: None,
                size: None,
            }
        })
        .collect()
}

fn locate_textures(
    scene: &Scene,
    imported: &mut [ImportedTexture],
    search_paths: &[PathBuf],
    diagnostics: &mut Diagnostics,
) -> usize {
    let mut found = 0;
    for (texture, info) in scene.textures.iter().zip(imported.iter_mut()) {
        match find_texture(texture, search_paths) {
            Some(path) => {
                log::debug!("texture {} found at {}", texture.path(), path.display());
                info.size = probe_texture(&path, &texture.filename, diagnostics);
                info.file = Some(path);
                found += 1;
            }
            None => diagnostics.add(Diagnostic::info(
                DiagnosticKind::TextureLookup,
                "TEXTURE_NOT_FOUND",
                texture.filename.clone(),
                format!(
                    "{} not found in {} search directories; keeping the declared path.",
                    texture.path(),
                    search_paths.len()
                ),
            )),
        }
    }
    found
}
