use std::path::{Path, PathBuf};

use crate::mesh_processing::split::split_source;

use super::{
    HostMeshObject, HostScene, HostSceneAdapter, HostUvLayer, HostVertexGroup, DEFAULT_VERTEX_COLOR,
};

/// In-process host. Holds one scene snapshot; used by tests and by callers
/// embedding the engine without an authoring tool.
#[derive(Debug, Clone, Default)]
pub struct MemoryHost {
    pub scene: HostScene,
    pub colorspaces: Vec<String>,
    /// Overrides the default texture search path when set.
    pub search_paths: Option<Vec<PathBuf>>,
    /// Merge split parts back into one object per group on write.
    pub recombine: bool,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scene(scene: HostScene) -> Self {
        Self {
            scene,
            ..Default::default()
        }
    }

    pub fn with_colorspaces(mut self, names: &[&str]) -> Self {
        self.colorspaces = names.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn recombining(mut self) -> Self {
        self.recombine = true;
        self
    }
}

impl HostSceneAdapter for MemoryHost {
    fn read_host_scene(&self) -> anyhow::Result<HostScene> {
        Ok(self.scene.clone())
    }

    fn write_host_scene(&mut self, mut scene: HostScene) -> anyhow::Result<()> {
        if self.recombine {
            scene.objects = recombine_objects(scene.objects)?;
        }
        self.scene = scene;
        Ok(())
    }

    fn available_colorspaces(&self) -> Vec<String> {
        self.colorspaces.clone()
    }

    fn texture_search_paths(&self, fmdl_path: &Path) -> Vec<PathBuf> {
        match &self.search_paths {
            Some(paths) => paths.clone(),
            None => crate::texture::search::default_search_paths(fmdl_path),
        }
    }
}

/// Merge consecutive split parts (`{source}_part{n}` objects under a parent
/// group) of the same source mesh and material into one object named after
/// the source. The parent group is kept unless it is the source name.
pub fn recombine_objects(objects: Vec<HostMeshObject>) -> anyhow::Result<Vec<HostMeshObject>> {
    let mut out: Vec<HostMeshObject> = vec![];
    // Source, group and material of the merged object at the end of `out`.
    let mut open: Option<(String, Option<String>, Option<String>)> = None;

    for object in objects {
        let source = match object.parent_group {
            Some(_) => split_source(&object.name).map(str::to_string),
            None => None,
        };
        let Some(source) = source else {
            open = None;
            out.push(object);
            continue;
        };

        let key = (source, object.parent_group.clone(), object.material.clone());
        if open.as_ref() == Some(&key) {
            if let Some(last) = out.last_mut() {
                append_object(last, &object)?;
            }
            continue;
        }

        let (source, group, material) = key.clone();
        let mut merged = HostMeshObject {
            name: source.clone(),
            material,
            parent_group: group.filter(|g| *g != source),
            ..Default::default()
        };
        append_object(&mut merged, &object)?;
        out.push(merged);
        open = Some(key);
    }
    Ok(out)
}

fn append_object(target: &mut HostMeshObject, part: &HostMeshObject) -> anyhow::Result<()> {
    let offset = target.positions.len() as u32;
    let target_was_empty = target.positions.is_empty();

    if !target_was_empty && target.uv_layers.len() != part.uv_layers.len() {
        anyhow::bail!(
            "cannot merge '{}' into '{}': {} UV layers vs {}",
            part.name,
            target.name,
            part.uv_layers.len(),
            target.uv_layers.len()
        );
    }

    if !target.colors.is_empty() || !part.colors.is_empty() {
        target.colors.resize(offset as usize, DEFAULT_VERTEX_COLOR);
        target.colors.extend(
            part.colors
                .iter()
                .copied()
                .chain(std::iter::repeat(DEFAULT_VERTEX_COLOR))
                .take(part.positions.len()),
        );
    }
    target.positions.extend_from_slice(&part.positions);
    target.normals.extend_from_slice(&part.normals);

    for (i, layer) in part.uv_layers.iter().enumerate() {
        match target.uv_layers.get_mut(i) {
            Some(existing) => existing.coords.extend_from_slice(&layer.coords),
            None => target.uv_layers.push(HostUvLayer {
                name: layer.name.clone(),
                coords: layer.coords.clone(),
            }),
        }
    }

    for group in &part.vertex_groups {
        let shifted = group.weights.iter().map(|&(v, w)| (v + offset, w));
        match target.vertex_groups.iter_mut().find(|g| g.name == group.name) {
            Some(existing) => existing.weights.extend(shifted),
            None => target.vertex_groups.push(HostVertexGroup {
                name: group.name.clone(),
                weights: shifted.collect(),
            }),
        }
    }

    target
        .triangles
        .extend(part.triangles.iter().map(|t| [t[0] + offset, t[1] + offset, t[2] + offset]));
    Ok(())
}
