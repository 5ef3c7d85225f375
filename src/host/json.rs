use std::fs;
use std::path::PathBuf;

use anyhow::Context;

use super::{HostScene, HostSceneAdapter};

/// File-backed host: the scene is a JSON document on disk.
#[derive(Debug, Clone)]
pub struct JsonHost {
    pub path: PathBuf,
    pub colorspaces: Vec<String>,
}

impl JsonHost {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            colorspaces: vec![],
        }
    }

    pub fn with_colorspaces(mut self, names: Vec<String>) -> Self {
        self.colorspaces = names;
        self
    }
}

impl HostSceneAdapter for JsonHost {
    fn read_host_scene(&self) -> anyhow::Result<HostScene> {
        let text = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read host scene {}", self.path.display()))?;
        let scene = serde_json::from_str(&text)
            .with_context(|| format!("failed to parse host scene {}", self.path.display()))?;
        Ok(scene)
    }

    fn write_host_scene(&mut self, scene: HostScene) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let text = serde_json::to_string_pretty(&scene)?;
        fs::write(&self.path, text)
            .with_context(|| format!("failed to write host scene {}", self.path.display()))?;
        log::info!(
            "wrote {} objects, {} materials to {}",
            scene.objects.len(),
            scene.materials.len(),
            self.path.display()
        );
        Ok(())
    }

    fn available_colorspaces(&self) -> Vec<String> {
        self.colorspaces.clone()
    }
}
