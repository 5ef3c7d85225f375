use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use super::mesh::{UV_MAP_COLOR, UV_MAP_NORMALS};
use super::simplify_name;
use crate::host::{
    HostImage, HostMaterial, HostMaterialParameter, ShaderGraph, ShaderNode, ShaderNodeKind,
    TextureProperties, PROP_TEXTURE_DIRECTORY, PROP_TEXTURE_FILENAME, PROP_TEXTURE_ROLE,
};
use crate::presets::{apply_preset, preset_for_shader, MaterialPreset};
use crate::scene::{Material, MaterialParameter, Scene, Texture, TextureBinding, TextureRole};
use crate::texture::role::{resolve_role_reporting, split_display_name, RoleSignals};
use crate::validation::report::{Diagnostic, DiagnosticKind, Diagnostics};

pub const NODE_PRINCIPLED: &str = "Principled BSDF";
pub const NODE_OUTPUT: &str = "Material Output";
pub const NODE_IMAGE: &str = "Image Texture";
pub const NODE_NORMAL_MAP: &str = "Normal Map";

/// What the import pipeline learned about one texture-table entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedTexture {
    /// Role recovered from the texture's own signals.
    pub role: TextureRole,
    pub colorspace: String,
    /// File found on disk, if any.
    pub file: Option<PathBuf>,
    pub size: Option<(u32, u32)>,
}

// ============================================================================
// Import: scene materials -> host shader graphs
// ============================================================================

/// One host image per (texture, role) pair.
#[derive(Default)]
struct ImageSet {
    images: Vec<HostImage>,
    by_key: HashMap<(usize, TextureRole), String>,
}

impl ImageSet {
    fn get_or_insert(
        &mut self,
        index: usize,
        role: &TextureRole,
        colorspace: &str,
        texture: &Texture,
        imported: Option<&ImportedTexture>,
    ) -> String {
        if let Some(name) = self.by_key.get(&(index, role.clone())) {
            return name.clone();
        }

        let base = texture.display_name(role);
        let mut name = base.clone();
        let mut n = 0;
        while self.images.iter().any(|i| i.name == name) {
            n += 1;
            name = format!("{}.{:03}", base, n);
        }

        let filepath = imported
            .and_then(|t| t.file.as_deref())
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| texture.path());

        self.images.push(HostImage {
            name: name.clone(),
            filepath,
            colorspace: Some(colorspace.to_string()),
            properties: TextureProperties {
                texture_role: role.token().map(str::to_string),
                texture_filename: Some(texture.filename.clone()),
                texture_directory: Some(texture.directory.clone()),
            },
            custom_properties: BTreeMap::new(),
            size: imported.and_then(|t| t.size),
        });
        self.by_key.insert((index, role.clone()), name.clone());
        name
    }
}

/// Build host materials and images for every scene material. Textures no
/// binding refers to still get an image so they survive the round trip.
pub fn materials_to_host(
    scene: &Scene,
    imported: &[ImportedTexture],
    anti_blur: bool,
) -> (Vec<HostMaterial>, Vec<HostImage>) {
    let mut images = ImageSet::default();
    let materials = scene
        .materials
        .iter()
        .map(|m| material_to_host(m, scene, imported, &mut images, anti_blur))
        .collect();

    for (index, texture) in scene.textures.iter().enumerate() {
        let bound = images.by_key.keys().any(|(i, _)| *i == index);
        if bound {
            continue;
        }
        let info = imported.get(index);
        let role = info.map(|t| t.role.clone()).unwrap_or(TextureRole::Unknown);
        let colorspace = info.map(|t| t.colorspace.as_str()).unwrap_or("Non-Color");
        images.get_or_insert(index, &role, colorspace, texture, info);
    }

    (materials, images.images)
}

fn material_to_host(
    material: &Material,
    scene: &Scene,
    imported: &[ImportedTexture],
    images: &mut ImageSet,
    anti_blur: bool,
) -> HostMaterial {
    let mut graph = ShaderGraph::default();
    let bsdf = graph.add_node(ShaderNode::new(NODE_PRINCIPLED, ShaderNodeKind::PrincipledBsdf));
    let output = graph.add_node(ShaderNode::new(NODE_OUTPUT, ShaderNodeKind::MaterialOutput));
    graph.link(&bsdf, "BSDF", &output, "Surface");

    for binding in &material.bindings {
        let Some(texture) = scene.textures.get(binding.texture) else {
            continue;
        };
        let info = imported.get(binding.texture);
        let colorspace = binding
            .colorspace
            .clone()
            .or_else(|| info.map(|t| t.colorspace.clone()))
            .unwrap_or_else(|| "Non-Color".to_string());
        let image = images.get_or_insert(binding.texture, &binding.role, &colorspace, texture, info);

        let is_normal = binding.role.token().map(|t| t.ends_with("_NRM")).unwrap_or(false);
        let mut node = ShaderNode::new(NODE_IMAGE, ShaderNodeKind::ImageTexture);
        node.label = binding.role.token().unwrap_or_default().to_string();
        node.image = Some(image);
        node.colorspace = Some(colorspace);
        node.uv_map = Some(if is_normal { UV_MAP_NORMALS } else { UV_MAP_COLOR }.to_string());
        let node = graph.add_node(node);

        if binding.role.is_base_color() && !graph.is_linked(&bsdf, "Base Color") {
            graph.link(&node, "Color", &bsdf, "Base Color");
            graph.link(&node, "Alpha", &bsdf, "Alpha");
        } else if binding.role.is_normal_map() && !graph.is_linked(&bsdf, "Normal") {
            let normal_map = graph.add_node(ShaderNode::new(NODE_NORMAL_MAP, ShaderNodeKind::NormalMap));
            graph.link(&node, "Color", &normal_map, "Color");
            graph.link(&normal_map, "Normal", &bsdf, "Normal");
        }
    }

    HostMaterial {
        name: material.name.clone(),
        shader: material.shader.clone(),
        technique: material.technique.clone(),
        parameters: material
            .parameters
            .iter()
            .map(|p| HostMaterialParameter {
                name: p.name.clone(),
                values: p.values,
            })
            .collect(),
        alpha_flags: material.alpha_flags,
        shadow_flags: material.shadow_flags,
        anti_blur: anti_blur && material.anti_blur,
        graph,
    }
}

// ============================================================================
// Export: host shader graphs -> scene materials
// ============================================================================

fn role_signals(image: &HostImage) -> RoleSignals {
    RoleSignals {
        structured: image.properties.texture_role.clone(),
        custom: image.custom_properties.get(PROP_TEXTURE_ROLE).cloned(),
        display_name: Some(image.name.clone()),
    }
}

/// Engine directory and filename of an image, from the first source that
/// has them: typed properties, custom properties, the `[role] filename`
/// display name, the file path, the bare name.
pub fn texture_location(image: &HostImage) -> (String, String) {
    let directory = image
        .properties
        .texture_directory
        .clone()
        .or_else(|| image.custom_properties.get(PROP_TEXTURE_DIRECTORY).cloned())
        .unwrap_or_default();

    let from_name = match split_display_name(&image.name) {
        (Some(_), filename) if !filename.is_empty() => Some(filename.to_string()),
        _ => None,
    };
    let from_path = Path::new(&image.filepath)
        .file_name()
        .map(|f| f.to_string_lossy().into_owned());

    let filename = image
        .properties
        .texture_filename
        .clone()
        .or_else(|| image.custom_properties.get(PROP_TEXTURE_FILENAME).cloned())
        .or(from_name)
        .or(from_path)
        .unwrap_or_else(|| image.name.clone());

    (directory, filename)
}

fn intern_texture(textures: &mut Vec<Texture>, texture: Texture) -> usize {
    match textures.iter().position(|t| *t == texture) {
        Some(index) => index,
        None => {
            textures.push(texture);
            textures.len() - 1
        }
    }
}

/// Settings the export mapper needs from the caller.
#[derive(Debug, Clone, Copy)]
pub struct MaterialExport<'a> {
    pub anti_blur: bool,
    pub default_preset: &'a MaterialPreset,
}

/// Build a scene material from a host material. Textures are interned into
/// `textures`; unknown-role textures are added without a binding.
pub fn material_from_host(
    host: &HostMaterial,
    images: &[HostImage],
    textures: &mut Vec<Texture>,
    settings: MaterialExport<'_>,
    diagnostics: &mut Diagnostics,
) -> Material {
    let mut material = Material::new(simplify_name(&host.name));
    material.shader = host.shader.clone();
    material.technique = host.technique.clone();
    material.alpha_flags = host.alpha_flags;
    material.shadow_flags = host.shadow_flags;
    material.anti_blur = host.anti_blur;
    material.parameters = host
        .parameters
        .iter()
        .map(|p| MaterialParameter {
            name: p.name.clone(),
            values: p.values,
        })
        .collect();

    for node in host.graph.image_nodes() {
        let Some(image_name) = node.image.as_deref() else {
            log::debug!("material '{}': node '{}' has no image", material.name, node.name);
            continue;
        };
        let placeholder;
        let image = match images.iter().find(|i| i.name == image_name) {
            Some(image) => image,
            None => {
                placeholder = HostImage {
                    name: image_name.to_string(),
                    ..Default::default()
                };
                &placeholder
            }
        };

        let role = match TextureRole::from_token(&node.label) {
            Some(role) => role,
            None => resolve_role_reporting(&image.name, &role_signals(image), diagnostics).role,
        };

        let (directory, filename) = texture_location(image);
        let texture = Texture {
            directory,
            filename,
            role_hint: role.token().map(str::to_string),
        };
        let index = intern_texture(textures, texture);

        if role.is_known() {
            material.bindings.push(TextureBinding {
                role,
                texture: index,
                colorspace: node.colorspace.clone().or_else(|| image.colorspace.clone()),
            });
        }
    }

    if !material.has_base_color() {
        diagnostics.add(incomplete(&material.name, "base-color"));
    }
    if !material.has_normal_map() {
        diagnostics.add(incomplete(&material.name, "normal-map"));
    }

    fill_from_preset(&mut material, settings.default_preset, diagnostics);

    let forced = preset_for_shader(&material.shader)
        .map(|p| p.forces_anti_blur())
        .unwrap_or(false);
    material.anti_blur = settings.anti_blur && (material.anti_blur || forced);

    material
}

fn incomplete(material: &str, channel: &str) -> Diagnostic {
    Diagnostic::warning(
        DiagnosticKind::MaterialIncomplete,
        "MATERIAL_INCOMPLETE",
        material,
        format!("No {} texture found; exporting without that channel.", channel),
    )
}

/// Complete a material with no shader configuration from `preset`. A
/// material with neither shader nor technique takes the whole preset but
/// keeps its own parameters; one with only one of them set gets the other.
fn fill_from_preset(material: &mut Material, preset: &MaterialPreset, diagnostics: &mut Diagnostics) {
    if !material.shader.is_empty() && !material.technique.is_empty() {
        return;
    }

    if material.shader.is_empty() && material.technique.is_empty() {
        let parameters = std::mem::take(&mut material.parameters);
        apply_preset(material, preset);
        if !parameters.is_empty() {
            material.parameters = parameters;
        }
    } else if material.shader.is_empty() {
        material.shader = preset.shader.to_string();
    } else {
        material.technique = preset.technique.to_string();
    }

    diagnostics.add(Diagnostic::info(
        DiagnosticKind::Validation,
        "MATERIAL_PRESET_APPLIED",
        material.name.clone(),
        format!(
            "Shader settings missing; filled from preset '{}' ({} / {}).",
            preset.id, material.shader, material.technique
        ),
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets::preset;
    use crate::scene::ROLE_NORMAL_MAP;

    fn imported(role: TextureRole, colorspace: &str) -> ImportedTexture {
        ImportedTexture {
            role,
            colorspace: colorspace.into(),
            file: None,
            size: None,
        }
    }

    fn settings(anti_blur: bool) -> MaterialExport<'static> {
        MaterialExport {
            anti_blur,
            default_preset: preset("blin_basic").unwrap(),
        }
    }

    fn textured_scene() -> Scene {
        let mut material = Material::new("skin");
        material.shader = "fox3ddf_blin".into();
        material.technique = "fox3DDF_Blin".into();
        material.anti_blur = true;
        for (role, texture) in [
            (TextureRole::BaseColorSrgb, 0),
            (TextureRole::NormalMap, 1),
            (TextureRole::Custom("SpecularMap_Tex_LIN".into()), 2),
            (TextureRole::Unknown, 3),
        ] {
            material.bindings.push(TextureBinding {
                role,
                texture,
                colorspace: None,
            });
        }
        Scene {
            materials: vec![material],
            textures: vec![
                Texture::new("/a/", "skin_bsm.dds"),
                Texture::new("/a/", "skin_nrm.dds"),
                Texture::new("/a/", "skin_srm.dds"),
                Texture::new("/a/", "mystery.dds"),
                Texture::new("/a/", "unbound.dds"),
            ],
            ..Default::default()
        }
    }

    fn imported_for(scene: &Scene) -> Vec<ImportedTexture> {
        scene
            .textures
            .iter()
            .map(|_| imported(TextureRole::Unknown, "Non-Color"))
            .collect()
    }

    #[test]
    fn import_wires_base_color_and_normal_map() {
        let scene = textured_scene();
        let (materials, images) = materials_to_host(&scene, &imported_for(&scene), true);
        let graph = &materials[0].graph;

        assert!(graph.node(NODE_PRINCIPLED).is_some());
        assert!(graph.is_linked(NODE_OUTPUT, "Surface"));
        assert!(graph.is_linked(NODE_PRINCIPLED, "Base Color"));
        assert!(graph.is_linked(NODE_PRINCIPLED, "Alpha"));
        assert!(graph.is_linked(NODE_PRINCIPLED, "Normal"));
        assert!(graph.is_linked(NODE_NORMAL_MAP, "Color"));

        let labels: Vec<&str> = graph.image_nodes().map(|n| n.label.as_str()).collect();
        assert_eq!(labels, vec!["Base_Tex_SRGB", "NormalMap_Tex_NRM", "SpecularMap_Tex_LIN", ""]);

        assert_eq!(images.len(), 5);
        assert_eq!(images[0].name, "[Base_Tex_SRGB] skin_bsm.dds");
        assert_eq!(images[0].properties.texture_directory.as_deref(), Some("/a/"));
        assert_eq!(images[3].name, "mystery.dds");
        assert_eq!(images[4].name, "unbound.dds");
        assert!(materials[0].anti_blur);
    }

    #[test]
    fn import_without_anti_blur_clears_flag() {
        let scene = textured_scene();
        let (materials, _) = materials_to_host(&scene, &imported_for(&scene), false);
        assert!(!materials[0].anti_blur);
    }

    #[test]
    fn export_recovers_bindings_from_imported_graph() {
        let scene = textured_scene();
        let (materials, images) = materials_to_host(&scene, &imported_for(&scene), true);

        let mut textures = vec![];
        let mut diagnostics = Diagnostics::new();
        let material = material_from_host(&materials[0], &images, &mut textures, settings(true), &mut diagnostics);

        assert_eq!(material.bindings.len(), 3);
        assert_eq!(material.bindings[1].role, TextureRole::NormalMap);
        assert_eq!(textures.len(), 4);
        assert_eq!(textures[3].filename, "mystery.dds");
        assert_eq!(textures[3].role_hint, None);
        assert_eq!(textures[1].role_hint.as_deref(), Some(ROLE_NORMAL_MAP));
        assert!(material.anti_blur);
        // Only the unlabelled node needed the resolver.
        assert_eq!(diagnostics.of_kind(DiagnosticKind::RoleResolution).count(), 1);
        assert_eq!(diagnostics.of_kind(DiagnosticKind::MaterialIncomplete).count(), 0);
    }

    #[test]
    fn unlabelled_node_falls_back_to_resolver() {
        let mut graph = ShaderGraph::default();
        let mut node = ShaderNode::new(NODE_IMAGE, ShaderNodeKind::ImageTexture);
        node.image = Some("NormalMap_Tex_NRM".into());
        graph.add_node(node);
        let host = HostMaterial {
            name: "kit.001".into(),
            shader: "fox3ddf_blin".into(),
            technique: "fox3DDF_Blin".into(),
            graph,
            ..Default::default()
        };
        let images = vec![HostImage {
            name: "NormalMap_Tex_NRM".into(),
            filepath: "/tmp/kit_nrm.dds".into(),
            ..Default::default()
        }];

        let mut textures = vec![];
        let mut diagnostics = Diagnostics::new();
        let material = material_from_host(&host, &images, &mut textures, settings(true), &mut diagnostics);

        assert_eq!(material.name, "kit");
        assert_eq!(material.bindings[0].role, TextureRole::NormalMap);
        assert_eq!(textures[0].filename, "kit_nrm.dds");
        let incomplete: Vec<_> = diagnostics.of_kind(DiagnosticKind::MaterialIncomplete).collect();
        assert_eq!(incomplete.len(), 1);
        assert!(incomplete[0].message.contains("base-color"));
    }

    #[test]
    fn empty_shader_takes_default_preset() {
        let host = HostMaterial {
            name: "plain".into(),
            ..Default::default()
        };
        let mut diagnostics = Diagnostics::new();
        let material = material_from_host(&host, &[], &mut vec![], settings(true), &mut diagnostics);

        assert_eq!(material.shader, "fox3ddf_blin");
        assert_eq!(material.technique, "fox3DDF_Blin");
        assert_eq!(material.parameters.len(), 1);
        assert!(diagnostics.has_code("MATERIAL_PRESET_APPLIED"));
        assert_eq!(diagnostics.of_kind(DiagnosticKind::MaterialIncomplete).count(), 2);
    }

    #[test]
    fn constant_shader_forces_anti_blur_only_when_enabled() {
        let host = HostMaterial {
            name: "glow".into(),
            shader: "fox3dfw_constant_srgb_ndr_solid".into(),
            technique: "fox3DFW_ConstantSRGB_NDR_Solid".into(),
            ..Default::default()
        };
        let on = material_from_host(&host, &[], &mut vec![], settings(true), &mut Diagnostics::new());
        let off = material_from_host(&host, &[], &mut vec![], settings(false), &mut Diagnostics::new());
        assert!(on.anti_blur);
        assert!(!off.anti_blur);
    }

    #[test]
    fn location_prefers_typed_properties() {
        let mut image = HostImage {
            name: "[Base_Tex_SRGB] from_name.dds".into(),
            filepath: "/disk/from_path.png".into(),
            ..Default::default()
        };
        assert_eq!(texture_location(&image), (String::new(), "from_name.dds".to_string()));

        image
            .custom_properties
            .insert(PROP_TEXTURE_FILENAME.into(), "from_custom.dds".into());
        image
            .custom_properties
            .insert(PROP_TEXTURE_DIRECTORY.into(), "/custom/".into());
        assert_eq!(texture_location(&image), ("/custom/".to_string(), "from_custom.dds".to_string()));

        image.properties.texture_filename = Some("typed.dds".into());
        assert_eq!(texture_location(&image).1, "typed.dds");
    }
}
