//! Built-in material presets for the engine's stock shaders.

use crate::scene::{Material, MaterialParameter};

const COMMON_SOURCE_IMAGES: &str = "/Assets/pes16/model/character/common/sourceimages/";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PresetTexture {
    pub role: &'static str,
    pub directory: &'static str,
    pub filename: &'static str,
    pub required: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PresetParameter {
    pub name: &'static str,
    pub default_values: [f32; 4],
    pub required: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialPreset {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub shader: &'static str,
    pub technique: &'static str,
    pub anti_blur_default: bool,
    /// The anti-blur setting is fixed to its default for this shader.
    pub anti_blur_required: bool,
    pub alpha_flags_default: u8,
    /// Bits the user may change.
    pub alpha_flags_mask: u8,
    pub shadow_flags_default: u8,
    pub shadow_flags_mask: u8,
    pub textures: &'static [PresetTexture],
    pub parameters: &'static [PresetParameter],
}

impl MaterialPreset {
    /// Whether materials using this shader must carry the anti-blur flag.
    pub fn forces_anti_blur(&self) -> bool {
        self.anti_blur_default && self.anti_blur_required
    }
}

const fn texture(role: &'static str, directory: &'static str, filename: &'static str, required: bool) -> PresetTexture {
    PresetTexture {
        role,
        directory,
        filename,
        required,
    }
}

const fn parameter(name: &'static str, default_values: [f32; 4], required: bool) -> PresetParameter {
    PresetParameter {
        name,
        default_values,
        required,
    }
}

const ALPHA_MASK: u8 = 255 & !32;
const SHADOW_MASK: u8 = 255 & !1 & !2;

static PRESETS: [MaterialPreset; 6] = [
    MaterialPreset {
        id: "blin_basic",
        name: "blin -- basic",
        description: "Blin shader, preconfigured with the most common settings",
        shader: "fox3ddf_blin",
        technique: "fox3DDF_Blin",
        anti_blur_default: false,
        anti_blur_required: true,
        alpha_flags_default: 128,
        alpha_flags_mask: ALPHA_MASK,
        shadow_flags_default: 0,
        shadow_flags_mask: SHADOW_MASK,
        textures: &[
            texture("Base_Tex_SRGB", "", "_bsm.dds", false),
            texture("NormalMap_Tex_NRM", COMMON_SOURCE_IMAGES, "dummy_nrm.dds", true),
            texture("SpecularMap_Tex_LIN", COMMON_SOURCE_IMAGES, "dummy_srm.dds", true),
        ],
        parameters: &[parameter("MatParamIndex_0", [0.0, 0.0, 0.0, 0.0], true)],
    },
    MaterialPreset {
        id: "blin_custom",
        name: "blin -- custom",
        description: "Blin shader, custom settings",
        shader: "fox3ddf_blin",
        technique: "fox3DDF_Blin",
        anti_blur_default: false,
        anti_blur_required: true,
        alpha_flags_default: 128,
        alpha_flags_mask: ALPHA_MASK & !128,
        shadow_flags_default: 0,
        shadow_flags_mask: SHADOW_MASK,
        textures: &[
            texture("Base_Tex_SRGB", "", "_bsm.dds", false),
            texture("NormalMap_Tex_NRM", COMMON_SOURCE_IMAGES, "dummy_nrm.dds", false),
            texture("SpecularMap_Tex_LIN", COMMON_SOURCE_IMAGES, "dummy_srm.dds", false),
        ],
        parameters: &[parameter("MatParamIndex_0", [0.0, 0.0, 0.0, 0.0], false)],
    },
    MaterialPreset {
        id: "constant",
        name: "constant",
        description: "Constant shader",
        shader: "fox3dfw_constant_srgb_ndr_solid",
        technique: "fox3DFW_ConstantSRGB_NDR_Solid",
        anti_blur_default: true,
        anti_blur_required: true,
        alpha_flags_default: 16,
        alpha_flags_mask: ALPHA_MASK,
        shadow_flags_default: 5,
        shadow_flags_mask: SHADOW_MASK,
        textures: &[texture("Base_Tex_SRGB", "", "_bsm.dds", false)],
        parameters: &[],
    },
    MaterialPreset {
        id: "constant_original",
        name: "constant -- original",
        description: "Constant shader, original version",
        shader: "fox3dfw_constant_srgb_ndr",
        technique: "fox3DFW_ConstantSRGB_NDR",
        anti_blur_default: true,
        anti_blur_required: true,
        alpha_flags_default: 16,
        alpha_flags_mask: ALPHA_MASK,
        shadow_flags_default: 5,
        shadow_flags_mask: SHADOW_MASK,
        textures: &[texture("Base_Tex_SRGB", "", "_bsm.dds", false)],
        parameters: &[],
    },
    MaterialPreset {
        id: "metalic",
        name: "metalic",
        description: "Metal shader",
        shader: "fox3ddf_ggx",
        technique: "fox3DDF_GGX",
        anti_blur_default: false,
        anti_blur_required: true,
        alpha_flags_default: 128,
        alpha_flags_mask: ALPHA_MASK,
        shadow_flags_default: 0,
        shadow_flags_mask: SHADOW_MASK,
        textures: &[
            texture("Base_Tex_SRGB", "", "_bsm.dds", false),
            texture("NormalMap_Tex_NRM", COMMON_SOURCE_IMAGES, "dummy_nrm.dds", false),
            texture("SpecularMap_Tex_LIN", "", "_srm.dds", false),
            texture("MetalnessMap_Tex_LIN", "", "_mtl.dds", false),
        ],
        parameters: &[parameter("MatParamIndex_0", [0.0, 0.0, 0.0, 0.0], false)],
    },
    MaterialPreset {
        id: "glass",
        name: "glass",
        description: "Glass shader",
        shader: "pes3dfw_glass2",
        technique: "pes3DFW_Glass2",
        anti_blur_default: false,
        anti_blur_required: false,
        alpha_flags_default: 16,
        alpha_flags_mask: ALPHA_MASK,
        shadow_flags_default: 5,
        shadow_flags_mask: SHADOW_MASK,
        textures: &[
            texture("Base_Tex_SRGB", "", "_bsm.dds", false),
            texture("NormalMap_Tex_NRM", COMMON_SOURCE_IMAGES, "dummy_nrm.dds", false),
            texture("GlassReflection_Tex_SRGB", "", "_cbm.dds", false),
            texture("GlassReflectionMask_Tex_LIN", "", "_rfm.dds", false),
        ],
        parameters: &[
            parameter("MatParamIndex_0", [54.0, 0.0, 0.0, 0.0], false),
            parameter("ReflectionIntensity", [1.0, 0.0, 0.0, 0.0], false),
            parameter("GlassRoughness", [0.0, 0.0, 0.0, 0.0], false),
            parameter("GlassFlatness", [0.0, 0.0, 0.0, 0.0], false),
            parameter("PCBoxCenter", [0.0, 15.0, 0.0, 0.0], false),
            parameter("PCBoxSize", [250.0, 80.0, 250.0, 0.0], false),
        ],
    },
];

pub fn presets() -> &'static [MaterialPreset] {
    &PRESETS
}

pub fn preset(id: &str) -> Option<&'static MaterialPreset> {
    PRESETS.iter().find(|p| p.id == id)
}

/// First preset using `shader`.
pub fn preset_for_shader(shader: &str) -> Option<&'static MaterialPreset> {
    PRESETS.iter().find(|p| p.shader == shader)
}

/// Set shader, technique and flags from the preset and replace the
/// material's parameters with the preset defaults. Texture bindings are
/// left alone.
pub fn apply_preset(material: &mut Material, preset: &MaterialPreset) {
    material.shader = preset.shader.to_string();
    material.technique = preset.technique.to_string();
    material.anti_blur = preset.anti_blur_default;
    material.alpha_flags = preset.alpha_flags_default;
    material.shadow_flags = preset.shadow_flags_default;
    material.parameters = preset
        .parameters
        .iter()
        .map(|p| MaterialParameter {
            name: p.name.to_string(),
            values: p.default_values,
        })
        .collect();
}
