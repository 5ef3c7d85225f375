pub mod fmdl;
pub mod host;
pub mod mapping;
pub mod math;
pub mod mesh_processing;
pub mod pipeline;
pub mod presets;
pub mod scene;
pub mod texture;
pub mod validation;

pub use pipeline::{
    export_file, export_scene, export_summary, import_bytes, import_file, inspect, ExportOptions,
    FmdlError, ImportOptions,
};
