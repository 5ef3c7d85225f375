//! Import and export entry points.
//!
//! Each call owns a fresh scene and runs its phases in order: decode, split,
//! resolve, look up textures, map, write on import; read host, map, fit
//! meshes, encode on export. Failures abort the call; recoverable findings
//! come back in the report's diagnostics.

pub mod error;
pub mod export;
pub mod import;
pub mod options;
pub mod summary;

pub use error::FmdlError;
pub use export::{export_file, export_scene, ExportReport};
pub use import::{import_bytes, import_file, ImportReport};
pub use options::{load_options, ExportOptions, ImportOptions};
pub use summary::{export_summary, inspect};
