//! Texture semantics: role recovery, colorspace selection and file lookup.

pub mod colorspace;
pub mod role;
pub mod search;

pub use colorspace::{match_colorspace, resolve_colorspace};
pub use role::{parse_display_name, resolve_role, resolve_role_reporting, RoleSignals, RoleSource};
pub use search::{default_search_paths, find_texture};
