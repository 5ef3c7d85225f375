//! On-disk texture lookup for textures that are referenced, not embedded.

use std::path::{Path, PathBuf};

use crate::scene::Texture;
use crate::validation::report::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::validation::rules::validate_texture_dimensions;

/// Alternative extensions tried for every texture filename.
pub const TEXTURE_EXTENSIONS: [&str; 3] = ["dds", "tga", "ftex"];

const SHARED_DIRECTORIES: [&str; 2] = ["Common", "Kit Textures"];

/// Directories searched for the textures of `fmdl_path`: the file's
/// directory, its parent and grandparent, then `Common` and `Kit Textures`
/// under each of those. Only existing directories are returned.
pub fn default_search_paths(fmdl_path: &Path) -> Vec<PathBuf> {
    let mut bases = vec![];
    let mut current = fmdl_path.parent();
    while let Some(dir) = current {
        if bases.len() == 3 {
            break;
        }
        let dir = if dir.as_os_str().is_empty() { Path::new(".") } else { dir };
        bases.push(dir.to_path_buf());
        current = dir.parent();
    }

    let mut candidates = bases.clone();
    for shared in SHARED_DIRECTORIES {
        candidates.extend(bases.iter().map(|base| base.join(shared)));
    }

    let mut paths: Vec<PathBuf> = vec![];
    for candidate in candidates {
        if candidate.is_dir() && !paths.contains(&candidate) {
            paths.push(candidate);
        }
    }
    paths
}

/// Filenames to try for `filename`: as written, then with each known
/// extension swapped in.
fn filename_candidates(filename: &str) -> Vec<String> {
    let base = match filename.rfind('.') {
        Some(pos) => &filename[..pos],
        None => filename,
    };

    let mut names = vec![filename.to_string()];
    for ext in TEXTURE_EXTENSIONS {
        let candidate = format!("{}.{}", base, ext);
        if !names.contains(&candidate) {
            names.push(candidate);
        }
    }
    names
}

/// Locate `texture` under `search_path`.
///
/// The engine path (`directory` + `filename`, backslashes normalized) is
/// tried with every trailing suffix of its directory components, longest
/// first, under every search directory.
pub fn find_texture(texture: &Texture, search_path: &[PathBuf]) -> Option<PathBuf> {
    let directory = texture.directory.replace('\\', "/");
    let filename = texture.filename.replace('\\', "/");
    let joined = format!(
        "{}/{}",
        directory.trim_end_matches('/'),
        filename.trim_start_matches('/')
    );

    let components: Vec<&str> = joined.split('/').filter(|c| !c.is_empty()).collect();
    let (filename, directories) = components.split_last()?;
    let names = filename_candidates(filename);

    for search_dir in search_path {
        for start in 0..=directories.len() {
            let mut dir = search_dir.clone();
            dir.extend(&directories[start..]);
            for name in &names {
                let candidate = dir.join(name);
                if candidate.is_file() {
                    return Some(candidate);
                }
            }
        }
    }
    None
}

/// Read the dimensions of a found texture and check them against engine
/// limits. `.ftex` files are not probed.
pub fn probe_texture(path: &Path, subject: &str, diagnostics: &mut Diagnostics) -> Option<(u32, u32)> {
    let is_ftex = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("ftex"))
        .unwrap_or(false);
    if is_ftex {
        return None;
    }

    match image::image_dimensions(path) {
        Ok((width, height)) => {
            diagnostics.extend(validate_texture_dimensions(subject, width, height));
            Some((width, height))
        }
        Err(e) => {
            diagnostics.add(Diagnostic::info(
                DiagnosticKind::TextureLookup,
                "TEXTURE_UNREADABLE",
                subject,
                format!("Could not read {}: {}", path.display(), e),
            ));
            None
        }
    }
}
