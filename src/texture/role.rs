//! Texture role recovery from ranked metadata sources.
//!
//! A role can be recorded in several places, none of them guaranteed to
//! survive a trip through the authoring tool. Sources are tried in a fixed
//! order and the first one that yields a vocabulary token wins.

use crate::scene::TextureRole;
use crate::validation::report::{Diagnostic, DiagnosticKind, Diagnostics};

/// Where a role was recovered from, most reliable first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleSource {
    /// Typed property written on the image by a previous round-trip.
    Structured,
    /// Custom property on the owning object; may be stale after a rename.
    CustomProperty,
    /// `[role] filename` display name, or a name that is itself a role token.
    DisplayName,
}

pub const ROLE_SOURCE_ORDER: [RoleSource; 3] = [
    RoleSource::Structured,
    RoleSource::CustomProperty,
    RoleSource::DisplayName,
];

/// Raw role signals available for one texture.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoleSignals {
    pub structured: Option<String>,
    pub custom: Option<String>,
    pub display_name: Option<String>,
}

impl RoleSignals {
    fn try_source(&self, source: RoleSource) -> Option<TextureRole> {
        match source {
            RoleSource::Structured => self.structured.as_deref().and_then(TextureRole::from_token),
            RoleSource::CustomProperty => self.custom.as_deref().and_then(TextureRole::from_token),
            RoleSource::DisplayName => self.display_name.as_deref().and_then(parse_display_name),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoleResolution {
    pub role: TextureRole,
    /// `None` when no source produced a role.
    pub source: Option<RoleSource>,
}

/// Resolve a role without reporting.
pub fn resolve_role(signals: &RoleSignals) -> RoleResolution {
    for source in ROLE_SOURCE_ORDER {
        if let Some(role) = signals.try_source(source) {
            return RoleResolution {
                role,
                source: Some(source),
            };
        }
    }
    RoleResolution {
        role: TextureRole::Unknown,
        source: None,
    }
}

/// Resolve a role, recording one diagnostic when it stays unknown.
pub fn resolve_role_reporting(
    texture: &str,
    signals: &RoleSignals,
    diagnostics: &mut Diagnostics,
) -> RoleResolution {
    let resolution = resolve_role(signals);
    match resolution.source {
        Some(source) => log::debug!("texture '{}' role {} from {:?}", texture, resolution.role, source),
        None => diagnostics.add(Diagnostic::warning(
            DiagnosticKind::RoleResolution,
            "TEXTURE_ROLE_UNKNOWN",
            texture,
            "No texture role could be recovered. The texture is kept but not bound to a material channel.",
        )),
    }
    resolution
}

/// Split a `[TOKEN] filename` display name into its bracket token and the
/// remaining filename. Names without a bracket prefix return no token.
pub fn split_display_name(name: &str) -> (Option<&str>, &str) {
    let trimmed = name.trim();
    if let Some(rest) = trimmed.strip_prefix('[') {
        if let Some(end) = rest.find(']') {
            return (Some(&rest[..end]), rest[end + 1..].trim_start());
        }
    }
    (None, trimmed)
}

/// Parse a role out of a display name.
///
/// Accepts `[TOKEN] filename` and a bare name that is exactly a vocabulary
/// token. A bracket prefix with an unrecognized token does not fall back to
/// the bare-name form.
pub fn parse_display_name(name: &str) -> Option<TextureRole> {
    match split_display_name(name) {
        (Some(token), _) => TextureRole::from_token(token),
        (None, bare) => TextureRole::from_token(bare),
    }
}
