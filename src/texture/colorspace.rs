//! Mapping abstract colorspace intents onto whatever names the host offers.
//!
//! Each intent has a ranked preference list and a safe default. Resolution
//! never fails: the worst case is the default plus a warning.

use crate::scene::ColorspaceIntent;
use crate::validation::report::{Diagnostic, DiagnosticKind, Diagnostics};

/// Used when the host cannot enumerate its colorspaces.
pub const BUILTIN_COLORSPACES: [&str; 5] = ["sRGB", "Non-Color", "Linear Rec.709", "Linear", "Raw"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preference {
    Exact(&'static str),
    Contains(&'static str),
    ContainsIgnoreCase(&'static str),
    Prefix(&'static str),
}

impl Preference {
    pub fn matches(&self, name: &str) -> bool {
        match self {
            Preference::Exact(s) => name == *s,
            Preference::Contains(s) => name.contains(s),
            Preference::ContainsIgnoreCase(s) => name.to_lowercase().contains(&s.to_lowercase()),
            Preference::Prefix(s) => name.starts_with(s),
        }
    }

    fn describe(&self) -> String {
        match self {
            Preference::Exact(s) => format!("'{}'", s),
            Preference::Contains(s) => format!("a name containing '{}'", s),
            Preference::ContainsIgnoreCase(s) => format!("a name containing '{}' (any case)", s),
            Preference::Prefix(s) => format!("a name starting with '{}'", s),
        }
    }
}

const SRGB_PREFERENCES: [Preference; 3] = [
    Preference::Exact("sRGB"),
    Preference::Contains("Filmic sRGB"),
    Preference::ContainsIgnoreCase("srgb"),
];

const LINEAR_PREFERENCES: [Preference; 2] = [
    Preference::Exact("Linear Rec.709"),
    Preference::Prefix("Linear"),
];

const NON_COLOR_PREFERENCES: [Preference; 3] = [
    Preference::Exact("Non-Color"),
    Preference::ContainsIgnoreCase("utility"),
    Preference::ContainsIgnoreCase("raw"),
];

pub fn preferences(intent: ColorspaceIntent) -> &'static [Preference] {
    match intent {
        ColorspaceIntent::Srgb => &SRGB_PREFERENCES,
        ColorspaceIntent::Linear => &LINEAR_PREFERENCES,
        ColorspaceIntent::NonColor => &NON_COLOR_PREFERENCES,
    }
}

pub fn safe_default(intent: ColorspaceIntent) -> &'static str {
    match intent {
        ColorspaceIntent::Srgb => "sRGB",
        ColorspaceIntent::Linear => "sRGB",
        ColorspaceIntent::NonColor => "Non-Color",
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorspaceChoice {
    pub name: String,
    /// Position in the preference list that matched; `None` for the default.
    pub rank: Option<usize>,
}

/// Pick a colorspace for `intent` out of `available`.
pub fn match_colorspace(intent: ColorspaceIntent, available: &[String]) -> ColorspaceChoice {
    let builtin: Vec<String>;
    let available: &[String] = if available.is_empty() {
        builtin = BUILTIN_COLORSPACES.iter().map(|s| s.to_string()).collect();
        &builtin
    } else {
        available
    };

    for (rank, preference) in preferences(intent).iter().enumerate() {
        if let Some(name) = available.iter().find(|name| preference.matches(name)) {
            return ColorspaceChoice {
                name: name.clone(),
                rank: Some(rank),
            };
        }
    }

    ColorspaceChoice {
        name: safe_default(intent).to_string(),
        rank: None,
    }
}

/// Resolve and report. A lower-ranked match yields a `COLORSPACE_SUBSTITUTED`
/// warning; no match yields a `COLORSPACE_DEFAULTED` warning naming the
/// default, which may not suit the texture at all.
pub fn resolve_colorspace(
    intent: ColorspaceIntent,
    available: &[String],
    subject: &str,
    diagnostics: &mut Diagnostics,
) -> String {
    let choice = match_colorspace(intent, available);
    let preferred = preferences(intent)[0].describe();

    match choice.rank {
        Some(0) => {}
        Some(_) => diagnostics.add(Diagnostic::warning(
            DiagnosticKind::ColorspaceSubstitution,
            "COLORSPACE_SUBSTITUTED",
            subject,
            format!(
                "Preferred {:?} colorspace {} is unavailable; using '{}'.",
                intent, preferred, choice.name
            ),
        )),
        None => diagnostics.add(Diagnostic::warning(
            DiagnosticKind::ColorspaceSubstitution,
            "COLORSPACE_DEFAULTED",
            subject,
            format!(
                "No {:?} colorspace matches the available names; falling back to '{}'. The texture will likely display wrong.",
                intent, choice.name
            ),
        )),
    }

    choice.name
}
