use serde::{Deserialize, Serialize};

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// What kind of recoverable problem a diagnostic describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    RoleResolution,
    ColorspaceSubstitution,
    MaterialIncomplete,
    MeshLimitExceeded,
    TextureLookup,
    Validation,
}

/// A single recoverable finding collected during import or export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Stable code for the rule that fired (e.g. "TEXTURE_ROLE_UNKNOWN").
    pub code: String,
    pub kind: DiagnosticKind,
    pub severity: Severity,
    /// Texture, material or mesh the finding is about.
    pub subject: String,
    /// Human-readable description.
    pub message: String,
}

impl Diagnostic {
    pub fn new(
        kind: DiagnosticKind,
        severity: Severity,
        code: &str,
        subject: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code: code.to_string(),
            kind,
            severity,
            subject: subject.into(),
            message: message.into(),
        }
    }

    pub fn warning(
        kind: DiagnosticKind,
        code: &str,
        subject: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(kind, Severity::Warning, code, subject, message)
    }

    pub fn info(
        kind: DiagnosticKind,
        code: &str,
        subject: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(kind, Severity::Info, code, subject, message)
    }

    fn log(&self) {
        match self.severity {
            Severity::Error => log::error!("[{}] {}: {}", self.code, self.subject, self.message),
            Severity::Warning => log::warn!("[{}] {}: {}", self.code, self.subject, self.message),
            Severity::Info => log::info!("[{}] {}: {}", self.code, self.subject, self.message),
        }
    }
}

/// Diagnostics returned alongside a successful import or export.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Diagnostics {
    pub items: Vec<Diagnostic>,
    pub error_count: u32,
    pub warning_count: u32,
    pub info_count: u32,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic, logging it at its severity.
    pub fn add(&mut self, item: Diagnostic) {
        item.log();
        self.record(item);
    }

    pub fn extend(&mut self, items: impl IntoIterator<Item = Diagnostic>) {
        for item in items {
            self.add(item);
        }
    }

    /// Merge another report into this one. Items were already logged when
    /// first added.
    pub fn merge(&mut self, other: Diagnostics) {
        for item in other.items {
            self.record(item);
        }
    }

    pub fn of_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(move |d| d.kind == kind)
    }

    pub fn has_code(&self, code: &str) -> bool {
        self.items.iter().any(|d| d.code == code)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn record(&mut self, item: Diagnostic) {
        match item.severity {
            Severity::Error => self.error_count += 1,
            Severity::Warning => self.warning_count += 1,
            Severity::Info => self.info_count += 1,
        }
        self.items.push(item);
    }
}
