use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Which configuration tier supplied the template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TemplateSourceKind {
    PerTypeSetting,
    HackathonField,
    LegacyFile,
    BuiltinDefault,
}

impl TemplateSourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateSourceKind::PerTypeSetting => "perTypeSetting",
            TemplateSourceKind::HackathonField => "hackathonField",
            TemplateSourceKind::LegacyFile => "legacyFile",
            TemplateSourceKind::BuiltinDefault => "builtinDefault",
        }
    }
}

impl fmt::Display for TemplateSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the template image lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum TemplateLocation {
    LocalPath(PathBuf),
    RemoteUrl(String),
}

impl TemplateLocation {
    pub fn is_remote(&self) -> bool {
        matches!(self, TemplateLocation::RemoteUrl(_))
    }
}

impl fmt::Display for TemplateLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateLocation::LocalPath(path) => write!(f, "{}", path.display()),
            TemplateLocation::RemoteUrl(url) => f.write_str(url),
        }
    }
}

/// The single template chosen for a render request.
///
/// A `LocalPath` from any tier other than the builtin default has been checked
/// to exist by the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateReference {
    pub source_kind: TemplateSourceKind,
    pub location: TemplateLocation,
}

impl TemplateReference {
    pub fn new(source_kind: TemplateSourceKind, location: TemplateLocation) -> Self {
        Self {
            source_kind,
            location,
        }
    }
}

impl fmt::Display for TemplateReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.location, self.source_kind)
    }
}
