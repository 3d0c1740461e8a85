use std::path::PathBuf;

use crate::models::PartialStyle;

/// System-wide legacy defaults from the settings JSON file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegacySettings {
    pub style: PartialStyle,
    pub certificate_template: Option<String>,
}

impl LegacySettings {
    pub fn from_value(value: &serde_json::Value) -> Self {
        Self {
            style: PartialStyle::from_record(value),
            certificate_template: value
                .get("certificateTemplate")
                .and_then(|v| v.as_str())
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        }
    }
}

/// Read-only source of legacy settings.
///
/// `None` means the tier contributes nothing, whether the backing file is
/// missing or unreadable.
pub trait LegacySettingsProvider: Send + Sync {
    fn read(&self) -> Option<LegacySettings>;
}

/// Legacy settings backed by a JSON file, re-read on every call
pub struct JsonFileLegacySettings {
    path: PathBuf,
}

impl JsonFileLegacySettings {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl LegacySettingsProvider for JsonFileLegacySettings {
    fn read(&self) -> Option<LegacySettings> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::trace!(path = %self.path.display(), "No legacy settings file");
                return None;
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), %e, "Failed to read legacy settings");
                return None;
            }
        };

        match serde_json::from_str::<serde_json::Value>(&content) {
            Ok(value @ serde_json::Value::Object(_)) => Some(LegacySettings::from_value(&value)),
            Ok(_) => {
                tracing::warn!(
                    path = %self.path.display(),
                    "Legacy settings file is not a JSON object, ignoring"
                );
                None
            }
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    %e,
                    "Malformed legacy settings file, ignoring"
                );
                None
            }
        }
    }
}

/// Fixed legacy settings, or none at all
#[derive(Debug, Clone, Default)]
pub struct StaticLegacySettings(pub Option<LegacySettings>);

impl LegacySettingsProvider for StaticLegacySettings {
    fn read(&self) -> Option<LegacySettings> {
        self.0.clone()
    }
}
