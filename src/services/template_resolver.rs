//! Template source resolution.
//!
//! Tiers are tried whole-value, first usable one wins:
//! per-type settings record, hackathon row, legacy settings file, builtin default.
//! A local path that does not exist under the assets root is never returned;
//! resolution moves on to the next tier instead.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use super::config_store::{per_type_record, ConfigStore};
use super::legacy_settings::LegacySettings;
use crate::models::{CertificateType, TemplateLocation, TemplateReference, TemplateSourceKind};

pub struct TemplateSourceResolver {
    store: Arc<dyn ConfigStore>,
    assets_root: PathBuf,
    default_template: PathBuf,
}

impl TemplateSourceResolver {
    pub fn new(
        store: Arc<dyn ConfigStore>,
        assets_root: impl Into<PathBuf>,
        default_template: impl Into<PathBuf>,
    ) -> Self {
        Self {
            store,
            assets_root: assets_root.into(),
            default_template: default_template.into(),
        }
    }

    pub fn resolve(
        &self,
        hackathon_id: Option<&str>,
        certificate_type: CertificateType,
        legacy: Option<&LegacySettings>,
    ) -> TemplateReference {
        if let Some(id) = hackathon_id {
            if certificate_type.has_override_set() {
                let candidate = per_type_record(self.store.as_ref(), id, certificate_type)
                    .and_then(|record| {
                        record
                            .get("certificateTemplate")
                            .and_then(|v| v.as_str())
                            .map(str::to_string)
                    });
                if let Some(found) =
                    self.accept(TemplateSourceKind::PerTypeSetting, candidate.as_deref())
                {
                    return found;
                }
            }

            let candidate = match self.store.hackathon_certificate_template(id) {
                Ok(value) => value,
                Err(e) => {
                    tracing::warn!(hackathon_id = %id, %e, "Hackathon lookup failed, skipping tier");
                    None
                }
            };
            if let Some(found) = self.accept(TemplateSourceKind::HackathonField, candidate.as_deref())
            {
                return found;
            }
        }

        let candidate = legacy.and_then(|s| s.certificate_template.as_deref());
        if let Some(found) = self.accept(TemplateSourceKind::LegacyFile, candidate) {
            return found;
        }

        tracing::debug!(
            hackathon_id = ?hackathon_id,
            certificate_type = %certificate_type,
            "Using builtin default template"
        );
        self.builtin_default()
    }

    /// The builtin default; its presence is a deployment invariant
    pub fn builtin_default(&self) -> TemplateReference {
        TemplateReference::new(
            TemplateSourceKind::BuiltinDefault,
            TemplateLocation::LocalPath(self.assets_root.join(&self.default_template)),
        )
    }

    fn accept(&self, kind: TemplateSourceKind, value: Option<&str>) -> Option<TemplateReference> {
        let value = value.map(str::trim).filter(|v| !v.is_empty())?;
        match self.classify(value) {
            Some(location) => {
                tracing::debug!(source = %kind, location = %location, "Template resolved");
                Some(TemplateReference::new(kind, location))
            }
            None => {
                tracing::debug!(source = %kind, value, "Template tier unusable, falling through");
                None
            }
        }
    }

    /// Classify a stored template value, verifying local files exist
    fn classify(&self, value: &str) -> Option<TemplateLocation> {
        if is_remote(value) {
            return Some(TemplateLocation::RemoteUrl(value.to_string()));
        }

        let relative = sanitize_relative(value)?;
        let full = self.assets_root.join(relative);
        if full.is_file() {
            Some(TemplateLocation::LocalPath(full))
        } else {
            tracing::warn!(path = %full.display(), "Configured template does not exist");
            None
        }
    }
}

fn is_remote(value: &str) -> bool {
    let lower = value.get(..8).unwrap_or(value).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Web-style paths (`/uploads/x.png`) are rooted at the assets directory.
/// Paths escaping it via `..` are rejected.
fn sanitize_relative(value: &str) -> Option<&Path> {
    let path = Path::new(value.trim_start_matches(['/', '\\']));
    let mut has_file = false;
    for component in path.components() {
        match component {
            Component::Normal(_) => has_file = true,
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                tracing::warn!(value, "Rejecting template path outside assets root");
                return None;
            }
        }
    }
    has_file.then_some(path)
}
