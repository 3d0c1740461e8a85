use std::sync::Arc;

use super::config_store::{per_type_record, ConfigStore};
use super::legacy_settings::LegacySettings;
use crate::models::{CertificateType, PartialStyle, StyleConfig};

/// Resolves the name style field by field across tiers:
/// per-type settings record, then legacy settings, then builtin defaults.
///
/// The legacy tier is a snapshot read by the caller, so one rendering sees a
/// single version of the legacy file for both style and template.
pub struct StyleSettingsResolver {
    store: Arc<dyn ConfigStore>,
}

impl StyleSettingsResolver {
    pub fn new(store: Arc<dyn ConfigStore>) -> Self {
        Self { store }
    }

    pub fn resolve(
        &self,
        hackathon_id: Option<&str>,
        certificate_type: CertificateType,
        legacy: Option<&LegacySettings>,
    ) -> StyleConfig {
        let per_type = hackathon_id
            .filter(|_| certificate_type.has_override_set())
            .and_then(|id| per_type_record(self.store.as_ref(), id, certificate_type))
            .map(|record| PartialStyle::from_record(&record))
            .unwrap_or_default();

        let legacy = legacy
            .map(|settings| settings.style.clone())
            .unwrap_or_default();

        tracing::debug!(
            hackathon_id = ?hackathon_id,
            certificate_type = %certificate_type,
            per_type_fields = !per_type.is_empty(),
            legacy_fields = !legacy.is_empty(),
            "Resolving certificate style"
        );

        per_type.or(legacy).finish()
    }
}
