use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{PoisonError, RwLock};

use crate::models::{AppConfig, CertificateType, HackathonRecord};

/// Failure to read from a settings backend
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Store IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Key of the per-hackathon, per-type settings record
pub fn settings_key(hackathon_id: &str, certificate_type: CertificateType) -> String {
    format!("certificate_settings_{hackathon_id}_{certificate_type}")
}

/// Read-only view of the settings store owned by the admin side
pub trait ConfigStore: Send + Sync {
    /// Fetch a settings record by key
    fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError>;

    /// The hackathon row's legacy `certificateTemplate` column
    fn hackathon_certificate_template(
        &self,
        hackathon_id: &str,
    ) -> Result<Option<String>, StoreError>;
}

/// JSON document layout accepted by [`InMemoryConfigStore::load_json`]
#[derive(Debug, Default, Deserialize)]
struct StoreDocument {
    #[serde(default)]
    settings: HashMap<String, serde_json::Value>,
    #[serde(default)]
    hackathons: HashMap<String, HackathonRecord>,
}

/// In-memory settings store
#[derive(Default)]
pub struct InMemoryConfigStore {
    settings: RwLock<HashMap<String, serde_json::Value>>,
    hackathons: RwLock<HashMap<String, HackathonRecord>>,
}

impl InMemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from the `settings` and `hackathons` sections of the app config
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            settings: RwLock::new(config.settings.clone()),
            hackathons: RwLock::new(config.hackathons.clone()),
        }
    }

    /// Merge records from a JSON store file
    pub fn load_json(&self, path: &Path) -> Result<(), StoreError> {
        let content = std::fs::read_to_string(path)?;
        let doc: StoreDocument = serde_json::from_str(&content)?;

        tracing::info!(
            path = %path.display(),
            settings = doc.settings.len(),
            hackathons = doc.hackathons.len(),
            "Loaded settings store"
        );

        self.settings
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(doc.settings);
        self.hackathons
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(doc.hackathons);
        Ok(())
    }

    pub fn insert_setting(&self, key: impl Into<String>, record: serde_json::Value) {
        self.settings
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), record);
    }

    pub fn insert_hackathon(&self, hackathon_id: impl Into<String>, record: HackathonRecord) {
        self.hackathons
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(hackathon_id.into(), record);
    }
}

impl ConfigStore for InMemoryConfigStore {
    fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError> {
        let settings = self
            .settings
            .read()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(settings.get(key).cloned())
    }

    fn hackathon_certificate_template(
        &self,
        hackathon_id: &str,
    ) -> Result<Option<String>, StoreError> {
        let hackathons = self
            .hackathons
            .read()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(hackathons
            .get(hackathon_id)
            .and_then(|h| h.certificate_template.clone()))
    }
}

/// Look up the per-type record, decoding records stored as JSON text.
///
/// Read failures and undecodable records are logged and treated as absent.
pub fn per_type_record(
    store: &dyn ConfigStore,
    hackathon_id: &str,
    certificate_type: CertificateType,
) -> Option<serde_json::Value> {
    let key = settings_key(hackathon_id, certificate_type);
    let value = match store.get(&key) {
        Ok(value) => value?,
        Err(e) => {
            tracing::warn!(%key, %e, "Settings store read failed, skipping per-type tier");
            return None;
        }
    };

    match value {
        serde_json::Value::Object(_) => Some(value),
        serde_json::Value::String(text) => match serde_json::from_str(&text) {
            Ok(decoded @ serde_json::Value::Object(_)) => Some(decoded),
            Ok(_) | Err(_) => {
                tracing::warn!(%key, "Settings record is not a JSON object, ignoring");
                None
            }
        },
        serde_json::Value::Null => None,
        _ => {
            tracing::warn!(%key, "Settings record is not a JSON object, ignoring");
            None
        }
    }
}
