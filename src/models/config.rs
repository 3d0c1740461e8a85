use crate::assets::AssetLoader;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration loaded from config.yaml
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Root directory that local template paths are resolved against
    #[serde(default = "default_assets_dir")]
    pub assets_dir: PathBuf,

    /// Builtin default template (relative to `assets_dir`)
    #[serde(default = "default_template")]
    pub default_template: PathBuf,

    /// System-wide legacy settings JSON file
    #[serde(default = "default_legacy_settings_file")]
    pub legacy_settings_file: Option<PathBuf>,

    /// Optional JSON file with settings records and hackathon rows
    #[serde(default)]
    pub store_file: Option<PathBuf>,

    #[serde(default)]
    pub http: HttpSettings,

    #[serde(default)]
    pub fonts: FontSettings,

    /// Settings records keyed `certificate_settings_{hackathonId}_{type}`
    #[serde(default)]
    pub settings: HashMap<String, serde_json::Value>,

    /// Hackathon rows keyed by hackathon id
    #[serde(default)]
    pub hackathons: HashMap<String, HackathonRecord>,
}

fn default_assets_dir() -> PathBuf {
    PathBuf::from("./public")
}

fn default_template() -> PathBuf {
    PathBuf::from("templates/default-certificate.png")
}

fn default_legacy_settings_file() -> Option<PathBuf> {
    Some(PathBuf::from("./data/certificate-settings.json"))
}

/// Remote template fetching limits
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct HttpSettings {
    /// Request timeout in seconds, clamped to 5..=10
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Largest template body accepted, in bytes
    #[serde(default = "default_max_template_bytes")]
    pub max_template_bytes: usize,

    /// Largest accepted template width or height, in pixels
    #[serde(default = "default_max_dimension")]
    pub max_dimension: u32,
}

const MIN_TIMEOUT_SECS: u64 = 5;
const MAX_TIMEOUT_SECS: u64 = 10;

fn default_timeout_secs() -> u64 {
    8
}

fn default_max_template_bytes() -> usize {
    20 * 1024 * 1024
}

fn default_max_dimension() -> u32 {
    8000
}

impl HttpSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.clamp(MIN_TIMEOUT_SECS, MAX_TIMEOUT_SECS))
    }
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_template_bytes: default_max_template_bytes(),
            max_dimension: default_max_dimension(),
        }
    }
}

/// Startup font registration
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct FontSettings {
    /// Family name that `nameFont` descriptors refer to
    #[serde(default = "default_canonical_family")]
    pub canonical_family: String,

    /// Font files probed in order; the first one that exists is registered
    #[serde(default = "default_font_candidates")]
    pub candidates: Vec<PathBuf>,

    /// Load system fonts as the fallback
    #[serde(default = "default_true")]
    pub load_system_fonts: bool,

    /// Fail startup when no candidate font exists
    #[serde(default)]
    pub strict: bool,
}

fn default_canonical_family() -> String {
    "Arial".to_string()
}

fn default_true() -> bool {
    true
}

// DejaVu Sans and Arial Unicode cover Latin and Arabic.
fn default_font_candidates() -> Vec<PathBuf> {
    [
        "./fonts/certificate.ttf",
        "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
        "/System/Library/Fonts/Supplemental/Arial Unicode.ttf",
        "/Library/Fonts/Arial Unicode.ttf",
        "C:\\Windows\\Fonts\\arial.ttf",
    ]
    .into_iter()
    .map(PathBuf::from)
    .collect()
}

impl Default for FontSettings {
    fn default() -> Self {
        Self {
            canonical_family: default_canonical_family(),
            candidates: default_font_candidates(),
            load_system_fonts: true,
            strict: false,
        }
    }
}

/// The part of a hackathon row this engine reads
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct HackathonRecord {
    #[serde(default, alias = "certificateTemplate")]
    pub certificate_template: Option<String>,
}

impl AppConfig {
    /// Load configuration from AssetLoader (embedded or external)
    pub fn load_from_assets(loader: &AssetLoader) -> Self {
        match loader.read_config_string() {
            Ok(content) => Self::parse_or_default(&content),
            Err(e) => {
                tracing::warn!(%e, "Failed to read config, using defaults");
                Self::default()
            }
        }
    }

    fn parse_or_default(content: &str) -> Self {
        match serde_yaml::from_str::<Self>(content) {
            Ok(config) => {
                tracing::info!(
                    assets_dir = %config.assets_dir.display(),
                    settings = config.settings.len(),
                    hackathons = config.hackathons.len(),
                    "Loaded configuration"
                );
                config
            }
            Err(e) => {
                tracing::warn!(%e, "Failed to parse config, using defaults");
                Self::default()
            }
        }
    }

    /// Apply `ASSETS_DIR`, `LEGACY_SETTINGS_FILE` and `FONTS_DIR` overrides
    pub fn apply_env_overrides(&mut self) {
        if let Ok(dir) = std::env::var("ASSETS_DIR") {
            self.assets_dir = PathBuf::from(dir);
        }
        if let Ok(file) = std::env::var("LEGACY_SETTINGS_FILE") {
            self.legacy_settings_file = Some(PathBuf::from(file));
        }
        if let Ok(dir) = std::env::var("FONTS_DIR") {
            self.fonts.prepend_dir(&PathBuf::from(dir));
        }
    }

    /// Absolute location of the builtin default template on disk
    pub fn default_template_path(&self) -> PathBuf {
        self.assets_dir.join(&self.default_template)
    }
}

impl FontSettings {
    /// Put every font file found in `dir` ahead of the configured candidates
    pub fn prepend_dir(&mut self, dir: &std::path::Path) {
        let Ok(entries) = std::fs::read_dir(dir) else {
            tracing::warn!(dir = %dir.display(), "Fonts directory not readable");
            return;
        };
        let mut found: Vec<PathBuf> = entries
            .flatten()
            .map(|e| e.path())
            .filter(|p| {
                matches!(
                    p.extension().and_then(|e| e.to_str()),
                    Some("ttf" | "otf" | "ttc")
                )
            })
            .collect();
        found.sort();
        found.extend(std::mem::take(&mut self.candidates));
        self.candidates = found;
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            assets_dir: default_assets_dir(),
            default_template: default_template(),
            legacy_settings_file: default_legacy_settings_file(),
            store_file: None,
            http: HttpSettings::default(),
            fonts: FontSettings::default(),
            settings: HashMap::new(),
            hackathons: HashMap::new(),
        }
    }
}
