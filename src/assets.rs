//! Asset loading with embedded fallbacks
//!
//! The builtin default certificate template and the default config are compiled
//! into the binary:
//!
//! - Templates are read from the configured assets directory first, then from the
//!   embedded copy, so the builtin default is always available
//! - `seed_if_configured` writes embedded templates that are missing on disk
//! - The config file comes from `CONFIG_FILE` when set and present, else embedded

use rust_embed::RustEmbed;
use std::borrow::Cow;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Embedded certificate templates
#[derive(RustEmbed)]
#[folder = "assets/"]
#[include = "**/*.png"]
#[include = "**/*.jpg"]
#[include = "**/*.jpeg"]
struct EmbeddedAssets;

/// Embedded default config
#[derive(RustEmbed)]
#[folder = "."]
#[include = "config.yaml"]
struct EmbeddedConfig;

/// Asset category for selective operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetCategory {
    Templates,
    Config,
}

/// Report of seeding operations
#[derive(Debug, Default)]
pub struct SeedReport {
    pub templates_seeded: Vec<String>,
}

impl SeedReport {
    pub fn is_empty(&self) -> bool {
        self.templates_seeded.is_empty()
    }
}

/// Report of init (extraction) operations
#[derive(Debug, Default)]
pub struct InitReport {
    pub written: Vec<String>,
    pub skipped: Vec<String>,
}

/// Asset loader with optional filesystem override
#[derive(Debug, Clone, Default)]
pub struct AssetLoader {
    /// Assets root that local template paths resolve against
    assets_dir: Option<PathBuf>,
    /// External config file path (from CONFIG_FILE env var)
    config_file: Option<PathBuf>,
}

impl AssetLoader {
    /// Create a new asset loader
    ///
    /// With no assets directory, only embedded templates are available.
    pub fn new(assets_dir: Option<PathBuf>, config_file: Option<PathBuf>) -> Self {
        Self {
            assets_dir,
            config_file,
        }
    }

    /// Same loader rooted at a different assets directory
    pub fn with_assets_dir(mut self, assets_dir: impl Into<PathBuf>) -> Self {
        self.assets_dir = Some(assets_dir.into());
        self
    }

    pub fn assets_dir(&self) -> Option<&Path> {
        self.assets_dir.as_deref()
    }

    /// Read a template asset relative to the assets root.
    ///
    /// Tries the filesystem first, then falls back to embedded.
    pub fn read_template(&self, relative_path: &Path) -> io::Result<Cow<'static, [u8]>> {
        if let Some(ref dir) = self.assets_dir {
            let full_path = dir.join(relative_path);
            if full_path.is_file() {
                tracing::trace!(path = %full_path.display(), "Loading template from filesystem");
                return Ok(Cow::Owned(fs::read(&full_path)?));
            }
        }

        let key = embedded_key(relative_path);
        EmbeddedAssets::get(&key)
            .map(|f| {
                tracing::trace!(path = %key, "Loading template from embedded assets");
                f.data
            })
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::NotFound, format!("Template not found: {key}"))
            })
    }

    /// Whether an embedded copy exists for this relative path
    pub fn has_embedded(relative_path: &Path) -> bool {
        EmbeddedAssets::get(&embedded_key(relative_path)).is_some()
    }

    /// Read the config file
    ///
    /// If an external path is configured and exists, uses that.
    /// Otherwise falls back to embedded config.
    pub fn read_config(&self) -> io::Result<Cow<'static, [u8]>> {
        if let Some(ref path) = self.config_file {
            if path.exists() {
                tracing::trace!(path = %path.display(), "Loading config from filesystem");
                return Ok(Cow::Owned(fs::read(path)?));
            }
        }

        EmbeddedConfig::get("config.yaml")
            .map(|f| {
                tracing::trace!("Loading config from embedded assets");
                f.data
            })
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::NotFound, "Embedded config.yaml not found")
            })
    }

    /// Read config as a UTF-8 string
    pub fn read_config_string(&self) -> io::Result<String> {
        let bytes = self.read_config()?;
        String::from_utf8(bytes.into_owned())
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Write embedded templates that are missing from the assets directory.
    ///
    /// Existing files are never touched.
    pub fn seed_if_configured(&self) -> io::Result<SeedReport> {
        let mut report = SeedReport::default();

        let Some(ref dir) = self.assets_dir else {
            return Ok(report);
        };

        for file in EmbeddedAssets::iter() {
            let path = dir.join(file.as_ref());
            if path.exists() {
                continue;
            }
            if let Some(data) = EmbeddedAssets::get(&file) {
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(&path, &*data.data)?;
                report.templates_seeded.push(file.to_string());
            }
        }

        if !report.templates_seeded.is_empty() {
            tracing::info!(
                dir = %dir.display(),
                count = report.templates_seeded.len(),
                "Seeded assets directory with embedded templates"
            );
        }

        Ok(report)
    }

    /// Extract embedded assets to filesystem (init command)
    pub fn init(&self, categories: &[AssetCategory], force: bool) -> io::Result<InitReport> {
        let mut report = InitReport::default();

        for category in categories {
            match category {
                AssetCategory::Templates => {
                    let dir = self
                        .assets_dir
                        .clone()
                        .unwrap_or_else(|| PathBuf::from("./public"));

                    for file in EmbeddedAssets::iter() {
                        let path = dir.join(file.as_ref());
                        if !force && path.exists() {
                            report.skipped.push(path.display().to_string());
                            continue;
                        }
                        if let Some(data) = EmbeddedAssets::get(&file) {
                            if let Some(parent) = path.parent() {
                                fs::create_dir_all(parent)?;
                            }
                            fs::write(&path, &*data.data)?;
                            report.written.push(path.display().to_string());
                        }
                    }
                }
                AssetCategory::Config => {
                    let path = self
                        .config_file
                        .clone()
                        .unwrap_or_else(|| PathBuf::from("./config.yaml"));

                    if !force && path.exists() {
                        report.skipped.push(path.display().to_string());
                        continue;
                    }
                    if let Some(parent) = path.parent() {
                        fs::create_dir_all(parent)?;
                    }
                    if let Some(data) = EmbeddedConfig::get("config.yaml") {
                        fs::write(&path, &*data.data)?;
                        report.written.push(path.display().to_string());
                    }
                }
            }
        }

        Ok(report)
    }

    /// List embedded assets by category (for display)
    pub fn list_embedded(category: AssetCategory) -> Vec<String> {
        match category {
            AssetCategory::Templates => EmbeddedAssets::iter().map(|s| s.to_string()).collect(),
            AssetCategory::Config => vec!["config.yaml".to_string()],
        }
    }
}

// rust-embed keys always use forward slashes
fn embedded_key(relative_path: &Path) -> String {
    relative_path
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
