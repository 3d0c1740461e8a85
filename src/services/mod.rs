pub mod config_store;
pub mod font_registry;
pub mod image_loader;
pub mod legacy_settings;
pub mod renderer;
pub mod style_resolver;
pub mod template_resolver;

pub use config_store::{settings_key, ConfigStore, InMemoryConfigStore, StoreError};
pub use font_registry::{FontError, FontRegistry, RegisteredFont};
pub use image_loader::ImageLoader;
pub use legacy_settings::{
    JsonFileLegacySettings, LegacySettings, LegacySettingsProvider, StaticLegacySettings,
};
pub use renderer::{CertificateRenderService, Resolution};
pub use style_resolver::StyleSettingsResolver;
pub use template_resolver::TemplateSourceResolver;
