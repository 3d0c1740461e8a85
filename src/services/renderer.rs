use std::sync::Arc;

use crate::assets::AssetLoader;
use crate::error::{CertificateError, RenderError};
use crate::models::{
    AppConfig, CertificateType, RenderRequest, RenderResult, StyleConfig, TemplateReference,
};
use crate::rendering::{encode_png, TextCompositor};
use crate::services::{
    ConfigStore, FontRegistry, ImageLoader, LegacySettingsProvider, StyleSettingsResolver,
    TemplateSourceResolver,
};

/// Resolved inputs of a rendering, without the rendering itself
#[derive(Debug, Clone)]
pub struct Resolution {
    pub style: StyleConfig,
    pub template: TemplateReference,
}

/// Certificate rendering pipeline shared by every certificate type.
///
/// resolve style, resolve template, load, composite, encode. There are no
/// retries; the first failure is returned. The legacy settings file is read
/// once per rendering and shared by both resolvers.
pub struct CertificateRenderService {
    legacy: Arc<dyn LegacySettingsProvider>,
    style_resolver: StyleSettingsResolver,
    template_resolver: TemplateSourceResolver,
    image_loader: ImageLoader,
    compositor: TextCompositor,
}

impl CertificateRenderService {
    pub fn new(
        legacy: Arc<dyn LegacySettingsProvider>,
        style_resolver: StyleSettingsResolver,
        template_resolver: TemplateSourceResolver,
        image_loader: ImageLoader,
        fonts: Arc<FontRegistry>,
    ) -> Self {
        Self {
            legacy,
            style_resolver,
            template_resolver,
            image_loader,
            compositor: TextCompositor::new(fonts),
        }
    }

    /// Wire the pipeline from configuration and injected stores
    pub fn from_config(
        config: &AppConfig,
        assets: AssetLoader,
        store: Arc<dyn ConfigStore>,
        legacy: Arc<dyn LegacySettingsProvider>,
        fonts: Arc<FontRegistry>,
    ) -> Self {
        let style_resolver = StyleSettingsResolver::new(store.clone());
        let template_resolver = TemplateSourceResolver::new(
            store,
            config.assets_dir.clone(),
            config.default_template.clone(),
        );
        let image_loader = ImageLoader::new(
            assets.with_assets_dir(config.assets_dir.clone()),
            config.default_template.clone(),
            config.http.clone(),
        );
        Self::new(legacy, style_resolver, template_resolver, image_loader, fonts)
    }

    /// Render a participant certificate
    pub fn render_default(&self, request: &RenderRequest) -> Result<RenderResult, CertificateError> {
        self.render_typed(request, CertificateType::Participant)
    }

    pub fn render_typed(
        &self,
        request: &RenderRequest,
        certificate_type: CertificateType,
    ) -> Result<RenderResult, CertificateError> {
        self.run(request, certificate_type)
    }

    /// Render using the request's own certificate type
    pub fn render(&self, request: &RenderRequest) -> Result<RenderResult, CertificateError> {
        self.run(request, request.certificate_type)
    }

    /// Resolve style and template without loading or drawing anything
    pub fn resolve(
        &self,
        hackathon_id: Option<&str>,
        certificate_type: CertificateType,
    ) -> Resolution {
        let hackathon_id = hackathon_id.map(str::trim).filter(|id| !id.is_empty());
        let legacy = self.legacy.read();
        Resolution {
            style: self
                .style_resolver
                .resolve(hackathon_id, certificate_type, legacy.as_ref()),
            template: self
                .template_resolver
                .resolve(hackathon_id, certificate_type, legacy.as_ref()),
        }
    }

    /// Run `render_typed` on the blocking pool
    pub async fn render_async(
        self: &Arc<Self>,
        request: RenderRequest,
        certificate_type: CertificateType,
    ) -> Result<RenderResult, CertificateError> {
        let service = Arc::clone(self);
        tokio::task::spawn_blocking(move || service.render_typed(&request, certificate_type))
            .await
            .map_err(|e| RenderError::Task(e.to_string()))?
    }

    fn run(
        &self,
        request: &RenderRequest,
        certificate_type: CertificateType,
    ) -> Result<RenderResult, CertificateError> {
        if request.participant_name.trim().is_empty() {
            return Err(RenderError::EmptyName.into());
        }

        let start = std::time::Instant::now();
        let Resolution { style, template } = self.resolve(request.hackathon(), certificate_type);

        let mut pixmap = self.image_loader.load(&template)?;
        self.compositor
            .composite(&mut pixmap, &style, &request.participant_name)?;
        let png_bytes = encode_png(&pixmap)?;

        tracing::info!(
            hackathon_id = ?request.hackathon(),
            certificate_type = %certificate_type,
            source = %template.source_kind,
            width = pixmap.width(),
            height = pixmap.height(),
            size_bytes = png_bytes.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Certificate rendered"
        );

        Ok(RenderResult {
            png_bytes,
            width: pixmap.width(),
            height: pixmap.height(),
            source_used: template,
            style_used: style,
        })
    }
}
