use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::ImageReader;
use tiny_skia::{ColorU8, Pixmap};

use crate::assets::AssetLoader;
use crate::error::TemplateLoadError;
use crate::models::{HttpSettings, TemplateLocation, TemplateReference, TemplateSourceKind};

/// Fetches a resolved template and decodes it into a fresh pixmap.
///
/// Failures here are operational: the resolver already settled on this source,
/// so errors propagate instead of falling back to another tier.
pub struct ImageLoader {
    assets: AssetLoader,
    default_template: PathBuf,
    http: HttpSettings,
}

impl ImageLoader {
    pub fn new(assets: AssetLoader, default_template: impl Into<PathBuf>, http: HttpSettings) -> Self {
        Self {
            assets,
            default_template: default_template.into(),
            http,
        }
    }

    pub fn load(&self, reference: &TemplateReference) -> Result<Pixmap, TemplateLoadError> {
        let bytes = match &reference.location {
            TemplateLocation::RemoteUrl(url) => self.fetch_remote(url)?,
            TemplateLocation::LocalPath(path) => self.read_local(reference.source_kind, path)?,
        };

        tracing::debug!(
            source = %reference.source_kind,
            location = %reference.location,
            size_bytes = bytes.len(),
            "Template bytes loaded"
        );

        self.decode(&bytes)
    }

    fn read_local(
        &self,
        kind: TemplateSourceKind,
        path: &Path,
    ) -> Result<Vec<u8>, TemplateLoadError> {
        let io_err = |source| TemplateLoadError::Io {
            path: path.display().to_string(),
            source,
        };

        if kind == TemplateSourceKind::BuiltinDefault && !path.is_file() {
            tracing::debug!(path = %path.display(), "Builtin template not on disk, using embedded copy");
            return self
                .assets
                .read_template(&self.default_template)
                .map(|data| data.into_owned())
                .map_err(io_err);
        }

        let bytes = std::fs::read(path).map_err(io_err)?;
        self.check_size(bytes.len())?;
        Ok(bytes)
    }

    fn fetch_remote(&self, url: &str) -> Result<Vec<u8>, TemplateLoadError> {
        let http_err = |e: reqwest::Error| TemplateLoadError::Http {
            url: url.to_string(),
            message: e.to_string(),
        };

        let client = reqwest::blocking::Client::builder()
            .timeout(self.http.timeout())
            .user_agent(concat!("certforge/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(http_err)?;

        tracing::debug!(url, timeout = ?self.http.timeout(), "Fetching remote template");

        let response = client.get(url).send().map_err(http_err)?;
        let status = response.status();
        if !status.is_success() {
            return Err(TemplateLoadError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        if let Some(len) = response.content_length() {
            self.check_size(usize::try_from(len).unwrap_or(usize::MAX))?;
        }

        let body = response.bytes().map_err(http_err)?;
        self.check_size(body.len())?;
        Ok(body.to_vec())
    }

    fn check_size(&self, size: usize) -> Result<(), TemplateLoadError> {
        if size > self.http.max_template_bytes {
            Err(TemplateLoadError::TooLarge {
                size,
                max: self.http.max_template_bytes,
            })
        } else {
            Ok(())
        }
    }

    /// Decode PNG/JPEG/GIF/WebP bytes into a premultiplied RGBA pixmap
    fn decode(&self, bytes: &[u8]) -> Result<Pixmap, TemplateLoadError> {
        let decode_err = |e: image::ImageError| TemplateLoadError::Decode(e.to_string());
        let reader = || {
            ImageReader::new(Cursor::new(bytes))
                .with_guessed_format()
                .map_err(|e| TemplateLoadError::Decode(e.to_string()))
        };

        // Check dimensions before allocating the full image
        let (width, height) = reader()?.into_dimensions().map_err(decode_err)?;
        let max = self.http.max_dimension;
        if width == 0 || height == 0 || width > max || height > max {
            return Err(TemplateLoadError::UnsupportedDimensions { width, height });
        }

        let rgba = reader()?.decode().map_err(decode_err)?.to_rgba8();
        let mut pixmap = Pixmap::new(width, height)
            .ok_or(TemplateLoadError::UnsupportedDimensions { width, height })?;

        for (dst, src) in pixmap.pixels_mut().iter_mut().zip(rgba.pixels()) {
            let [r, g, b, a] = src.0;
            *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
        }

        Ok(pixmap)
    }
}
