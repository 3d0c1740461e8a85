//! Test application factory for integration tests.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

use certforge::assets::AssetLoader;
use certforge::models::{AppConfig, FontSettings};
use certforge::server::{build_router, create_app_state_with, AppState};
use certforge::services::{
    CertificateRenderService, FontRegistry, InMemoryConfigStore, JsonFileLegacySettings,
};

/// Test application with router and direct access to services.
///
/// Every app gets its own temporary assets directory and legacy settings path,
/// so tests can write templates and settings without touching each other.
pub struct TestApp {
    router: axum::Router,
    pub store: Arc<InMemoryConfigStore>,
    pub renderer: Arc<CertificateRenderService>,
    pub config: AppConfig,
    dir: TempDir,
}

impl TestApp {
    /// Create a new test application using the embedded default template
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    /// Create a test application after adjusting its configuration
    pub fn with_config(adjust: impl FnOnce(&mut AppConfig)) -> Self {
        Self::build(adjust, FontRegistry::empty())
    }

    /// Create a test application that draws names with the bundled fixture font
    pub fn with_fixture_font() -> Self {
        let settings = FontSettings {
            candidates: vec![fixture_font_path()],
            load_system_fonts: false,
            strict: true,
            ..Default::default()
        };
        let fonts = FontRegistry::probe(&settings).expect("Failed to load fixture font");
        Self::build(|_| {}, fonts)
    }

    fn build(adjust: impl FnOnce(&mut AppConfig), fonts: FontRegistry) -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");

        let mut config = AppConfig {
            assets_dir: dir.path().join("public"),
            legacy_settings_file: Some(dir.path().join("certificate-settings.json")),
            ..Default::default()
        };
        adjust(&mut config);
        std::fs::create_dir_all(&config.assets_dir).expect("Failed to create assets dir");

        let (state, store) = Self::create_state(&config, fonts);
        let renderer = state.renderer.clone();

        Self {
            router: build_router(state),
            store,
            renderer,
            config,
            dir,
        }
    }

    /// Build app state over an in-memory store
    pub fn create_state(
        config: &AppConfig,
        fonts: FontRegistry,
    ) -> (AppState, Arc<InMemoryConfigStore>) {
        let store = Arc::new(InMemoryConfigStore::from_config(config));
        let legacy_path = config
            .legacy_settings_file
            .clone()
            .unwrap_or_else(|| PathBuf::from("/nonexistent/certificate-settings.json"));

        let state = create_app_state_with(
            config.clone(),
            AssetLoader::default(),
            store.clone(),
            Arc::new(JsonFileLegacySettings::new(legacy_path)),
            Arc::new(fonts),
        );
        (state, store)
    }

    pub fn assets_dir(&self) -> &Path {
        &self.config.assets_dir
    }

    /// Write a template file relative to the assets directory
    pub fn write_template(&self, relative: &str, bytes: &[u8]) -> PathBuf {
        let path = self.assets_dir().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create template dir");
        }
        std::fs::write(&path, bytes).expect("Failed to write template");
        path
    }

    /// Write the legacy settings file verbatim
    pub fn write_legacy(&self, content: &str) {
        let path = self
            .config
            .legacy_settings_file
            .as_ref()
            .expect("Legacy settings file not configured");
        std::fs::write(path, content).expect("Failed to write legacy settings");
    }

    /// Scratch directory outside the assets root
    pub fn scratch_dir(&self) -> &Path {
        self.dir.path()
    }

    /// Make a GET request to the given path
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request(Request::get(path).body(Body::empty()).unwrap())
            .await
    }

    /// Make a POST request with JSON body
    pub async fn post_json(&self, path: &str, body: &str) -> TestResponse {
        let request = Request::post(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.request(request).await
    }

    /// Send a request to the router
    async fn request(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Request failed");

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes()
            .to_vec();

        TestResponse {
            status,
            headers,
            body,
        }
    }
}

/// DejaVu Sans Bold, shipped under `tests/fixtures/fonts`
pub fn fixture_font_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/fonts/DejaVuSans-Bold.ttf")
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Test response with convenience methods
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    /// Parse body as JSON
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> T {
        serde_json::from_slice(&self.body).expect("Failed to parse JSON response")
    }

    /// Get body as string
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }

    /// Header value as a string, if present
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Check if response is a PNG image
    pub fn is_png(&self) -> bool {
        self.body.len() >= 8 && &self.body[0..8] == b"\x89PNG\r\n\x1a\n"
    }

    /// Decoded image dimensions
    pub fn png_dimensions(&self) -> (u32, u32) {
        let image = image::load_from_memory(&self.body).expect("Failed to decode PNG");
        (image.width(), image.height())
    }
}
