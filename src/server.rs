//! HTTP server setup and configuration.
//!
//! This module provides the router and application state used by both
//! the production server and integration tests.

use axum::{
    extract::FromRef,
    http::{header::CACHE_CONTROL, HeaderValue},
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

use crate::api;
use crate::assets::AssetLoader;
use crate::models::AppConfig;
use crate::services::{
    CertificateRenderService, ConfigStore, FontRegistry, InMemoryConfigStore,
    JsonFileLegacySettings, LegacySettingsProvider, StaticLegacySettings,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub renderer: Arc<CertificateRenderService>,
}

impl FromRef<AppState> for Arc<CertificateRenderService> {
    fn from_ref(state: &AppState) -> Self {
        state.renderer.clone()
    }
}

/// Create application state from a loaded configuration.
///
/// Fonts are registered here (once per process); with `fonts.strict` set a
/// missing certificate font fails startup.
pub fn create_app_state(config: AppConfig, asset_loader: AssetLoader) -> anyhow::Result<AppState> {
    let store = InMemoryConfigStore::from_config(&config);
    if let Some(path) = &config.store_file {
        store
            .load_json(path)
            .map_err(|e| anyhow::anyhow!("Failed to load store file {}: {e}", path.display()))?;
    }

    let legacy: Arc<dyn LegacySettingsProvider> = match &config.legacy_settings_file {
        Some(path) => Arc::new(JsonFileLegacySettings::new(path.clone())),
        None => Arc::new(StaticLegacySettings(None)),
    };

    let fonts = FontRegistry::shared(&config.fonts)?;

    Ok(create_app_state_with(
        config,
        asset_loader,
        Arc::new(store),
        legacy,
        fonts,
    ))
}

/// Create application state with injected stores and fonts.
pub fn create_app_state_with(
    config: AppConfig,
    asset_loader: AssetLoader,
    store: Arc<dyn ConfigStore>,
    legacy: Arc<dyn LegacySettingsProvider>,
    fonts: Arc<FontRegistry>,
) -> AppState {
    let renderer = Arc::new(CertificateRenderService::from_config(
        &config,
        asset_loader,
        store,
        legacy,
        fonts,
    ));

    AppState {
        config: Arc::new(config),
        renderer,
    }
}

/// Build the API router with all endpoints and middleware.
///
/// This is the core router used by both production and tests.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/certificate",
            get(api::handle_certificate).post(api::handle_render_request),
        )
        .route("/api/certificate/resolve", get(api::handle_resolve))
        .route("/api/certificate/:type", get(api::handle_typed_certificate))
        // Health check
        .route("/health", get(|| async { "OK" }))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        // Certificates are generated per request and never cached
        .layer(SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
}
