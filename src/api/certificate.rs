use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

use crate::error::ApiError;
use crate::models::{CertificateType, RenderRequest, RenderResult, StyleConfig};
use crate::services::CertificateRenderService;

/// Query parameters for the GET render endpoints
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CertificateQuery {
    /// Participant name drawn on the certificate
    pub name: Option<String>,
    /// Hackathon whose overrides apply
    pub hackathon_id: Option<String>,
}

impl CertificateQuery {
    fn into_request(self) -> Result<RenderRequest, ApiError> {
        let name = self
            .name
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| ApiError::BadRequest("Missing query parameter: name".to_string()))?;
        Ok(RenderRequest {
            participant_name: name,
            hackathon_id: self.hackathon_id,
            ..Default::default()
        })
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ResolveQuery {
    pub hackathon_id: Option<String>,
    /// Certificate type (participant, judge, supervisor, winner)
    #[serde(rename = "type")]
    pub certificate_type: Option<String>,
}

/// Resolved style and template for a hackathon and certificate type
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResolveResponse {
    pub certificate_type: String,
    pub style: StyleConfig,
    /// Tier that supplied the template (perTypeSetting, hackathonField, legacyFile, builtinDefault)
    pub template_source: String,
    pub template_location: String,
    pub remote: bool,
}

/// Render a participant certificate
#[utoipa::path(
    get,
    path = "/api/certificate",
    responses(
        (status = 200, description = "Certificate PNG", content_type = "image/png"),
        (status = 400, description = "Missing or blank name"),
        (status = 502, description = "Template could not be loaded"),
        (status = 500, description = "Rendering error"),
    ),
    params(CertificateQuery),
    tag = "Certificate"
)]
pub async fn handle_certificate(
    State(renderer): State<Arc<CertificateRenderService>>,
    Query(query): Query<CertificateQuery>,
) -> Result<Response, ApiError> {
    let request = query.into_request()?;
    let name = request.participant_name.clone();
    let result = renderer
        .render_async(request, CertificateType::Participant)
        .await?;
    Ok(png_response(CertificateType::Participant, &name, result))
}

/// Render a certificate of the given type
#[utoipa::path(
    get,
    path = "/api/certificate/{type}",
    responses(
        (status = 200, description = "Certificate PNG", content_type = "image/png"),
        (status = 400, description = "Missing or blank name"),
        (status = 502, description = "Template could not be loaded"),
        (status = 500, description = "Rendering error"),
    ),
    params(
        ("type" = String, Path, description = "participant, judge, supervisor or winner"),
        CertificateQuery,
    ),
    tag = "Certificate"
)]
pub async fn handle_typed_certificate(
    State(renderer): State<Arc<CertificateRenderService>>,
    Path(certificate_type): Path<String>,
    Query(query): Query<CertificateQuery>,
) -> Result<Response, ApiError> {
    let certificate_type = CertificateType::parse(&certificate_type);
    let request = query.into_request()?;
    let name = request.participant_name.clone();
    let result = renderer.render_async(request, certificate_type).await?;
    Ok(png_response(certificate_type, &name, result))
}

/// Render a certificate from a JSON request body
#[utoipa::path(
    post,
    path = "/api/certificate",
    request_body = RenderRequest,
    responses(
        (status = 200, description = "Certificate PNG", content_type = "image/png"),
        (status = 400, description = "Blank participant name"),
        (status = 502, description = "Template could not be loaded"),
        (status = 500, description = "Rendering error"),
    ),
    tag = "Certificate"
)]
pub async fn handle_render_request(
    State(renderer): State<Arc<CertificateRenderService>>,
    Json(request): Json<RenderRequest>,
) -> Result<Response, ApiError> {
    let certificate_type = request.certificate_type;
    let name = request.participant_name.clone();
    let result = renderer.render_async(request, certificate_type).await?;
    Ok(png_response(certificate_type, &name, result))
}

/// Show which style and template a render would use
#[utoipa::path(
    get,
    path = "/api/certificate/resolve",
    responses(
        (status = 200, description = "Resolved configuration", body = ResolveResponse),
    ),
    params(ResolveQuery),
    tag = "Certificate"
)]
pub async fn handle_resolve(
    State(renderer): State<Arc<CertificateRenderService>>,
    Query(query): Query<ResolveQuery>,
) -> Result<Json<ResolveResponse>, ApiError> {
    let certificate_type = query
        .certificate_type
        .as_deref()
        .map(CertificateType::parse)
        .unwrap_or_default();

    let resolution = tokio::task::spawn_blocking(move || {
        renderer.resolve(query.hackathon_id.as_deref(), certificate_type)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Resolve task failed: {e}")))?;

    Ok(Json(ResolveResponse {
        certificate_type: certificate_type.to_string(),
        style: resolution.style,
        template_source: resolution.template.source_kind.to_string(),
        template_location: resolution.template.location.to_string(),
        remote: resolution.template.location.is_remote(),
    }))
}

fn png_response(certificate_type: CertificateType, name: &str, result: RenderResult) -> Response {
    let filename = format!("certificate-{}-{}.png", certificate_type, filename_slug(name));
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{filename}\""))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("image/png")),
            (header::CONTENT_DISPOSITION, disposition),
            (
                header::HeaderName::from_static("x-template-source"),
                HeaderValue::from_static(result.source_used.source_kind.as_str()),
            ),
        ],
        result.png_bytes,
    )
        .into_response()
}

/// ASCII-only slug for the download filename; non-Latin names collapse to "name"
fn filename_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        "name".to_string()
    } else {
        slug.to_string()
    }
}
