use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Certificate error: {0}")]
    Certificate(#[from] CertificateError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// The single typed failure of a certificate rendering
#[derive(Debug, Error)]
pub enum CertificateError {
    #[error("Template load error: {0}")]
    TemplateLoad(#[from] TemplateLoadError),

    #[error("Rendering error: {0}")]
    Render(#[from] RenderError),
}

/// The resolved template could not be fetched or decoded
#[derive(Debug, Error)]
pub enum TemplateLoadError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP error fetching {url}: {message}")]
    Http { url: String, message: String },

    #[error("HTTP status {status} fetching {url}")]
    Status { url: String, status: u16 },

    #[error("Template too large: {size} bytes (max {max})")]
    TooLarge { size: usize, max: usize },

    #[error("Image decode error: {0}")]
    Decode(String),

    #[error("Unsupported dimensions: {width}x{height}")]
    UnsupportedDimensions { width: u32, height: u32 },
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Invalid font descriptor: {0}")]
    InvalidFont(String),

    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("Participant name is empty")]
    EmptyName,

    #[error("Text overlay error: {0}")]
    Overlay(String),

    #[error("PNG encode error: {0}")]
    PngEncode(String),

    #[error("Render task failed: {0}")]
    Task(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::Certificate(CertificateError::TemplateLoad(e)) => {
                (StatusCode::BAD_GATEWAY, e.to_string())
            }
            ApiError::Certificate(CertificateError::Render(RenderError::EmptyName)) => {
                (StatusCode::BAD_REQUEST, RenderError::EmptyName.to_string())
            }
            ApiError::Certificate(CertificateError::Render(e)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
        };

        let body = Json(json!({
            "status": status.as_u16(),
            "error": message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_bad_request() {
        let error = ApiError::BadRequest("name is required".to_string());
        assert_eq!(error.to_string(), "Bad request: name is required");
    }

    #[test]
    fn test_api_error_internal() {
        let error = ApiError::Internal("Task error".to_string());
        assert_eq!(error.to_string(), "Internal error: Task error");
    }

    #[test]
    fn test_template_load_error_status() {
        let error = TemplateLoadError::Status {
            url: "https://cdn.example.com/t.png".to_string(),
            status: 404,
        };
        assert_eq!(
            error.to_string(),
            "HTTP status 404 fetching https://cdn.example.com/t.png"
        );
    }

    #[test]
    fn test_template_load_error_too_large() {
        let error = TemplateLoadError::TooLarge {
            size: 100_000,
            max: 90_000,
        };
        assert_eq!(
            error.to_string(),
            "Template too large: 100000 bytes (max 90000)"
        );
    }

    #[test]
    fn test_render_error_messages() {
        assert_eq!(
            RenderError::InvalidFont("Arial".into()).to_string(),
            "Invalid font descriptor: Arial"
        );
        assert_eq!(
            RenderError::InvalidColor("red".into()).to_string(),
            "Invalid color: red"
        );
        assert_eq!(
            RenderError::Task("cancelled".into()).to_string(),
            "Render task failed: cancelled"
        );
    }

    #[test]
    fn test_certificate_error_from_render_error() {
        let error: CertificateError = RenderError::EmptyName.into();
        assert!(matches!(error, CertificateError::Render(RenderError::EmptyName)));
    }

    #[test]
    fn test_api_error_into_response_status_codes() {
        let response = ApiError::BadRequest("x".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = ApiError::Certificate(
            TemplateLoadError::Decode("bad header".into()).into(),
        )
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let response = ApiError::Certificate(RenderError::EmptyName.into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response =
            ApiError::Certificate(RenderError::InvalidColor("x".into()).into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = ApiError::Internal("error".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
