use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{CertificateType, StyleConfig, TemplateReference};

/// Input to one certificate rendering.
///
/// Only `participant_name` is drawn today. The remaining fields travel with the
/// request so issuance workflows can pass them through unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    #[serde(default)]
    pub hackathon_id: Option<String>,
    #[serde(default)]
    #[schema(value_type = String, example = "participant")]
    pub certificate_type: CertificateType,
    pub participant_name: String,
    #[serde(default)]
    pub team_name: Option<String>,
    #[serde(default)]
    pub rank: Option<u32>,
    #[serde(default)]
    pub is_winner: Option<bool>,
    #[serde(default)]
    pub total_score: Option<f64>,
    #[serde(default)]
    #[schema(value_type = Option<String>, format = Date)]
    pub date: Option<NaiveDate>,
}

impl RenderRequest {
    pub fn new(participant_name: impl Into<String>) -> Self {
        Self {
            participant_name: participant_name.into(),
            ..Default::default()
        }
    }

    pub fn for_hackathon(mut self, hackathon_id: impl Into<String>) -> Self {
        self.hackathon_id = Some(hackathon_id.into());
        self
    }

    pub fn with_type(mut self, certificate_type: CertificateType) -> Self {
        self.certificate_type = certificate_type;
        self
    }

    /// Hackathon id with blank values treated as absent
    pub fn hackathon(&self) -> Option<&str> {
        self.hackathon_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}

/// Output of one rendering. Never persisted.
#[derive(Debug, Clone)]
pub struct RenderResult {
    pub png_bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub source_used: TemplateReference,
    pub style_used: StyleConfig,
}
