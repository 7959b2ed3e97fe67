//! Shared data models.

use serde::{Deserialize, Serialize};

use crate::context::{RawContext, SanitizedContext};
use crate::response::{FormatArtifact, NormalizedResponse, ValidationCheck};

/// Generate request payload.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub prompt: Option<String>,
    pub prompt_mode: Option<String>,
    pub assistant_type: Option<String>,
    #[serde(default)]
    pub context: RawContext,
    pub format: Option<String>,
    pub output_format: Option<String>,
    pub request_id: Option<String>,
}

/// Generate response payload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub request_id: String,
    pub context: SanitizedContext,
    pub summary: String,
    pub plan: Vec<String>,
    pub artifacts: Vec<FormatArtifact>,
    pub validation: Vec<ValidationCheck>,
    pub notes: Vec<String>,
    pub text: String,
    pub output: String,
}

impl GenerateResponse {
    /// Shape a response for the format assistant from a normalized result.
    pub fn structured(
        request_id: String,
        context: SanitizedContext,
        normalized: NormalizedResponse,
    ) -> Self {
        let output = normalized.text.clone();
        Self {
            request_id,
            context,
            summary: normalized.summary,
            plan: normalized.plan,
            artifacts: normalized.artifacts,
            validation: normalized.validation,
            notes: normalized.notes,
            text: normalized.text,
            output,
        }
    }

    /// Shape a raw-passthrough response for the cloud assistant.
    pub fn passthrough(request_id: String, context: SanitizedContext, text: String) -> Self {
        Self {
            request_id,
            context,
            summary: text.clone(),
            plan: Vec::new(),
            artifacts: Vec::new(),
            validation: Vec::new(),
            notes: Vec::new(),
            output: text.clone(),
            text,
        }
    }
}

/// Checkout session request payload.
#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub plan: Option<String>,
}

/// Checkout session response payload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub checkout_url: String,
}

/// Billing portal session response payload.
#[derive(Debug, Serialize)]
pub struct PortalResponse {
    pub url: String,
}
