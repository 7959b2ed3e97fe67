//! Normalization of raw LLM output into the structured response shape.
//!
//! The model is asked for JSON but is not trusted to return it. Parsing
//! failures fall back to raw-text mode; normalization never fails.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// A discrete generated file returned by the format assistant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatArtifact {
    #[serde(rename = "type")]
    pub artifact_type: String,
    pub filename: String,
    pub content: String,
}

/// A validation step the user should run against the generated artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationCheck {
    pub label: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub detail: String,
}

/// Structured response extracted from raw model output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedResponse {
    pub summary: String,
    pub plan: Vec<String>,
    pub artifacts: Vec<FormatArtifact>,
    pub validation: Vec<ValidationCheck>,
    pub notes: Vec<String>,
    pub text: String,
}

impl NormalizedResponse {
    /// Raw-text fallback used when the model did not return JSON.
    pub fn raw(text: &str) -> Self {
        Self {
            summary: text.to_string(),
            plan: Vec::new(),
            artifacts: Vec::new(),
            validation: Vec::new(),
            notes: Vec::new(),
            text: text.to_string(),
        }
    }
}

/// Normalize raw format-assistant output.
///
/// Attempts a JSON parse and extracts each field with shape coercion; on
/// parse failure the whole raw text becomes `summary` and `text`.
pub fn normalize_format_response(raw: &str) -> NormalizedResponse {
    let parsed: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            warn!("Format response was not JSON, falling back to raw text: {}", e);
            return NormalizedResponse::raw(raw);
        }
    };

    let summary = parsed
        .get("summary")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| raw.to_string());

    NormalizedResponse {
        summary,
        plan: coerce_string_list(parsed.get("plan")),
        artifacts: coerce_artifacts(parsed.get("artifacts")),
        validation: coerce_validation(parsed.get("validation")),
        notes: coerce_string_list(parsed.get("notes")),
        text: raw.to_string(),
    }
}

/// Coerce a loosely-shaped value into a list of strings.
///
/// Accepted shapes, one arm per variant: an array of strings, an array of
/// objects carrying one of `text`/`title`/`step`/`summary`, or a single
/// newline-delimited string. Anything else yields an empty list.
fn coerce_string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => {
                    let s = s.trim();
                    (!s.is_empty()).then(|| s.to_string())
                }
                Value::Object(fields) => ["text", "title", "step", "summary"]
                    .iter()
                    .find_map(|key| fields.get(*key).and_then(Value::as_str))
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty()),
                _ => None,
            })
            .collect(),
        Some(Value::String(block)) => block
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

/// Extract well-formed artifacts, dropping entries whose content is empty
/// after trimming.
fn coerce_artifacts(value: Option<&Value>) -> Vec<FormatArtifact> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| {
            let fields = item.as_object()?;
            let content = fields.get("content").and_then(Value::as_str)?;
            if content.trim().is_empty() {
                return None;
            }
            Some(FormatArtifact {
                artifact_type: fields
                    .get("type")
                    .and_then(Value::as_str)
                    .unwrap_or("file")
                    .to_string(),
                filename: fields
                    .get("filename")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                content: content.to_string(),
            })
        })
        .collect()
}

/// Extract validation checks, dropping entries that have no label.
fn coerce_validation(value: Option<&Value>) -> Vec<ValidationCheck> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| {
            let fields = item.as_object()?;
            let label = fields.get("label").and_then(Value::as_str)?.trim();
            if label.is_empty() {
                return None;
            }
            Some(ValidationCheck {
                label: label.to_string(),
                status: fields
                    .get("status")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                detail: fields
                    .get("detail")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_json_falls_back_to_raw_text() {
        let normalized = normalize_format_response("not json");
        assert_eq!(normalized.summary, "not json");
        assert_eq!(normalized.text, "not json");
        assert!(normalized.plan.is_empty());
        assert!(normalized.artifacts.is_empty());
        assert!(normalized.validation.is_empty());
    }

    #[test]
    fn test_structured_round_trip() {
        let original = NormalizedResponse {
            summary: "A hardened VPC".to_string(),
            plan: vec!["Create the VPC".to_string(), "Add subnets".to_string()],
            artifacts: vec![FormatArtifact {
                artifact_type: "terraform".to_string(),
                filename: "main.tf".to_string(),
                content: "resource \"aws_vpc\" \"main\" {}".to_string(),
            }],
            validation: vec![ValidationCheck {
                label: "terraform validate".to_string(),
                status: "pending".to_string(),
                detail: "Run before plan".to_string(),
            }],
            notes: vec!["NAT gateways cost money".to_string()],
            text: String::new(),
        };
        let raw = serde_json::to_string(&original).unwrap();
        let normalized = normalize_format_response(&raw);
        assert_eq!(normalized.summary, original.summary);
        assert_eq!(normalized.plan, original.plan);
        assert_eq!(normalized.artifacts, original.artifacts);
        assert_eq!(normalized.validation, original.validation);
        assert_eq!(normalized.notes, original.notes);
    }

    #[test]
    fn test_plan_from_object_array() {
        let raw = r#"{"summary":"s","plan":[{"step":"one"},{"title":"two"},{"text":"three"},{"irrelevant":1}]}"#;
        let normalized = normalize_format_response(raw);
        assert_eq!(normalized.plan, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_plan_from_newline_string() {
        let raw = r#"{"summary":"s","plan":"one\n\n  two  \nthree"}"#;
        let normalized = normalize_format_response(raw);
        assert_eq!(normalized.plan, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_plan_from_unsupported_shape_is_empty() {
        let raw = r#"{"summary":"s","plan":42}"#;
        assert!(normalize_format_response(raw).plan.is_empty());
    }

    #[test]
    fn test_artifacts_without_content_are_dropped() {
        let raw = r#"{"summary":"s","artifacts":[
            {"type":"terraform","filename":"main.tf","content":"resource {}"},
            {"type":"terraform","filename":"empty.tf","content":"   "},
            {"type":"terraform","filename":"none.tf"},
            "not an object"
        ]}"#;
        let normalized = normalize_format_response(raw);
        assert_eq!(normalized.artifacts.len(), 1);
        assert_eq!(normalized.artifacts[0].filename, "main.tf");
    }

    #[test]
    fn test_validation_without_label_is_dropped() {
        let raw = r#"{"summary":"s","validation":[
            {"label":"kubectl dry-run","status":"pending"},
            {"status":"pending","detail":"no label"},
            {"label":"  "}
        ]}"#;
        let normalized = normalize_format_response(raw);
        assert_eq!(normalized.validation.len(), 1);
        assert_eq!(normalized.validation[0].label, "kubectl dry-run");
        assert_eq!(normalized.validation[0].detail, "");
    }

    #[test]
    fn test_summary_falls_back_to_raw_text_when_absent() {
        let raw = r#"{"plan":["one"]}"#;
        let normalized = normalize_format_response(raw);
        assert_eq!(normalized.summary, raw);
        assert_eq!(normalized.plan, vec!["one"]);
    }
}
