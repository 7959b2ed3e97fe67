//! Generate Lambda - Handles POST /generate.
//!
//! Sanitizes the untrusted request context, builds the system/user prompt
//! pair for the requested assistant, calls Claude, and shapes the HTTP
//! response. Any failure after prompt validation surfaces as a generic 500.

use lambda_http::{run, service_fn, Body, Error, Request, RequestExt, Response};
use shared::context::{self, AssistantType, PromptMode, SanitizedContext};
use shared::http::{error_response, json_response};
use shared::models::{GenerateRequest, GenerateResponse};
use shared::prompt;
use shared::response::normalize_format_response;
use shared::{ClaudeClient, Config};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Application state shared across requests.
struct AppState {
    claude: ClaudeClient,
    secure_prefix: &'static str,
}

impl AppState {
    async fn new() -> Result<Self, Error> {
        let config = Config::from_env();

        let api_key = match &config.claude_api_key_secret_arn {
            Some(arn) => {
                let aws_config =
                    aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
                let secrets_client = aws_sdk_secretsmanager::Client::new(&aws_config);
                shared::get_api_key(&secrets_client, arn).await?
            }
            None => std::env::var("CLAUDE_API_KEY").map_err(|_| "CLAUDE_API_KEY not set")?,
        };

        let secure_prefix = prompt::secure_instructions(&config.secure_instructions_path)?;

        Ok(Self {
            claude: ClaudeClient::new(
                config.claude_endpoint,
                api_key,
                config.claude_model,
                config.claude_max_tokens,
            ),
            secure_prefix,
        })
    }
}

async fn handler(state: Arc<AppState>, event: Request) -> Result<Response<Body>, Error> {
    match generate(&state, event).await {
        Ok(response) => json_response(200, &response),
        Err(err) => {
            error!("Generation error: {}", err);
            match err.status_code() {
                400 => error_response(400, "Missing prompt"),
                _ => error_response(500, "Generation failed"),
            }
        }
    }
}

/// Run the generate pipeline: parse, validate, sanitize, build prompts,
/// call the model, normalize.
async fn generate(state: &AppState, event: Request) -> shared::Result<GenerateResponse> {
    let query = event.query_string_parameters();
    let body = event.body();

    let request: GenerateRequest = if body.as_ref().is_empty() {
        GenerateRequest::default()
    } else {
        serde_json::from_slice(body.as_ref())?
    };

    let prompt_text = request.prompt.as_deref().map(str::trim).unwrap_or_default();
    if prompt_text.is_empty() {
        return Err(shared::Error::Validation("Missing prompt".to_string()));
    }

    // Body fields win; query-string values are a fallback for older pages.
    let mode = PromptMode::from_input(
        request
            .prompt_mode
            .as_deref()
            .or_else(|| query.first("promptMode")),
    );
    let assistant = AssistantType::from_input(
        request
            .assistant_type
            .as_deref()
            .or_else(|| query.first("assistantType")),
    );

    let request_id = request
        .request_id
        .clone()
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    // Top-level format/outputFormat override the context bag when present.
    let mut raw = request.context.clone();
    if request.format.is_some() {
        raw.format = request.format.clone();
    }
    if request.output_format.is_some() {
        raw.output_format = request.output_format.clone();
    }

    let user_prompt = prompt::build_user_prompt(prompt_text, mode, state.secure_prefix);

    let (sanitized, system_prompt) = match assistant {
        AssistantType::Cloud => {
            let ctx = context::sanitize_context(&raw, mode);
            (
                SanitizedContext::Cloud(ctx),
                prompt::build_cloud_system_prompt(&ctx),
            )
        }
        AssistantType::Format => {
            let ctx = context::sanitize_format_context(&raw, mode);
            (
                SanitizedContext::Format(ctx),
                prompt::build_format_system_prompt(&ctx),
            )
        }
    };

    info!(
        "Generate request {}: mode={}, assistant={:?}, prompt_chars={}",
        request_id,
        mode.as_str(),
        assistant,
        user_prompt.chars().count()
    );

    let raw_output = state.claude.generate(&system_prompt, &user_prompt).await?;

    let response = match assistant {
        AssistantType::Format => GenerateResponse::structured(
            request_id,
            sanitized,
            normalize_format_response(&raw_output),
        ),
        AssistantType::Cloud => GenerateResponse::passthrough(request_id, sanitized, raw_output),
    };

    Ok(response)
}


#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let state = Arc::new(AppState::new().await?);
    let state_clone = state.clone();

    run(service_fn(move |event| {
        let state = state_clone.clone();
        async move { handler(state, event).await }
    }))
    .await
}
