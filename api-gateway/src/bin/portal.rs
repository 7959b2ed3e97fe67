//! Portal Lambda - Creates Stripe billing portal sessions.
//!
//! The caller presents a bearer identity token. The token's uid keys a
//! document-store lookup for the Stripe customer id, which in turn opens a
//! billing portal session. Handles the CORS preflight itself.

use lambda_http::{run, service_fn, Body, Error, Request, Response};
use serde::Deserialize;
use serde_json::Value;
use shared::http::{error_response_for_origin, json_response_for_origin};
use shared::models::PortalResponse;
use std::sync::Arc;
use tracing::error;
use tracing_subscriber::EnvFilter;

const STRIPE_PORTAL_URL: &str = "https://api.stripe.com/v1/billing_portal/sessions";

/// Billing portal session as returned by Stripe (only the field we use).
#[derive(Debug, Deserialize)]
struct StripeSession {
    url: Option<String>,
}

/// Application state shared across requests.
struct AppState {
    http_client: reqwest::Client,
    stripe_secret_key: String,
    site_origin: String,
    firebase_project_id: String,
}

impl AppState {
    async fn new() -> Result<Self, Error> {
        let stripe_secret_key = match std::env::var("STRIPE_SECRET_ARN") {
            Ok(arn) => {
                let aws_config =
                    aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
                let secrets_client = aws_sdk_secretsmanager::Client::new(&aws_config);
                shared::get_api_key(&secrets_client, &arn).await?
            }
            Err(_) => {
                std::env::var("STRIPE_SECRET_KEY").map_err(|_| "STRIPE_SECRET_KEY not set")?
            }
        };

        Ok(Self {
            http_client: reqwest::Client::new(),
            stripe_secret_key,
            site_origin: std::env::var("SITE_ORIGIN")
                .unwrap_or_else(|_| "https://devopsia.co".to_string()),
            firebase_project_id: std::env::var("FIREBASE_PROJECT_ID")
                .map_err(|_| "FIREBASE_PROJECT_ID not set")?,
        })
    }
}

async fn handler(state: Arc<AppState>, event: Request) -> Result<Response<Body>, Error> {
    let origin = state.site_origin.clone();

    if event.method() == "OPTIONS" {
        return Ok(Response::builder()
            .status(200)
            .header("Access-Control-Allow-Origin", origin)
            .header("Access-Control-Allow-Headers", "Content-Type, Authorization")
            .body(Body::Empty)
            .expect("Failed to build response"));
    }

    match create_session(&state, event).await {
        Ok(url) => json_response_for_origin(200, &origin, &PortalResponse { url }),
        Err(shared::Error::Auth(detail)) => {
            error!("Portal auth rejected: {}", detail);
            error_response_for_origin(401, &origin, "Unauthorized")
        }
        Err(shared::Error::Validation(message)) => error_response_for_origin(400, &origin, message),
        Err(err) => {
            error!("Stripe portal error: {}", err);
            error_response_for_origin(500, &origin, "Portal session creation failed")
        }
    }
}

async fn create_session(state: &AppState, event: Request) -> shared::Result<String> {
    let auth_header = event
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| shared::Error::Auth("Missing Authorization header".to_string()))?;

    let token = shared::bearer_token(auth_header)
        .ok_or_else(|| shared::Error::Auth("Missing bearer token".to_string()))?;

    let user = shared::validate_token(token)?;

    let customer_id = lookup_customer_id(state, &user.user_id, token).await?;

    let return_url = format!("{}/profile/", state.site_origin);
    let params = [
        ("customer", customer_id.as_str()),
        ("return_url", return_url.as_str()),
    ];

    let response = state
        .http_client
        .post(STRIPE_PORTAL_URL)
        .bearer_auth(&state.stripe_secret_key)
        .form(&params)
        .send()
        .await
        .map_err(|e| shared::Error::Upstream(format!("Stripe request failed: {}", e)))?;

    let status = response.status();
    if !status.is_success() {
        let detail = response.text().await.unwrap_or_default();
        error!("Stripe portal returned {}: {}", status, detail);
        return Err(shared::Error::Upstream(format!(
            "Stripe portal failed with status {}",
            status
        )));
    }

    let session: StripeSession = response
        .json()
        .await
        .map_err(|e| shared::Error::Upstream(format!("Failed to parse Stripe response: {}", e)))?;

    session
        .url
        .ok_or_else(|| shared::Error::Upstream("Portal session has no URL".to_string()))
}

/// Fetch the user's Stripe customer id from the document store.
///
/// The lookup runs against the Firestore REST API with the caller's own
/// identity token, so it can only ever read the caller's document.
async fn lookup_customer_id(
    state: &AppState,
    user_id: &str,
    id_token: &str,
) -> shared::Result<String> {
    let url = format!(
        "https://firestore.googleapis.com/v1/projects/{}/databases/(default)/documents/users/{}",
        state.firebase_project_id, user_id
    );

    let response = state
        .http_client
        .get(&url)
        .bearer_auth(id_token)
        .send()
        .await
        .map_err(|e| shared::Error::Upstream(format!("Document store request failed: {}", e)))?;

    if response.status() == reqwest::StatusCode::NOT_FOUND {
        return Err(shared::Error::Validation(
            "Stripe customer not found".to_string(),
        ));
    }

    let status = response.status();
    if !status.is_success() {
        let detail = response.text().await.unwrap_or_default();
        error!("Document store returned {}: {}", status, detail);
        return Err(shared::Error::Upstream(format!(
            "Document store lookup failed with status {}",
            status
        )));
    }

    let document: Value = response.json().await.map_err(|e| {
        shared::Error::Upstream(format!("Failed to parse document store response: {}", e))
    })?;

    document
        .pointer("/fields/stripeCustomerId/stringValue")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| shared::Error::Validation("Stripe customer not found".to_string()))
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
