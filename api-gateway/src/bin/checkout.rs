//! Checkout Lambda - Creates Stripe subscription checkout sessions.
//!
//! POST body `{plan}` is mapped to a price id; unknown plans are rejected
//! before any call to Stripe. Responses are CORS-pinned to the site origin.

use lambda_http::{run, service_fn, Body, Error, Request, Response};
use serde::Deserialize;
use shared::http::{error_response_for_origin, json_response_for_origin};
use shared::models::{CheckoutRequest, CheckoutResponse};
use std::sync::Arc;
use tracing::error;
use tracing_subscriber::EnvFilter;

const STRIPE_CHECKOUT_URL: &str = "https://api.stripe.com/v1/checkout/sessions";

/// Checkout session as returned by Stripe (only the field we use).
#[derive(Debug, Deserialize)]
struct StripeSession {
    url: Option<String>,
}

/// Application state shared across requests.
struct AppState {
    http_client: reqwest::Client,
    stripe_secret_key: String,
    site_origin: String,
    price_pro: String,
    price_team: String,
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
            price_pro: std::env::var("STRIPE_PRICE_PRO")
                .unwrap_or_else(|_| "price_123_pro".to_string()),
            price_team: std::env::var("STRIPE_PRICE_TEAM")
                .unwrap_or_else(|_| "price_456_team".to_string()),
        })
    }
}

async fn handler(state: Arc<AppState>, event: Request) -> Result<Response<Body>, Error> {
    let origin = state.site_origin.clone();

    match create_session(&state, event).await {
        Ok(url) => json_response_for_origin(200, &origin, &CheckoutResponse { checkout_url: url }),
        Err(shared::Error::Validation(message)) => {
            error_response_for_origin(400, &origin, message)
        }
        Err(err) => {
            error!("Stripe checkout error: {}", err);
            error_response_for_origin(500, &origin, "Checkout session creation failed.")
        }
    }
}

async fn create_session(state: &AppState, event: Request) -> shared::Result<String> {
    let body = event.body();
    if body.as_ref().is_empty() {
        return Err(shared::Error::Validation("Missing request body".to_string()));
    }

    let request: CheckoutRequest = serde_json::from_slice(body.as_ref())?;

    let price_id = match request.plan.as_deref() {
        Some("pro") => state.price_pro.as_str(),
        Some("team") => state.price_team.as_str(),
        _ => return Err(shared::Error::Validation("Invalid plan selected".to_string())),
    };

    let success_url = format!(
        "{}/thanks?session_id={{CHECKOUT_SESSION_ID}}",
        state.site_origin
    );
    let cancel_url = format!("{}/cancelled", state.site_origin);

    let params = [
        ("mode", "subscription"),
        ("line_items[0][price]", price_id),
        ("line_items[0][quantity]", "1"),
        ("success_url", success_url.as_str()),
        ("cancel_url", cancel_url.as_str()),
    ];

    let response = state
        .http_client
        .post(STRIPE_CHECKOUT_URL)
        .bearer_auth(&state.stripe_secret_key)
        .form(&params)
        .send()
        .await
        .map_err(|e| shared::Error::Upstream(format!("Stripe request failed: {}", e)))?;

    let status = response.status();
    if !status.is_success() {
        let detail = response.text().await.unwrap_or_default();
        error!("Stripe checkout returned {}: {}", status, detail);
        return Err(shared::Error::Upstream(format!(
            "Stripe checkout failed with status {}",
            status
        )));
    }

    let session: StripeSession = response
        .json()
        .await
        .map_err(|e| shared::Error::Upstream(format!("Failed to parse Stripe response: {}", e)))?;

    session
        .url
        .ok_or_else(|| shared::Error::Upstream("Checkout session has no URL".to_string()))
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
