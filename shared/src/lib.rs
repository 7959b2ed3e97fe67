//! Shared library for Devopsia Lambda functions.
//!
//! This crate provides common utilities, types, and clients used across all Lambda functions.

pub mod auth;
pub mod claude;
pub mod config;
pub mod context;
pub mod error;
pub mod http;
pub mod models;
pub mod prompt;
pub mod response;
pub mod secrets;

pub use auth::{bearer_token, validate_token, AuthenticatedUser, FirebaseClaims};
pub use claude::ClaudeClient;
pub use config::Config;
pub use context::{
    sanitize_context, sanitize_format_context, AssistantType, FormatRequestContext, PromptMode,
    RawContext, RequestContext, SanitizedContext,
};
pub use error::{Error, Result};
pub use models::{CheckoutRequest, CheckoutResponse, GenerateRequest, GenerateResponse, PortalResponse};
pub use prompt::{build_cloud_system_prompt, build_format_system_prompt, build_user_prompt};
pub use response::{normalize_format_response, FormatArtifact, NormalizedResponse, ValidationCheck};
pub use secrets::{get_api_key, get_secret};
