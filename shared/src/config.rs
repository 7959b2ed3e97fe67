//! Configuration management for Lambda functions.

use std::env;
use std::path::PathBuf;

/// Generate-Lambda configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Claude API endpoint
    pub claude_endpoint: String,
    /// Model identifier
    pub claude_model: String,
    /// Completion token budget
    pub claude_max_tokens: u32,
    /// ARN of the secret holding the Claude API key (env fallback if absent)
    pub claude_api_key_secret_arn: Option<String>,
    /// Path to the secure-mode instruction prefix
    pub secure_instructions_path: PathBuf,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            claude_endpoint: env::var("CLAUDE_API_ENDPOINT")
                .unwrap_or_else(|_| "https://api.anthropic.com".to_string()),
            claude_model: env::var("CLAUDE_MODEL")
                .unwrap_or_else(|_| "claude-3-sonnet-20240229".to_string()),
            claude_max_tokens: env::var("CLAUDE_MAX_TOKENS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1024),
            claude_api_key_secret_arn: env::var("CLAUDE_API_KEY_SECRET_ARN").ok(),
            secure_instructions_path: env::var("SECURE_INSTRUCTIONS_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("prompts/prefixes/secure_instructions.md")),
        }
    }
}
