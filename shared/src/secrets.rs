//! AWS Secrets Manager integration.

use aws_sdk_secretsmanager::Client as SecretsClient;
use std::collections::HashMap;
use std::sync::OnceLock;
use tokio::sync::RwLock;

use crate::{Error, Result};

/// Cached secrets with lazy initialization.
static SECRETS_CACHE: OnceLock<RwLock<HashMap<String, String>>> = OnceLock::new();

fn get_cache() -> &'static RwLock<HashMap<String, String>> {
    SECRETS_CACHE.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Get a secret value from Secrets Manager with caching.
pub async fn get_secret(client: &SecretsClient, secret_arn: &str) -> Result<String> {
    // Check cache first
    {
        let cache = get_cache().read().await;
        if let Some(value) = cache.get(secret_arn) {
            return Ok(value.clone());
        }
    }

    // Fetch from Secrets Manager
    let response = client
        .get_secret_value()
        .secret_id(secret_arn)
        .send()
        .await
        .map_err(|e| Error::Aws(format!("Failed to get secret: {}", e)))?;

    let secret_string = response
        .secret_string()
        .ok_or_else(|| Error::Aws("Secret has no string value".to_string()))?
        .to_string();

    // Cache the result
    {
        let mut cache = get_cache().write().await;
        cache.insert(secret_arn.to_string(), secret_string.clone());
    }

    Ok(secret_string)
}

/// Get an API key from Secrets Manager.
///
/// Secrets are stored either as the bare key string or as JSON with an
/// `apiKey` field; both shapes are accepted.
pub async fn get_api_key(client: &SecretsClient, secret_arn: &str) -> Result<String> {
    let secret_string = get_secret(client, secret_arn).await?;
    Ok(extract_api_key(&secret_string))
}

fn extract_api_key(secret_string: &str) -> String {
    serde_json::from_str::<serde_json::Value>(secret_string)
        .ok()
        .and_then(|v| v.get("apiKey").and_then(|k| k.as_str()).map(String::from))
        .unwrap_or_else(|| secret_string.to_string())
}

/// Clear the secrets cache (useful for testing or credential rotation).
pub async fn clear_cache() {
    let mut cache = get_cache().write().await;
    cache.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_api_key_from_json() {
        assert_eq!(extract_api_key(r#"{"apiKey":"sk-ant-123"}"#), "sk-ant-123");
    }

    #[test]
    fn test_extract_api_key_from_bare_string() {
        assert_eq!(extract_api_key("sk-ant-123"), "sk-ant-123");
        assert_eq!(extract_api_key(r#"{"other":"field"}"#), r#"{"other":"field"}"#);
    }

    #[tokio::test]
    async fn test_clear_cache_empties_cached_secrets() {
        {
            let mut cache = get_cache().write().await;
            cache.insert("arn:aws:secretsmanager:test".to_string(), "value".to_string());
        }
        clear_cache().await;
        assert!(get_cache().read().await.is_empty());
    }
}
