//! LLM provider factory.
//!
//! This module creates LLM clients from a provider name, resolving the
//! endpoint and checking that required secrets are present.

use crate::client::LlmClient;
use crate::providers::{GeminiClient, OllamaClient};
use crate::types::ProviderType;
use std::sync::Arc;

/// Create an LLM client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("gemini", "ollama")
/// * `endpoint` - Optional custom endpoint URL
/// * `api_key` - Optional API key (required by Gemini)
///
/// # Errors
/// Returns error if the provider is unknown or a required secret is missing.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
) -> Result<Arc<dyn LlmClient>, String> {
    match ProviderType::parse(provider) {
        Some(ProviderType::Gemini) => {
            let key = api_key
                .filter(|k| !k.trim().is_empty())
                .ok_or_else(|| "Gemini provider requires API key".to_string())?;
            let client = match endpoint {
                Some(url) => GeminiClient::with_base_url(url, key),
                None => GeminiClient::new(key),
            };
            Ok(Arc::new(client))
        }
        Some(ProviderType::Ollama) => {
            let client = match endpoint {
                Some(url) => OllamaClient::with_base_url(url),
                None => OllamaClient::new(),
            };
            Ok(Arc::new(client))
        }
        None => Err(format!("Unknown provider: {}", provider)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_ollama_client() {
        let client = create_client("ollama", None, None).unwrap();
        assert_eq!(client.provider_name(), "ollama");
    }

    #[test]
    fn test_create_gemini_with_key() {
        let client = create_client("gemini", None, Some("secret")).unwrap();
        assert_eq!(client.provider_name(), "gemini");
        assert!(client.supports_web_search());
    }

    #[test]
    fn test_gemini_requires_api_key() {
        match create_client("gemini", None, None) {
            Err(err) => assert!(err.contains("requires API key")),
            Ok(_) => panic!("Expected error for Gemini without API key"),
        }
        assert!(create_client("gemini", None, Some("  ")).is_err());
    }

    #[test]
    fn test_unknown_provider() {
        match create_client("unknown", None, None) {
            Err(err) => assert!(err.contains("Unknown provider")),
            Ok(_) => panic!("Expected error for unknown provider"),
        }
    }
}
