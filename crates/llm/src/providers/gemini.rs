//! Google Gemini LLM provider implementation.
//!
//! Uses the `generateContent` REST endpoint. When a request asks for web
//! search, the `google_search` tool is enabled and the response's
//! `groundingMetadata` is mapped onto [`GroundingMetadata`].

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use crate::types::{GroundingMetadata, GroundingSource};
use paddock_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default Gemini API base URL.
pub const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<GeminiTool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
struct GeminiTool {
    google_search: serde_json::Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    usage_metadata: Option<GeminiUsage>,
    #[serde(default)]
    model_version: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContent>,
    #[serde(default)]
    grounding_metadata: Option<GeminiGrounding>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGrounding {
    #[serde(default)]
    grounding_chunks: Vec<GeminiGroundingChunk>,
    #[serde(default)]
    web_search_queries: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiGroundingChunk {
    #[serde(default)]
    web: Option<GeminiWebSource>,
}

#[derive(Debug, Deserialize)]
struct GeminiWebSource {
    #[serde(default)]
    uri: Option<String>,
    #[serde(default)]
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

/// Gemini LLM client.
pub struct GeminiClient {
    /// Base URL for the Gemini API
    base_url: String,

    /// API key sent as `x-goog-api-key`
    api_key: String,

    /// HTTP client
    client: reqwest::Client,
}

impl GeminiClient {
    /// Create a client against the public Gemini endpoint.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(DEFAULT_GEMINI_URL, api_key)
    }

    /// Create a client with a custom base URL.
    pub fn with_base_url(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        }
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }

    /// Convert LlmRequest to Gemini format.
    fn to_gemini_request(&self, request: &LlmRequest) -> GeminiRequest {
        let text_content = |role: Option<&str>, text: &str| GeminiContent {
            role: role.map(str::to_string),
            parts: vec![GeminiPart {
                text: text.to_string(),
            }],
        };

        let tools = if request.web_search {
            vec![GeminiTool {
                google_search: serde_json::json!({}),
            }]
        } else {
            Vec::new()
        };

        let generation_config = if request.temperature.is_some() || request.max_tokens.is_some() {
            Some(GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_tokens,
            })
        } else {
            None
        };

        GeminiRequest {
            contents: vec![text_content(Some("user"), &request.prompt)],
            system_instruction: request
                .system
                .as_deref()
                .map(|system| text_content(None, system)),
            tools,
            generation_config,
        }
    }

    /// Convert Gemini response to LlmResponse.
    fn convert_response(&self, response: GeminiResponse, model: &str) -> LlmResponse {
        let candidate = response.candidates.into_iter().next();

        let (content, grounding) = match candidate {
            Some(candidate) => {
                let content = candidate
                    .content
                    .map(|c| {
                        c.parts
                            .into_iter()
                            .map(|p| p.text)
                            .collect::<Vec<_>>()
                            .join("")
                    })
                    .unwrap_or_default();
                (content, candidate.grounding_metadata.map(convert_grounding))
            }
            None => (String::new(), None),
        };

        let usage = response
            .usage_metadata
            .map(|u| LlmUsage::new(u.prompt_token_count, u.candidates_token_count))
            .unwrap_or_default();

        LlmResponse {
            content,
            model: response.model_version.unwrap_or_else(|| model.to_string()),
            usage,
            grounding,
        }
    }
}

fn convert_grounding(grounding: GeminiGrounding) -> GroundingMetadata {
    let sources = grounding
        .grounding_chunks
        .into_iter()
        .filter_map(|chunk| chunk.web)
        .filter_map(|web| {
            let uri = web.uri?;
            let title = web
                .title
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| uri.clone());
            Some(GroundingSource { title, uri })
        })
        .collect();

    GroundingMetadata {
        sources,
        search_queries: grounding.web_search_queries,
    }
}

#[async_trait::async_trait]
impl LlmClient for GeminiClient {
    fn provider_name(&self) -> &str {
        "gemini"
    }

    fn supports_web_search(&self) -> bool {
        true
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        tracing::info!(model = %request.model, web_search = request.web_search, "Sending completion request to Gemini");
        tracing::debug!("Request: {:?}", request);

        let gemini_request = self.to_gemini_request(request);

        let response = self
            .client
            .post(self.endpoint(&request.model))
            .header("x-goog-api-key", &self.api_key)
            .json(&gemini_request)
            .send()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to send request to Gemini: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Llm(format!(
                "Gemini API error ({}): {}",
                status, error_text
            )));
        }

        let gemini_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to parse Gemini response: {}", e)))?;

        tracing::info!("Received completion from Gemini");

        Ok(self.convert_response(gemini_response, &request.model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gemini_client_creation() {
        let client = GeminiClient::with_base_url("http://localhost:9000/", "key");
        assert_eq!(client.provider_name(), "gemini");
        assert!(client.supports_web_search());
        assert_eq!(
            client.endpoint("gemini-2.5-flash"),
            "http://localhost:9000/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn test_request_conversion_with_search_tool() {
        let client = GeminiClient::new("key");
        let request = LlmRequest::new("Latest FIA news?", "gemini-2.5-flash")
            .with_system("Formula 1 only")
            .with_temperature(0.3)
            .with_web_search();

        let json = serde_json::to_value(client.to_gemini_request(&request)).unwrap();
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "Latest FIA news?");
        assert_eq!(
            json["systemInstruction"]["parts"][0]["text"],
            "Formula 1 only"
        );
        assert!(json["tools"][0]["google_search"].is_object());
        assert!((json["generationConfig"]["temperature"].as_f64().unwrap() - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_request_conversion_without_search() {
        let client = GeminiClient::new("key");
        let request = LlmRequest::new("SELECT please", "gemini-2.5-flash");

        let json = serde_json::to_value(client.to_gemini_request(&request)).unwrap();
        assert!(json.get("tools").is_none());
        assert!(json.get("systemInstruction").is_none());
        assert!(json.get("generationConfig").is_none());
    }

    #[test]
    fn test_response_with_grounding() {
        let client = GeminiClient::new("key");
        let raw = serde_json::json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Ferrari "}, {"text": "brought upgrades."}]},
                "groundingMetadata": {
                    "webSearchQueries": ["ferrari upgrade"],
                    "groundingChunks": [
                        {"web": {"uri": "https://a.example/1", "title": "a.example"}},
                        {"web": {"uri": "https://b.example/2"}},
                        {"retrievedContext": {}}
                    ]
                }
            }],
            "usageMetadata": {"promptTokenCount": 10, "candidatesTokenCount": 5}
        });

        let response: GeminiResponse = serde_json::from_value(raw).unwrap();
        let converted = client.convert_response(response, "gemini-2.5-flash");

        assert_eq!(converted.content, "Ferrari brought upgrades.");
        assert_eq!(converted.usage.total_tokens, 15);
        let grounding = converted.grounding.unwrap();
        assert_eq!(grounding.sources.len(), 2);
        assert_eq!(grounding.sources[1].title, "https://b.example/2");
        assert_eq!(grounding.search_queries, vec!["ferrari upgrade".to_string()]);
    }

    #[test]
    fn test_response_without_candidates() {
        let client = GeminiClient::new("key");
        let response: GeminiResponse = serde_json::from_str("{}").unwrap();
        let converted = client.convert_response(response, "gemini-2.5-flash");
        assert!(converted.content.is_empty());
        assert!(converted.grounding.is_none());
        assert_eq!(converted.model, "gemini-2.5-flash");
    }
}
