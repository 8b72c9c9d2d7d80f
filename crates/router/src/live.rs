//! Live Knowledge Adapter: grounded answers from the generative service.

use async_trait::async_trait;
use paddock_core::AppResult;
use paddock_llm::{GroundingMetadata, LlmClient, LlmRequest};
use paddock_prompt::{build_prompt, PromptDefinition};
use regex::Regex;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, LazyLock};

/// Upper bound on citations attached to one answer.
pub const MAX_CITATIONS: usize = 8;

/// Domain hint the composer passes for Formula 1 questions.
pub const F1_DOMAIN_HINT: &str = "f1";

/// Prefix used when an adapter takes no domain hint.
pub const INLINE_DOMAIN_PREFIX: &str = "Formula 1 / F1 only: ";

static MARKDOWN_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[([^\]]+)\]\((https?://[^\)\s]+)\)").expect("markdown link regex is valid")
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Citation {
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LiveResult {
    pub text: String,
    pub citations: Vec<Citation>,
}

impl LiveResult {
    /// Trimmed answer followed by a `Sources:` list, or `None` for a blank answer.
    pub fn render(&self) -> Option<String> {
        let text = self.text.trim();
        if text.is_empty() {
            return None;
        }

        if self.citations.is_empty() {
            return Some(text.to_string());
        }

        let sources = self
            .citations
            .iter()
            .map(|c| format!("- [{}]({})", c.title, c.url))
            .collect::<Vec<_>>()
            .join("\n");
        Some(format!("{}\n\nSources:\n{}", text, sources))
    }
}

/// Answers time-sensitive questions from a live source.
#[async_trait]
pub trait LiveKnowledge: Send + Sync {
    /// Whether `ask` honours `domain_hint`. Callers otherwise inline the
    /// domain into the question.
    fn accepts_domain_hint(&self) -> bool {
        true
    }

    async fn ask(&self, question: &str, domain_hint: Option<&str>) -> AppResult<LiveResult>;
}

/// [`LiveKnowledge`] over an [`LlmClient`], with web grounding when the
/// provider has it.
pub struct GroundedLiveAdapter {
    client: Arc<dyn LlmClient>,
    model: String,
    prompt: PromptDefinition,
    web_search: bool,
}

impl GroundedLiveAdapter {
    pub fn new(
        client: Arc<dyn LlmClient>,
        model: impl Into<String>,
        prompt: PromptDefinition,
        web_search: bool,
    ) -> Self {
        Self {
            client,
            model: model.into(),
            prompt,
            web_search,
        }
    }
}

fn domain_label(hint: &str) -> String {
    match hint.to_lowercase().as_str() {
        "f1" | "formula 1" | "formula one" => "Formula 1 (F1)".to_string(),
        _ => hint.to_string(),
    }
}

#[async_trait]
impl LiveKnowledge for GroundedLiveAdapter {
    async fn ask(&self, question: &str, domain_hint: Option<&str>) -> AppResult<LiveResult> {
        let mut vars = HashMap::new();
        vars.insert("question".to_string(), question.to_string());
        if let Some(hint) = domain_hint {
            vars.insert("domain".to_string(), domain_label(hint));
        }
        let built = build_prompt(&self.prompt, vars)?;

        let mut request = LlmRequest::new(built.user, &self.model).with_temperature(0.2);
        if let Some(system) = built.system {
            request = request.with_system(system);
        }
        if self.web_search && self.client.supports_web_search() {
            request = request.with_web_search();
        }

        let response = self.client.complete(&request).await?;
        let citations = extract_citations(response.grounding.as_ref(), &response.content);

        tracing::debug!(
            provider = self.client.provider_name(),
            citations = citations.len(),
            grounded = response.grounding.is_some(),
            "Live answer received"
        );

        Ok(LiveResult {
            text: response.content,
            citations,
        })
    }
}

/// Citations from grounding metadata when it has usable sources, otherwise from
/// inline markdown links in the text. Deduplicated by URL, capped at
/// [`MAX_CITATIONS`].
pub fn extract_citations(grounding: Option<&GroundingMetadata>, text: &str) -> Vec<Citation> {
    let grounded: Vec<Citation> = grounding
        .map(|metadata| {
            metadata
                .sources
                .iter()
                .filter(|s| !s.uri.trim().is_empty())
                .map(|s| Citation {
                    title: s.title.clone(),
                    url: s.uri.clone(),
                })
                .collect()
        })
        .unwrap_or_default();

    let candidates: Vec<Citation> = if grounded.is_empty() {
        MARKDOWN_LINK
            .captures_iter(text)
            .map(|caps| Citation {
                title: caps[1].trim().to_string(),
                url: caps[2].to_string(),
            })
            .collect()
    } else {
        grounded
    };

    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|c| !c.url.is_empty() && seen.insert(c.url.clone()))
        .take(MAX_CITATIONS)
        .collect()
}
