//! Answers grounded strictly in retrieved local documents.

use crate::retriever::DocumentRetriever;
use crate::types::{DocCitation, LocalAnswer, Passage};
use paddock_core::AppResult;
use paddock_llm::{LlmClient, LlmRequest};
use paddock_prompt::{build_prompt, PromptDefinition};
use std::collections::HashMap;

pub const DEFAULT_TOP_K: usize = 6;

/// Retrieve `k` passages and ask the model to answer from them only.
///
/// The context numbers passages `[1]..[k]`; the returned citations use the
/// same numbering. With no passages the model is not called.
pub async fn answer_local(
    retriever: &dyn DocumentRetriever,
    client: &dyn LlmClient,
    model: &str,
    prompt: &PromptDefinition,
    question: &str,
    k: usize,
) -> AppResult<LocalAnswer> {
    let passages = retriever.retrieve(question, k).await?;

    if passages.is_empty() {
        tracing::info!("No passages retrieved for local answer");
        return Ok(LocalAnswer::no_information(question));
    }

    tracing::info!(
        "Retrieved {} passages (max score: {:.3})",
        passages.len(),
        passages.first().map(|p| p.score).unwrap_or(0.0)
    );

    let mut vars = HashMap::new();
    vars.insert("context".to_string(), build_context(&passages));
    vars.insert("question".to_string(), question.to_string());
    let built = build_prompt(prompt, vars)?;

    let mut request = LlmRequest::new(built.user, model).with_temperature(0.0);
    if let Some(system) = built.system {
        request = request.with_system(system);
    }

    let response = client.complete(&request).await?;
    let text = match response.content.trim() {
        "" => "No answer.".to_string(),
        trimmed => trimmed.to_string(),
    };

    let citations = passages
        .iter()
        .enumerate()
        .map(|(i, p)| DocCitation {
            index: i + 1,
            source: p.source.clone(),
        })
        .collect();

    Ok(LocalAnswer { text, citations })
}

/// `[i] Source: <source>` headers followed by passage text.
pub fn build_context(passages: &[Passage]) -> String {
    passages
        .iter()
        .enumerate()
        .map(|(i, p)| format!("[{}] Source: {}\n{}", i + 1, p.source, p.text))
        .collect::<Vec<_>>()
        .join("\n\n")
}
