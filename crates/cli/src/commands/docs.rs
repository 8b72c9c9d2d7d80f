//! Docs command handler.
//!
//! Answers strictly from the local document index, with numbered citations.

use clap::Args;
use paddock_core::{config::AppConfig, AppError, AppResult};
use paddock_knowledge::{answer_local, HashingEmbedder, SqliteRetriever, DEFAULT_TOP_K};
use paddock_llm::create_client;
use paddock_prompt::load_prompt;
use std::sync::Arc;

/// Answer from the local document index
#[derive(Args, Debug)]
pub struct DocsCommand {
    /// The question to ask
    pub question: String,

    /// Number of passages to retrieve
    #[arg(short, long, default_value_t = DEFAULT_TOP_K)]
    pub k: usize,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl DocsCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing docs command");
        tracing::debug!("Docs command options: {:?}", self);

        if self.question.trim().is_empty() {
            return Err(AppError::Config("No question provided".to_string()));
        }

        let retriever = SqliteRetriever::open(
            &config.docs_index_path(),
            Arc::new(HashingEmbedder::default()),
        )?;
        let prompt = load_prompt(&config.workspace, "docs.answer")?;
        let client = create_client(
            &config.provider,
            config.endpoint.as_deref(),
            config.api_key.as_deref(),
        )
        .map_err(AppError::Config)?;

        let answer = answer_local(
            &retriever,
            client.as_ref(),
            &config.model,
            &prompt,
            self.question.trim(),
            self.k,
        )
        .await?;

        if self.json {
            let json = serde_json::to_string_pretty(&answer)
                .map_err(|e| AppError::Serialization(e.to_string()))?;
            println!("{}", json);
            return Ok(());
        }

        println!("{}", answer.text);
        if !answer.citations.is_empty() {
            println!("\nSources:");
            for citation in &answer.citations {
                println!("[{}] {}", citation.index, citation.source);
            }
        }

        Ok(())
    }
}
