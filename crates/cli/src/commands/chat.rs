//! Chat command handler.
//!
//! A line-oriented session: each input line is one user turn.

use super::ask::render_turn;
use clap::Args;
use paddock_core::{config::AppConfig, AppError, AppResult};
use paddock_router::{Backends, Conversation};
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Interactive question and answer session
#[derive(Args, Debug)]
pub struct ChatCommand {
    /// Write the transcript as JSON to this file on exit
    #[arg(long)]
    pub transcript: Option<PathBuf>,
}

impl ChatCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing chat command");

        let backends = Backends::new(config.clone());
        println!("{}", backends.status().await.status_line());
        println!("Ask about Formula 1. Type 'exit' to quit.");

        let composer = backends.composer().await;
        let mut conversation = Conversation::new();
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            print!("> ");
            std::io::stdout().flush().ok();

            let Some(line) = lines.next_line().await? else {
                break;
            };
            if matches!(line.trim(), "exit" | "quit") {
                break;
            }

            if let Some(turn) = composer.submit(&mut conversation, &line).await {
                println!("\n{}\n", render_turn(turn));
            }
        }

        tracing::debug!("Chat ended after {} turns", conversation.len());

        if let Some(path) = &self.transcript {
            let json = serde_json::to_string_pretty(&conversation)
                .map_err(|e| AppError::Serialization(e.to_string()))?;
            std::fs::write(path, json)?;
            tracing::info!("Transcript written to {:?}", path);
        }

        Ok(())
    }
}
