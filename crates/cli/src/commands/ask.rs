//! Ask command handler.
//!
//! Answers one question through the composer and prints the assistant turn.

use clap::Args;
use paddock_core::{config::AppConfig, AppError, AppResult};
use paddock_router::{render_table, Backends, Conversation, Turn};
use std::path::PathBuf;

/// Answer a single question
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: Option<String>,

    /// Read the question from a file
    #[arg(short, long, conflicts_with = "question")]
    pub file: Option<PathBuf>,

    /// Output the assistant turn as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Ask command options: {:?}", self);

        let question = self.get_question()?;

        let backends = Backends::new(config.clone());
        tracing::info!("{}", backends.status().await.status_line());
        let composer = backends.composer().await;

        let mut conversation = Conversation::new();
        let Some(turn) = composer.submit(&mut conversation, &question).await else {
            return Err(AppError::Config("No question provided".to_string()));
        };

        if self.json {
            let json = serde_json::to_string_pretty(turn)
                .map_err(|e| AppError::Serialization(e.to_string()))?;
            println!("{}", json);
        } else {
            println!("{}", render_turn(turn));
        }

        Ok(())
    }

    fn get_question(&self) -> AppResult<String> {
        if let Some(path) = &self.file {
            return std::fs::read_to_string(path).map_err(|e| {
                AppError::Config(format!("Failed to read question file {:?}: {}", path, e))
            });
        }

        self.question
            .clone()
            .ok_or_else(|| AppError::Config("No question provided".to_string()))
    }
}

/// Turn text followed by any attached table whose rows the text does not
/// already list.
pub fn render_turn(turn: &Turn) -> String {
    let mut out = turn.text.clone();
    for table in turn.tables.iter().flatten() {
        if !turn.text.contains(&table.to_bullets()) {
            out.push_str("\n\n");
            out.push_str(&render_table(table));
        }
    }
    out
}
