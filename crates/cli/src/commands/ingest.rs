//! Ingest command handler.
//!
//! Builds the local document index that `docs` answers from.

use clap::Args;
use paddock_core::{config::AppConfig, AppError, AppResult};
use paddock_knowledge::{ingest_dir, HashingEmbedder};
use std::path::PathBuf;

/// Index text and markdown files for `docs`
#[derive(Args, Debug)]
pub struct IngestCommand {
    /// Directory to read documents from
    pub dir: PathBuf,

    /// Clear the existing index first
    #[arg(long)]
    pub reset: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl IngestCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ingest command");
        tracing::debug!("Ingest command options: {:?}", self);

        let index_path = config.docs_index_path();
        let embedder = HashingEmbedder::default();
        let stats = ingest_dir(&self.dir, &index_path, &embedder, self.reset).await?;

        if self.json {
            let json = serde_json::to_string_pretty(&stats)
                .map_err(|e| AppError::Serialization(e.to_string()))?;
            println!("{}", json);
            return Ok(());
        }

        println!(
            "Indexed {} files ({} chunks, {} bytes) into {}",
            stats.files,
            stats.chunks,
            stats.bytes,
            index_path.display()
        );
        if stats.files == 0 {
            println!("No .txt or .md files found in {}", self.dir.display());
        }

        Ok(())
    }
}
