//! Status command handler.

use clap::Args;
use paddock_core::{config::AppConfig, AppError, AppResult};
use paddock_prompt::list_prompts;
use paddock_router::Backends;

/// Show which backends are available
#[derive(Args, Debug)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatusCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing status command");

        let status = Backends::new(config.clone()).status().await;

        if self.json {
            let prompts = list_prompts(&config.workspace)?;
            let output = serde_json::json!({
                "structured": status.structured,
                "live": status.live,
                "local": status.local,
                "provider": config.provider,
                "model": config.model,
                "factsMode": config.facts_mode.as_str(),
                "database": config.database_path(),
                "prompts": prompts,
            });
            let json = serde_json::to_string_pretty(&output)
                .map_err(|e| AppError::Serialization(e.to_string()))?;
            println!("{}", json);
        } else {
            println!("{}", status.status_line());
        }

        Ok(())
    }
}
