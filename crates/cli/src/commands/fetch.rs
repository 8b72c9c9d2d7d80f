//! Fetch-data command handler.

use clap::Args;
use paddock_core::{config::AppConfig, AppError, AppResult};
use paddock_facts::{ensure_dataset, FactDatabase};

/// Download the dataset if it is missing
#[derive(Args, Debug)]
pub struct FetchDataCommand {
    /// Dataset URL (defaults to the configured datasetUrl)
    #[arg(long)]
    pub url: Option<String>,
}

impl FetchDataCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing fetch-data command");

        let path = config.database_path();
        let url = self.url.as_deref().or(config.dataset_url.as_deref());

        if ensure_dataset(&path, url).await? {
            println!("Downloaded dataset to {}", path.display());
        } else {
            println!("Dataset already present at {}", path.display());
        }

        let db = FactDatabase::open(&path)?;
        let missing = db.missing_tables()?;
        if !missing.is_empty() {
            return Err(AppError::Facts(format!(
                "Dataset is missing required tables: {}",
                missing.join(", ")
            )));
        }

        match db.latest_year()? {
            Some(year) => println!("Dataset covers seasons up to {}", year),
            None => println!("Dataset has no races"),
        }

        Ok(())
    }
}
