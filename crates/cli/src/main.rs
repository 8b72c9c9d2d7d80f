//! Paddock CLI
//!
//! Main entry point for the paddock command-line tool.
//! Answers Formula 1 questions from a local dataset, a live model and local documents.

mod commands;

use clap::{Parser, Subcommand};
use commands::{
    AskCommand, ChatCommand, DocsCommand, FetchDataCommand, IngestCommand, StatusCommand,
};
use paddock_core::{config::AppConfig, logging, AppError, AppResult, FactsMode};
use std::path::PathBuf;

/// Paddock - Formula 1 question answering over structured and live backends
#[derive(Parser, Debug)]
#[command(name = "paddock")]
#[command(about = "Formula 1 question answering over structured and live backends", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "PADDOCK_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "PADDOCK_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    /// LLM provider (gemini, ollama)
    #[arg(short, long, global = true, env = "PADDOCK_PROVIDER")]
    provider: Option<String>,

    /// Model identifier
    #[arg(short, long, global = true, env = "PADDOCK_MODEL")]
    model: Option<String>,

    /// SQLite dataset file
    #[arg(short, long, global = true, env = "PADDOCK_DATABASE")]
    database: Option<PathBuf>,

    /// Fact store variant (templates, agent)
    #[arg(long, global = true, env = "PADDOCK_FACTS_MODE")]
    facts_mode: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Answer a single question
    Ask(AskCommand),

    /// Interactive question and answer session
    Chat(ChatCommand),

    /// Show which backends are available
    Status(StatusCommand),

    /// Answer from the local document index
    Docs(DocsCommand),

    /// Index a directory of text documents for `docs`
    Ingest(IngestCommand),

    /// Download the dataset if it is missing
    FetchData(FetchDataCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    let facts_mode = cli
        .facts_mode
        .as_deref()
        .map(|mode| {
            FactsMode::parse(mode)
                .ok_or_else(|| AppError::Config(format!("Unknown facts mode: {}", mode)))
        })
        .transpose()?;

    let config = AppConfig::load_from(cli.workspace, cli.config)?.with_overrides(
        None,
        cli.database,
        cli.provider,
        cli.model,
        facts_mode,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    logging::init_logging(config.log_level.as_deref(), config.no_color)?;
    config.validate()?;

    tracing::info!("Paddock CLI starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Provider: {}", config.provider);
    tracing::debug!("Model: {}", config.model);
    tracing::debug!("Dataset: {:?}", config.database_path());

    let command_name = match &cli.command {
        Commands::Ask(_) => "ask",
        Commands::Chat(_) => "chat",
        Commands::Status(_) => "status",
        Commands::Docs(_) => "docs",
        Commands::Ingest(_) => "ingest",
        Commands::FetchData(_) => "fetch-data",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Chat(cmd) => cmd.execute(&config).await,
        Commands::Status(cmd) => cmd.execute(&config).await,
        Commands::Docs(cmd) => cmd.execute(&config).await,
        Commands::Ingest(cmd) => cmd.execute(&config).await,
        Commands::FetchData(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
