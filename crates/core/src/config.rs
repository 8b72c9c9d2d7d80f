//! Configuration management for Paddock.
//!
//! This module handles loading and merging configuration from multiple sources:
//! - Defaults
//! - Config file (.paddock/config.yaml)
//! - Environment variables
//! - Command-line flags
//!
//! Relative paths (dataset, document index) are resolved against the workspace.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Environment variable holding the generative service credential.
pub const DEFAULT_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Providers understood by the LLM factory.
pub const KNOWN_PROVIDERS: [&str; 2] = ["gemini", "ollama"];

/// Which Fact Store Adapter variant answers structured questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FactsMode {
    /// Fixed query templates keyed by intent
    Templates,
    /// Natural-language-to-SQL through the LLM, behind the read-only policy
    Agent,
}

impl FactsMode {
    /// Parse a mode name.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "templates" | "template" => Some(Self::Templates),
            "agent" | "sql" => Some(Self::Agent),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Templates => "templates",
            Self::Agent => "agent",
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .paddock/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// LLM provider ("gemini" or "ollama")
    pub provider: String,

    /// Model identifier
    pub model: String,

    /// Custom provider endpoint
    pub endpoint: Option<String>,

    /// Name of the environment variable holding the API key
    pub api_key_env: String,

    /// API key for the LLM provider
    pub api_key: Option<String>,

    /// Ask the live backend to ground answers in web search
    pub web_search: bool,

    /// SQLite dataset file (relative to workspace unless absolute)
    pub database: PathBuf,

    /// Remote URL for fetching the dataset on first run
    pub dataset_url: Option<String>,

    /// Fact store variant
    pub facts_mode: FactsMode,

    /// Row cap appended to unbounded generated queries
    pub max_rows: u32,

    /// Document index file (relative to workspace unless absolute)
    pub docs_index: PathBuf,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmSection>,
    facts: Option<FactsSection>,
    knowledge: Option<KnowledgeSection>,
    logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LlmSection {
    provider: Option<String>,
    model: Option<String>,
    endpoint: Option<String>,
    #[serde(rename = "apiKeyEnv")]
    api_key_env: Option<String>,
    #[serde(rename = "webSearch")]
    web_search: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FactsSection {
    database: Option<String>,
    #[serde(rename = "datasetUrl")]
    dataset_url: Option<String>,
    mode: Option<String>,
    #[serde(rename = "maxRows")]
    max_rows: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct KnowledgeSection {
    index: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingSection {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            provider: "gemini".to_string(),
            model: "gemini-2.5-flash".to_string(),
            endpoint: None,
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            api_key: None,
            web_search: true,
            database: PathBuf::from("f1.sqlite"),
            dataset_url: None,
            facts_mode: FactsMode::Templates,
            max_rows: 200,
            docs_index: PathBuf::from(".paddock/docs.sqlite"),
            log_level: None,
            verbose: false,
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, the YAML config file and environment variables.
    ///
    /// Environment variables:
    /// - `PADDOCK_WORKSPACE`: Override workspace path
    /// - `PADDOCK_CONFIG`: Path to config file
    /// - `PADDOCK_PROVIDER`: LLM provider
    /// - `PADDOCK_MODEL`: Model identifier
    /// - `PADDOCK_DATABASE`: SQLite dataset path
    /// - `PADDOCK_DATASET_URL`: Remote dataset URL for first run
    /// - `PADDOCK_FACTS_MODE`: `templates` or `agent`
    /// - `GEMINI_API_KEY` (or the configured `apiKeyEnv`): API key
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use paddock_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Dataset: {:?}", config.database_path());
    /// ```
    pub fn load() -> AppResult<Self> {
        Self::load_from(None, None)
    }

    /// Like [`AppConfig::load`], with an explicit workspace and config file
    /// taking precedence over `PADDOCK_WORKSPACE` and `PADDOCK_CONFIG`.
    pub fn load_from(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(workspace) =
            workspace.or_else(|| std::env::var("PADDOCK_WORKSPACE").ok().map(PathBuf::from))
        {
            config.workspace = workspace;
        }

        config.config_file =
            config_file.or_else(|| std::env::var("PADDOCK_CONFIG").ok().map(PathBuf::from));

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = match config.config_file {
            Some(ref cf) => cf.clone(),
            None => config.workspace.join(".paddock/config.yaml"),
        };

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        // Environment variables override YAML config
        if let Ok(provider) = std::env::var("PADDOCK_PROVIDER") {
            config.provider = provider;
        }

        if let Ok(model) = std::env::var("PADDOCK_MODEL") {
            config.model = model;
        }

        if let Ok(database) = std::env::var("PADDOCK_DATABASE") {
            config.database = PathBuf::from(database);
        }

        if let Ok(url) = std::env::var("PADDOCK_DATASET_URL") {
            if !url.trim().is_empty() {
                config.dataset_url = Some(url);
            }
        }

        if let Ok(mode) = std::env::var("PADDOCK_FACTS_MODE") {
            config.facts_mode = FactsMode::parse(&mode).ok_or_else(|| {
                AppError::Config(format!("Unknown facts mode: {}", mode))
            })?;
        }

        config.api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty());
        config.log_level = std::env::var("RUST_LOG").ok();

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        self.merge_file(config_file)
    }

    fn merge_file(&self, config_file: ConfigFile) -> AppResult<Self> {
        let mut result = self.clone();

        if let Some(llm) = config_file.llm {
            if let Some(provider) = llm.provider {
                result.provider = provider;
            }
            if let Some(model) = llm.model {
                result.model = model;
            }
            if llm.endpoint.is_some() {
                result.endpoint = llm.endpoint;
            }
            if let Some(env) = llm.api_key_env {
                result.api_key_env = env;
            }
            if let Some(web_search) = llm.web_search {
                result.web_search = web_search;
            }
        }

        if let Some(facts) = config_file.facts {
            if let Some(database) = facts.database {
                result.database = PathBuf::from(database);
            }
            if facts.dataset_url.is_some() {
                result.dataset_url = facts.dataset_url;
            }
            if let Some(mode) = facts.mode {
                result.facts_mode = FactsMode::parse(&mode)
                    .ok_or_else(|| AppError::Config(format!("Unknown facts mode: {}", mode)))?;
            }
            if let Some(max_rows) = facts.max_rows {
                result.max_rows = max_rows;
            }
        }

        if let Some(knowledge) = config_file.knowledge {
            if let Some(index) = knowledge.index {
                result.docs_index = PathBuf::from(index);
            }
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI flags take precedence over environment variables and the config file.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        workspace: Option<PathBuf>,
        database: Option<PathBuf>,
        provider: Option<String>,
        model: Option<String>,
        facts_mode: Option<FactsMode>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(workspace) = workspace {
            self.workspace = workspace;
        }

        if let Some(database) = database {
            self.database = database;
        }

        if let Some(provider) = provider {
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(mode) = facts_mode {
            self.facts_mode = mode;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Resolved dataset path.
    pub fn database_path(&self) -> PathBuf {
        self.resolve(&self.database)
    }

    /// Resolved document index path.
    pub fn docs_index_path(&self) -> PathBuf {
        self.resolve(&self.docs_index)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.workspace.join(path)
        }
    }

    /// Validate provider and limits.
    pub fn validate(&self) -> AppResult<()> {
        let provider = self.provider.to_lowercase();
        if !KNOWN_PROVIDERS.contains(&provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                self.provider,
                KNOWN_PROVIDERS.join(", ")
            )));
        }

        if self.max_rows == 0 {
            return Err(AppError::Config("maxRows must be greater than zero".to_string()));
        }

        Ok(())
    }
}
