//! Process-wide backend handles and their availability.
//!
//! The dataset connection and the LLM client are created lazily on first
//! use and shared afterwards. A backend that cannot be created is reported
//! as OFF, never as an error.

use crate::bio::SqliteBiographyLookup;
use crate::composer::AnswerComposer;
use crate::live::GroundedLiveAdapter;
use paddock_core::{AppConfig, AppResult, FactsMode};
use paddock_facts::{
    ensure_dataset, FactDatabase, FactStore, SqlAgentFactStore, SqlPolicy, TemplateFactStore,
};
use paddock_llm::{create_client, LlmClient};
use paddock_prompt::load_prompt;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::OnceCell;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BackendStatus {
    /// Structured answers (templates, or the SQL agent with a model).
    pub structured: bool,
    /// Grounded live answers.
    pub live: bool,
    /// Local biography fallback.
    pub local: bool,
}

impl BackendStatus {
    pub fn status_line(&self) -> String {
        format!(
            "DB agent: {} \u{2022} Live RAG: {} \u{2022} Local fallback: {}",
            on_off(self.structured),
            on_off(self.live),
            on_off(self.local)
        )
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "ON"
    } else {
        "OFF"
    }
}

pub struct Backends {
    config: AppConfig,
    database: OnceCell<Option<Arc<FactDatabase>>>,
    llm: OnceCell<Option<Arc<dyn LlmClient>>>,
    wiring: OnceCell<Wiring>,
}

/// The composer and the status that describes exactly what it was given.
struct Wiring {
    composer: AnswerComposer,
    status: BackendStatus,
}

impl Backends {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            database: OnceCell::new(),
            llm: OnceCell::new(),
            wiring: OnceCell::new(),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// The shared dataset, downloading it first when a URL is configured.
    pub async fn database(&self) -> Option<Arc<FactDatabase>> {
        self.database
            .get_or_init(|| async { self.open_database().await })
            .await
            .clone()
    }

    async fn open_database(&self) -> Option<Arc<FactDatabase>> {
        let path = self.config.database_path();

        if let Some(url) = self.config.dataset_url.as_deref() {
            if let Err(e) = ensure_dataset(&path, Some(url)).await {
                tracing::warn!(error = %e, "Dataset download failed");
            }
        }

        let db = match FactDatabase::open(&path) {
            Ok(db) => db,
            Err(e) => {
                tracing::warn!(error = %e, "Structured backend unavailable");
                return None;
            }
        };

        match db.missing_tables() {
            Ok(missing) if missing.is_empty() => Some(Arc::new(db)),
            Ok(missing) => {
                tracing::warn!(?missing, "Dataset is missing required tables");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "Dataset could not be inspected");
                None
            }
        }
    }

    /// The shared LLM client, if the provider can be created.
    pub async fn llm(&self) -> Option<Arc<dyn LlmClient>> {
        self.llm
            .get_or_init(|| async {
                match create_client(
                    &self.config.provider,
                    self.config.endpoint.as_deref(),
                    self.config.api_key.as_deref(),
                ) {
                    Ok(client) => Some(client),
                    Err(e) => {
                        tracing::warn!(error = %e, "LLM backend unavailable");
                        None
                    }
                }
            })
            .await
            .clone()
    }

    /// Availability flags, computed once. A backend is ON only if it was
    /// actually wired into the composer.
    pub async fn status(&self) -> BackendStatus {
        self.wiring().await.status
    }

    /// A composer wired to every backend that could be set up.
    pub async fn composer(&self) -> AnswerComposer {
        self.wiring().await.composer.clone()
    }

    async fn wiring(&self) -> &Wiring {
        self.wiring.get_or_init(|| self.wire()).await
    }

    async fn wire(&self) -> Wiring {
        let mut composer = AnswerComposer::new();
        let mut status = BackendStatus::default();
        let llm = self.llm().await;

        if let Some(db) = self.database().await {
            match self.fact_store(db.clone(), llm.clone()) {
                Ok(Some(facts)) => {
                    composer = composer.with_facts(facts);
                    status.structured = true;
                }
                Ok(None) => tracing::info!("Structured backend needs an LLM in agent mode"),
                Err(e) => tracing::warn!(error = %e, "Structured backend unavailable"),
            }

            composer = composer.with_biography(Arc::new(SqliteBiographyLookup::new(db)));
            status.local = true;
        }

        if let Some(client) = llm.filter(|c| self.config.web_search && c.supports_web_search()) {
            match load_prompt(&self.config.workspace, "live.ask") {
                Ok(prompt) => {
                    composer = composer.with_live(Arc::new(GroundedLiveAdapter::new(
                        client,
                        &self.config.model,
                        prompt,
                        self.config.web_search,
                    )));
                    status.live = true;
                }
                Err(e) => tracing::warn!(error = %e, "Live backend unavailable"),
            }
        }

        tracing::info!(
            structured = status.structured,
            live = status.live,
            local = status.local,
            "Backends wired"
        );

        Wiring { composer, status }
    }

    /// The configured fact store, or `None` when agent mode has no model.
    fn fact_store(
        &self,
        db: Arc<FactDatabase>,
        llm: Option<Arc<dyn LlmClient>>,
    ) -> AppResult<Option<Arc<dyn FactStore>>> {
        match (self.config.facts_mode, llm) {
            (FactsMode::Templates, _) => Ok(Some(Arc::new(TemplateFactStore::new(db)))),
            (FactsMode::Agent, None) => Ok(None),
            (FactsMode::Agent, Some(client)) => {
                let prompt = load_prompt(&self.config.workspace, "facts.sql")?;
                let store = SqlAgentFactStore::new(
                    db,
                    client,
                    &self.config.model,
                    prompt,
                    SqlPolicy::new(self.config.max_rows),
                )?;
                Ok(Some(Arc::new(store)))
            }
        }
    }
}
