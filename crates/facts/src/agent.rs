//! Natural-language-to-SQL fact store.
//!
//! The model sees the live schema plus few-shot examples (the `facts.sql`
//! prompt), replies with a fenced ```sql block, and the extracted statement
//! passes through [`SqlPolicy`] before it reaches the dataset.

use crate::dataset::FactDatabase;
use crate::intent::extract_year;
use crate::policy::SqlPolicy;
use crate::result::StructuredResult;
use crate::store::{FactRequest, FactStore};
use async_trait::async_trait;
use paddock_core::{AppError, AppResult};
use paddock_llm::{LlmClient, LlmRequest};
use paddock_prompt::{build_prompt, PromptDefinition};
use regex::Regex;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

static SQL_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)```sql\s*(.+?)```").expect("sql fence regex is valid"));

static BREAKDOWN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(by race|per round|timeline|by season|per circuit|per track|breakdown)\b")
        .expect("breakdown regex is valid")
});

static LATEST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(latest|current|recent|this season)\b").expect("latest regex is valid")
});

const BREAKDOWN_HINT: &str =
    " (return a multi-row breakdown with clear columns and an ORDER BY)";

pub struct SqlAgentFactStore {
    db: Arc<FactDatabase>,
    client: Arc<dyn LlmClient>,
    model: String,
    prompt: PromptDefinition,
    policy: SqlPolicy,
    schema: String,
}

impl SqlAgentFactStore {
    /// Reads the dataset schema once; it is reused for every question.
    pub fn new(
        db: Arc<FactDatabase>,
        client: Arc<dyn LlmClient>,
        model: impl Into<String>,
        prompt: PromptDefinition,
        policy: SqlPolicy,
    ) -> AppResult<Self> {
        let schema = db.schema_text()?;
        Ok(Self {
            db,
            client,
            model: model.into(),
            prompt,
            policy,
            schema,
        })
    }

    /// The question as sent to the model, with breakdown and season hints.
    fn augment_question(&self, question: &str) -> AppResult<String> {
        let mut augmented = question.trim().to_string();

        if BREAKDOWN.is_match(question) {
            augmented.push_str(BREAKDOWN_HINT);
        }

        if extract_year(question).is_none() && LATEST.is_match(question) {
            if let Some(year) = self.db.latest_year()? {
                augmented.push_str(&format!(" (latest season in the data: {})", year));
            }
        }

        Ok(augmented)
    }

    async fn generate_sql(&self, question: &str) -> AppResult<String> {
        let mut vars = HashMap::new();
        vars.insert("schema".to_string(), self.schema.clone());
        vars.insert("question".to_string(), self.augment_question(question)?);
        let built = build_prompt(&self.prompt, vars)?;

        let mut request = LlmRequest::new(built.user, &self.model).with_temperature(0.0);
        if let Some(system) = built.system {
            request = request.with_system(system);
        }

        let response = self.client.complete(&request).await?;
        extract_sql(&response.content)
    }
}

/// Body of the first fenced ```sql block.
pub fn extract_sql(text: &str) -> AppResult<String> {
    SQL_FENCE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|sql| !sql.is_empty())
        .ok_or_else(|| AppError::Llm("Model reply contained no ```sql block".to_string()))
}

#[async_trait]
impl FactStore for SqlAgentFactStore {
    fn name(&self) -> &str {
        "sql-agent"
    }

    async fn execute(&self, request: &FactRequest<'_>) -> AppResult<StructuredResult> {
        let generated = self.generate_sql(request.question).await?;
        let sql = self.policy.sanitize(&generated)?;
        tracing::debug!(sql = %sql, "Running generated SQL");
        self.db.query(&sql, &[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::{Intent, Slots};
    use crate::testing::build_fixture;
    use paddock_llm::{LlmResponse, LlmUsage};
    use paddock_prompt::builtin_prompt;
    use std::sync::Mutex;
    use tempfile::TempDir;

    struct CannedLlm {
        reply: String,
        last_prompt: Mutex<Option<String>>,
    }

    impl CannedLlm {
        fn new(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: reply.to_string(),
                last_prompt: Mutex::new(None),
            })
        }
    }

    #[async_trait]
    impl LlmClient for CannedLlm {
        fn provider_name(&self) -> &str {
            "canned"
        }

        async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
            *self.last_prompt.lock().unwrap() = Some(request.prompt.clone());
            Ok(LlmResponse {
                content: self.reply.clone(),
                model: request.model.clone(),
                usage: LlmUsage::new(1, 1),
                grounding: None,
            })
        }
    }

    fn agent(llm: Arc<CannedLlm>) -> (TempDir, SqlAgentFactStore) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("f1.sqlite");
        build_fixture(&path).unwrap();
        let db = Arc::new(FactDatabase::open(&path).unwrap());
        let store = SqlAgentFactStore::new(
            db,
            llm,
            "test-model",
            builtin_prompt("facts.sql").unwrap(),
            SqlPolicy::new(200),
        )
        .unwrap();
        (dir, store)
    }

    async fn ask(store: &SqlAgentFactStore, question: &str) -> AppResult<StructuredResult> {
        let intent = Intent::Auto(Slots::default());
        store.execute(&FactRequest::new(question, &intent)).await
    }

    #[test]
    fn test_extract_sql() {
        let reply = "Here you go:\n```sql\nSELECT 1;\n```\nDone.";
        assert_eq!(extract_sql(reply).unwrap(), "SELECT 1;");
        assert!(extract_sql("SELECT 1").is_err());
        assert_eq!(extract_sql("```SQL\nselect 2\n```").unwrap(), "select 2");
    }

    #[tokio::test]
    async fn test_generated_sql_runs() {
        let llm = CannedLlm::new(
            "```sql\nSELECT name FROM constructors WHERE name LIKE 'Red%';\n```",
        );
        let (_dir, store) = agent(llm);
        let result = ask(&store, "Red Bull name?").await.unwrap();
        assert_eq!(result.row_count(), 1);
    }

    #[tokio::test]
    async fn test_chained_sql_rejected_before_execution() {
        let llm = CannedLlm::new("```sql\nSELECT 1; DELETE FROM drivers\n```");
        let (_dir, store) = agent(llm);
        let err = ask(&store, "anything").await.unwrap_err();
        assert!(matches!(err, AppError::UnsafeQuery(_)));
    }

    #[tokio::test]
    async fn test_prompt_carries_schema_and_hints() {
        let llm = CannedLlm::new("```sql\nSELECT COUNT(*) FROM races\n```");
        let (_dir, store) = agent(llm.clone());
        ask(&store, "Ferrari points by race in the latest season")
            .await
            .unwrap();

        let prompt = llm.last_prompt.lock().unwrap().clone().unwrap();
        assert!(prompt.contains("- constructors("));
        assert!(prompt.contains("multi-row breakdown"));
        assert!(prompt.contains("latest season in the data: 2024"));
    }

    #[tokio::test]
    async fn test_explicit_year_suppresses_latest_note() {
        let llm = CannedLlm::new("```sql\nSELECT COUNT(*) FROM races\n```");
        let (_dir, store) = agent(llm.clone());
        ask(&store, "current points leader in 2021").await.unwrap();

        let prompt = llm.last_prompt.lock().unwrap().clone().unwrap();
        assert!(!prompt.contains("latest season in the data"));
    }

    #[tokio::test]
    async fn test_missing_fence_is_error() {
        let llm = CannedLlm::new("I cannot answer that.");
        let (_dir, store) = agent(llm);
        assert!(matches!(
            ask(&store, "who?").await.unwrap_err(),
            AppError::Llm(_)
        ));
    }
}
