//! The Answer Composer.
//!
//! One question in, one assistant [`Turn`] out. Backends run in a fixed order
//! (structured, live, local biography) and each step is fault-isolated: a
//! failing or panicking backend leaves an inline error fragment and the next
//! step still runs. Nothing escapes [`AnswerComposer::compose`]; panics
//! outside a backend call become a visible failure turn.

use crate::bio::BiographyLookup;
use crate::classifier::{classify, Classification};
use crate::conversation::{Conversation, Turn};
use crate::format::summarize;
use crate::live::{LiveKnowledge, F1_DOMAIN_HINT, INLINE_DOMAIN_PREFIX};
use futures::FutureExt;
use paddock_core::{AppError, AppResult};
use paddock_facts::{FactRequest, FactStore, StructuredResult};
use serde::Serialize;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

pub const NO_RESULT_MESSAGE: &str = "I didn't find a result with the current back-ends. \
Try a more specific F1 query, or enable DB/LIVE in your environment.";

pub const FAILURE_PREFIX: &str = "Something went wrong while answering: ";

/// Turn text when the only output is an attached table.
pub const TABLE_ONLY_MESSAGE: &str = "Result attached as a table.";

/// What each step did for one question.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CompositionTrace {
    pub structured_attempted: bool,
    pub structured_produced: bool,
    pub live_attempted: bool,
    pub live_produced: bool,
    pub fallback_used: bool,
    pub terminal_message: bool,
}

#[derive(Default)]
struct Draft {
    parts: Vec<String>,
    tables: Vec<StructuredResult>,
    trace: CompositionTrace,
}

impl Draft {
    fn has_content(&self) -> bool {
        !self.parts.is_empty() || !self.tables.is_empty()
    }
}

#[derive(Clone, Default)]
pub struct AnswerComposer {
    facts: Option<Arc<dyn FactStore>>,
    live: Option<Arc<dyn LiveKnowledge>>,
    biography: Option<Arc<dyn BiographyLookup>>,
}

impl AnswerComposer {
    /// A composer with no backends; every answer is the fixed no-result message.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_facts(mut self, facts: Arc<dyn FactStore>) -> Self {
        self.facts = Some(facts);
        self
    }

    pub fn with_live(mut self, live: Arc<dyn LiveKnowledge>) -> Self {
        self.live = Some(live);
        self
    }

    pub fn with_biography(mut self, biography: Arc<dyn BiographyLookup>) -> Self {
        self.biography = Some(biography);
        self
    }

    /// Answer one question. The returned turn always has non-empty text.
    pub async fn compose(&self, question: &str) -> Turn {
        match AssertUnwindSafe(self.run_steps(question)).catch_unwind().await {
            Ok(draft) => {
                tracing::info!(
                    structured_attempted = draft.trace.structured_attempted,
                    structured_produced = draft.trace.structured_produced,
                    live_attempted = draft.trace.live_attempted,
                    live_produced = draft.trace.live_produced,
                    fallback_used = draft.trace.fallback_used,
                    terminal_message = draft.trace.terminal_message,
                    "Composed answer"
                );
                Turn::assistant(draft.parts.join("\n\n"), draft.tables)
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::error!(error = %message, "Answer composition failed");
                Turn::assistant(format!("{}{}", FAILURE_PREFIX, message), Vec::new())
            }
        }
    }

    /// Append the user turn, then the assistant turn. Blank input is ignored.
    pub async fn submit<'c>(
        &self,
        conversation: &'c mut Conversation,
        question: &str,
    ) -> Option<&'c Turn> {
        let question = question.trim();
        if question.is_empty() {
            return None;
        }

        conversation.push(Turn::user(question));
        let answer = self.compose(question).await;
        conversation.push(answer);
        conversation.last()
    }

    async fn run_steps(&self, question: &str) -> Draft {
        let classification = classify(question);
        let mut draft = Draft::default();

        self.structured_step(&classification, &mut draft).await;
        self.live_step(&classification, &mut draft).await;

        if !draft.has_content() {
            self.biography_step(question, &mut draft).await;
        }

        if !draft.has_content() {
            draft.parts.push(NO_RESULT_MESSAGE.to_string());
            draft.trace.terminal_message = true;
        } else if draft.parts.is_empty() {
            draft.parts.push(TABLE_ONLY_MESSAGE.to_string());
        }

        draft
    }

    async fn structured_step(&self, classification: &Classification, draft: &mut Draft) {
        let Some(facts) = &self.facts else {
            return;
        };
        if !(classification.query.prefer_structured || classification.wants_structured) {
            return;
        }

        draft.trace.structured_attempted = true;
        let request = FactRequest::new(&classification.query.text, &classification.intent);

        match isolate(facts.execute(&request)).await {
            Ok(result) => {
                let formatted = summarize(result);
                draft.trace.structured_produced = !formatted.is_empty();
                draft.parts.extend(formatted.text);
                draft.tables.extend(formatted.table);
            }
            Err(e) => {
                tracing::warn!(store = facts.name(), error = %e, "Structured lookup failed");
                draft.parts.push(format!("_(DB error: {})_", e));
            }
        }

        tracing::debug!(
            step = "structured",
            attempted = true,
            produced = draft.trace.structured_produced,
            intent = classification.intent.name(),
            "Step finished"
        );
    }

    async fn live_step(&self, classification: &Classification, draft: &mut Draft) {
        let Some(live) = &self.live else {
            return;
        };
        if draft.trace.structured_produced && !classification.wants_live {
            return;
        }

        draft.trace.live_attempted = true;
        let text = &classification.query.text;
        let (question, hint) = if live.accepts_domain_hint() {
            (text.clone(), Some(F1_DOMAIN_HINT))
        } else {
            (format!("{}{}", INLINE_DOMAIN_PREFIX, text), None)
        };

        match isolate(live.ask(&question, hint)).await {
            Ok(result) => {
                if let Some(rendered) = result.render() {
                    draft.trace.live_produced = true;
                    draft.parts.push(rendered);
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Live lookup failed");
                draft.parts.push(format!("_(Live error: {})_", e));
            }
        }

        tracing::debug!(
            step = "live",
            attempted = true,
            produced = draft.trace.live_produced,
            "Step finished"
        );
    }

    async fn biography_step(&self, question: &str, draft: &mut Draft) {
        let Some(biography) = &self.biography else {
            return;
        };

        match isolate(biography.lookup(question)).await {
            Ok(Some(bio)) => {
                draft.trace.fallback_used = true;
                draft.parts.push(bio);
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "Biography lookup failed"),
        }

        tracing::debug!(
            step = "biography",
            attempted = true,
            produced = draft.trace.fallback_used,
            "Step finished"
        );
    }
}

/// Await one backend call; a panic inside it becomes an error.
async fn isolate<T>(call: impl Future<Output = AppResult<T>>) -> AppResult<T> {
    AssertUnwindSafe(call)
        .catch_unwind()
        .await
        .unwrap_or_else(|payload| {
            Err(AppError::Other(format!(
                "panicked: {}",
                panic_message(payload.as_ref())
            )))
        })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unexpected failure".to_string()
    }
}
