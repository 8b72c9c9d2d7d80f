//! The fact store seam.

use crate::intent::Intent;
use crate::result::StructuredResult;
use async_trait::async_trait;
use paddock_core::AppResult;

/// A question routed to the structured path, with its classified intent.
#[derive(Debug, Clone, Copy)]
pub struct FactRequest<'a> {
    pub question: &'a str,
    pub intent: &'a Intent,
}

impl<'a> FactRequest<'a> {
    pub fn new(question: &'a str, intent: &'a Intent) -> Self {
        Self { question, intent }
    }
}

/// Answers questions from the historical dataset.
///
/// An empty result means "no data" and is not an error. Errors are for
/// failures: an unreachable database, a rejected query, a model failure.
#[async_trait]
pub trait FactStore: Send + Sync {
    /// Short name for logs and status output.
    fn name(&self) -> &str;

    async fn execute(&self, request: &FactRequest<'_>) -> AppResult<StructuredResult>;
}
