//! LLM integration crate for Paddock.
//!
//! This crate provides a provider-agnostic abstraction for interacting with
//! Large Language Models behind a trait-based interface.
//!
//! # Providers
//! - **Gemini**: hosted model with optional Google Search grounding (default)
//! - **Ollama**: local LLM runtime, no grounding
//!
//! # Example
//! ```no_run
//! use paddock_llm::{LlmClient, LlmRequest, providers::GeminiClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = GeminiClient::new("api-key");
//! let request = LlmRequest::new("Who leads the championship?", "gemini-2.5-flash")
//!     .with_web_search();
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;
pub mod types;

// Re-export main types
pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::create_client;
pub use providers::{GeminiClient, OllamaClient};
pub use types::{GroundingMetadata, GroundingSource, ProviderType};
