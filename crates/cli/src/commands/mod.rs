//! Command handlers for the Paddock CLI.

pub mod ask;
pub mod chat;
pub mod docs;
pub mod fetch;
pub mod ingest;
pub mod status;

pub use ask::AskCommand;
pub use chat::ChatCommand;
pub use docs::DocsCommand;
pub use fetch::FetchDataCommand;
pub use ingest::IngestCommand;
pub use status::StatusCommand;
