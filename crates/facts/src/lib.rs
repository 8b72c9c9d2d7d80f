//! Structured Formula 1 facts for Paddock.
//!
//! - [`FactDatabase`]: read-only SQLite handle over the Ergast-shaped dataset
//! - [`FactStore`]: the seam the router calls, with two implementations:
//!   [`TemplateFactStore`] (fixed queries per [`Intent`]) and
//!   [`SqlAgentFactStore`] (model-written SQL behind [`SqlPolicy`])
//! - [`Team`]: constructor enumeration with historical aliasing

pub mod agent;
pub mod dataset;
pub mod intent;
pub mod policy;
pub mod result;
pub mod store;
pub mod team;
pub mod templates;

#[cfg(any(test, feature = "fixtures"))]
pub mod testing;

pub use agent::SqlAgentFactStore;
pub use dataset::{ensure_dataset, FactDatabase};
pub use intent::{extract_year, Intent, Slots};
pub use policy::SqlPolicy;
pub use result::{Cell, StructuredResult};
pub use store::{FactRequest, FactStore};
pub use team::Team;
pub use templates::TemplateFactStore;
