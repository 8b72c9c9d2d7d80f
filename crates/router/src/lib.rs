//! Question routing and answer composition for Paddock.
//!
//! A question is classified ([`classify`]), then the [`AnswerComposer`]
//! consults the structured fact store, the live knowledge adapter and the
//! local biography lookup in turn, and always produces an assistant
//! [`Turn`].

pub mod backends;
pub mod bio;
pub mod classifier;
pub mod composer;
pub mod conversation;
pub mod format;
pub mod live;

pub use backends::{BackendStatus, Backends};
pub use bio::{BiographyLookup, SqliteBiographyLookup};
pub use classifier::{classify, Classification, NormalizedQuery};
pub use composer::{AnswerComposer, CompositionTrace, NO_RESULT_MESSAGE, TABLE_ONLY_MESSAGE};
pub use conversation::{Conversation, Role, Turn};
pub use format::{render_table, summarize, Formatted};
pub use live::{Citation, GroundedLiveAdapter, LiveKnowledge, LiveResult};
