//! Conversation state: an append-only transcript of turns.

use chrono::{DateTime, Utc};
use paddock_facts::StructuredResult;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
    /// Attached tables; `None` when there are none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tables: Option<Vec<StructuredResult>>,
    pub at: DateTime<Utc>,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            tables: None,
            at: Utc::now(),
        }
    }

    /// An assistant turn; an empty table list is stored as `None`.
    pub fn assistant(text: impl Into<String>, tables: Vec<StructuredResult>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
            tables: if tables.is_empty() { None } else { Some(tables) },
            at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_tables_become_none() {
        let turn = Turn::assistant("hi", vec![]);
        assert!(turn.tables.is_none());
        let json = serde_json::to_value(&turn).unwrap();
        assert_eq!(json["role"], "assistant");
        assert!(json.get("tables").is_none());
    }

    #[test]
    fn test_append_order() {
        let mut conversation = Conversation::new();
        conversation.push(Turn::user("q"));
        conversation.push(Turn::assistant("a", vec![StructuredResult::empty()]));
        assert_eq!(conversation.len(), 2);
        assert_eq!(conversation.turns()[0].role, Role::User);
        assert_eq!(conversation.last().unwrap().tables.as_ref().unwrap().len(), 1);
    }
}
