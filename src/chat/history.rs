//! Conversation history.
//!
//! The history is append-only: turns are never edited or removed for the life of
//! the session, and their order is the context the model sees on every call.

use crate::types::Content;

/// Who authored a turn.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TurnRole {
    /// The person at the terminal.
    User,

    /// The remote model.
    Agent,
}

/// One role-tagged unit of conversation text.  Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    role: TurnRole,
    text: String,
}

impl Turn {
    /// A user turn.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            text: text.into(),
        }
    }

    /// An agent turn.
    pub fn agent(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Agent,
            text: text.into(),
        }
    }

    /// Who authored this turn.
    pub fn role(&self) -> TurnRole {
        self.role
    }

    /// The turn's text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The wire form of this turn.  Agent turns are sent with the `model` role.
    pub fn to_content(&self) -> Content {
        match self.role {
            TurnRole::User => Content::user(self.text.clone()),
            TurnRole::Agent => Content::model(self.text.clone()),
        }
    }
}

/// Ordered, append-only sequence of turns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    turns: Vec<Turn>,
}

impl History {
    /// An empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a user turn.
    pub fn push_user(&mut self, text: impl Into<String>) {
        self.turns.push(Turn::user(text));
    }

    /// Appends an agent turn.
    pub fn push_agent(&mut self, text: impl Into<String>) {
        self.turns.push(Turn::agent(text));
    }

    /// All turns, oldest first.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Number of turns.
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// True before the first turn.
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// The most recent turn.
    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Iterates over turns, oldest first.
    pub fn iter(&self) -> std::slice::Iter<'_, Turn> {
        self.turns.iter()
    }
}

impl<'a> IntoIterator for &'a History {
    type Item = &'a Turn;
    type IntoIter = std::slice::Iter<'a, Turn>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
