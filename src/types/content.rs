use serde::{Deserialize, Serialize};

/// Role of a [`Content`] entry on the wire.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentRole {
    /// Text the user wrote.
    User,

    /// Text the model produced.
    Model,
}

/// One piece of a content entry.
///
/// Only text parts are produced by this crate; any other part kind the API
/// returns (function calls, inline data, ...) deserializes with `text: None` and
/// is ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Part {
    /// Text of this part.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Set when the part carries the model's reasoning rather than its answer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thought: Option<bool>,
}

impl Part {
    /// Create a text part.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            thought: None,
        }
    }

    /// Returns true for reasoning parts.
    pub fn is_thought(&self) -> bool {
        self.thought.unwrap_or(false)
    }
}

/// A role-tagged list of parts, the unit of conversation the API consumes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Content {
    /// The author of this content.  Omitted for system instructions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<ContentRole>,

    /// The parts making up this content.
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    /// Create a single-part text content with the given role.
    pub fn new_with_text(text: impl Into<String>, role: ContentRole) -> Self {
        Self {
            role: Some(role),
            parts: vec![Part::text(text)],
        }
    }

    /// Create a user content.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new_with_text(text, ContentRole::User)
    }

    /// Create a model content.
    pub fn model(text: impl Into<String>) -> Self {
        Self::new_with_text(text, ContentRole::Model)
    }

    /// Create a role-less content, as used for system instructions.
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: None,
            parts: vec![Part::text(text)],
        }
    }

    /// Concatenates the text of every non-reasoning part, in order.
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter(|part| !part.is_thought())
            .filter_map(|part| part.text.as_deref())
            .collect()
    }
}
