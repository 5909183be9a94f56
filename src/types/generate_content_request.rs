use serde::{Deserialize, Serialize};

use crate::types::Content;

/// Body of a `generateContent` / `streamGenerateContent` call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    /// The conversation so far, oldest first.  The last entry is the user turn
    /// being answered.
    pub contents: Vec<Content>,

    /// Standing instructions for the model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
}

impl GenerateContentRequest {
    /// Create a request over the given contents.
    pub fn new(contents: Vec<Content>) -> Self {
        Self {
            contents,
            system_instruction: None,
        }
    }

    /// Sets the system instruction.  An empty instruction is dropped.
    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        let instruction = instruction.into();
        self.system_instruction = if instruction.trim().is_empty() {
            None
        } else {
            Some(Content::system(instruction))
        };
        self
    }
}
