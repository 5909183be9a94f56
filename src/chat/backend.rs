//! The remote side of a chat session.
//!
//! [`ChatBackend`] is the seam between the session loop and the service that
//! writes replies.  [`GeminiBackend`] talks to the Gemini API; tests substitute
//! scripted backends.

use std::pin::Pin;

use futures::stream::{Stream, StreamExt};

use crate::chat::history::Turn;
use crate::error::Result;
use crate::types::{GenerateContentRequest, Model};
use crate::Gemini;

/// A finite, non-restartable stream of reply fragments, in arrival order.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Something that can answer a conversation.
#[async_trait::async_trait]
pub trait ChatBackend: Send + Sync {
    /// Starts a reply to `history`, whose last turn is the user turn being
    /// answered.
    ///
    /// An error here means no fragment will ever arrive.  Errors after the
    /// stream starts arrive as items of the stream.
    async fn stream_reply(
        &self,
        system_instruction: &str,
        history: &[Turn],
    ) -> Result<FragmentStream>;
}

/// Backend for a single Gemini model.
#[derive(Debug, Clone)]
pub struct GeminiBackend {
    client: Gemini,
    model: Model,
}

impl GeminiBackend {
    /// Creates a backend that sends every turn to `model`.
    pub fn new(client: Gemini, model: Model) -> Self {
        Self { client, model }
    }

    /// The model replies come from.
    pub fn model(&self) -> &Model {
        &self.model
    }

    fn request(system_instruction: &str, history: &[Turn]) -> GenerateContentRequest {
        GenerateContentRequest::new(history.iter().map(Turn::to_content).collect())
            .with_system_instruction(system_instruction)
    }
}

#[async_trait::async_trait]
impl ChatBackend for GeminiBackend {
    async fn stream_reply(
        &self,
        system_instruction: &str,
        history: &[Turn],
    ) -> Result<FragmentStream> {
        let request = Self::request(system_instruction, history);
        let chunks = self.client.stream(&self.model, &request).await?;
        let fragments = chunks.filter_map(|chunk| async move {
            match chunk.and_then(|chunk| chunk.text_fragment()) {
                Ok(Some(text)) => Some(Ok(text)),
                Ok(None) => None,
                Err(err) => Some(Err(err)),
            }
        });
        Ok(Box::pin(fragments))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Content, KnownModel};

    #[test]
    fn request_carries_whole_history() {
        let history = vec![
            Turn::user("Hello"),
            Turn::agent("Hi there!"),
            Turn::user("What is 2+2?"),
        ];
        let request = GeminiBackend::request("Be concise.", &history);
        assert_eq!(
            request.contents,
            vec![
                Content::user("Hello"),
                Content::model("Hi there!"),
                Content::user("What is 2+2?"),
            ]
        );
        assert_eq!(
            request.system_instruction,
            Some(Content::system("Be concise."))
        );
    }

    #[test]
    fn backend_reports_model() {
        let client = Gemini::new(Some("test-key".to_string())).unwrap();
        let backend = GeminiBackend::new(client, KnownModel::Gemini25Flash.into());
        assert_eq!(backend.model().to_string(), "gemini-2.5-flash");
    }
}
