use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::Content;

/// Why a candidate stopped generating.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FinishReason {
    /// Default value; not used by the API for finished candidates.
    FinishReasonUnspecified,
    /// Natural stop point or a stop sequence.
    Stop,
    /// The output token limit was reached.
    MaxTokens,
    /// Flagged by safety filters.
    Safety,
    /// Flagged as reciting training data.
    Recitation,
    /// Unsupported language.
    Language,
    /// Unspecified other reason.
    Other,
    /// Contains forbidden terms.
    Blocklist,
    /// Contains prohibited content.
    ProhibitedContent,
    /// Contains sensitive personally identifiable information.
    Spii,
    /// The model produced an invalid function call.
    MalformedFunctionCall,
    /// Any reason this crate does not know about yet.
    #[serde(other)]
    Unknown,
}

impl FinishReason {
    /// Returns true when content filters cut the candidate off.
    pub fn is_content_filter(&self) -> bool {
        matches!(
            self,
            FinishReason::Safety
                | FinishReason::Recitation
                | FinishReason::Blocklist
                | FinishReason::ProhibitedContent
                | FinishReason::Spii
        )
    }
}

impl fmt::Display for FinishReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FinishReason::FinishReasonUnspecified => "FINISH_REASON_UNSPECIFIED",
            FinishReason::Stop => "STOP",
            FinishReason::MaxTokens => "MAX_TOKENS",
            FinishReason::Safety => "SAFETY",
            FinishReason::Recitation => "RECITATION",
            FinishReason::Language => "LANGUAGE",
            FinishReason::Other => "OTHER",
            FinishReason::Blocklist => "BLOCKLIST",
            FinishReason::ProhibitedContent => "PROHIBITED_CONTENT",
            FinishReason::Spii => "SPII",
            FinishReason::MalformedFunctionCall => "MALFORMED_FUNCTION_CALL",
            FinishReason::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

/// One generated response candidate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// The generated content.  Absent on chunks that only carry a finish reason.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,

    /// Set on the last chunk of the candidate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<FinishReason>,

    /// Position of this candidate in the response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
}

/// Feedback about the prompt itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    /// Present when the prompt was rejected, e.g. `SAFETY`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_reason: Option<String>,
}

/// Token accounting for a request.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    /// Tokens in the prompt, history and system instruction included.
    #[serde(default)]
    pub prompt_token_count: u64,

    /// Tokens generated across all candidates.
    #[serde(default)]
    pub candidates_token_count: u64,

    /// Sum of the above plus any reasoning tokens.
    #[serde(default)]
    pub total_token_count: u64,
}

/// A complete response, or one chunk of a streamed response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    /// Candidate responses; a chat request yields one.
    #[serde(default)]
    pub candidates: Vec<Candidate>,

    /// Feedback about the prompt, present when it was blocked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_feedback: Option<PromptFeedback>,

    /// Token usage, typically complete on the final chunk.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_metadata: Option<UsageMetadata>,

    /// Version of the model that served the request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_version: Option<String>,
}

impl GenerateContentResponse {
    /// Returns the text this chunk contributes to the reply.
    ///
    /// `Ok(None)` means the chunk carries no text, which is normal for the final
    /// chunk of a stream.  A blocked prompt, or a candidate stopped by content
    /// filters before producing any text, is an error.
    pub fn text_fragment(&self) -> Result<Option<String>> {
        if let Some(reason) = self
            .prompt_feedback
            .as_ref()
            .and_then(|feedback| feedback.block_reason.as_deref())
        {
            return Err(Error::blocked(reason, "the prompt was blocked"));
        }
        let Some(candidate) = self.candidates.first() else {
            return Ok(None);
        };
        let text = candidate
            .content
            .as_ref()
            .map(Content::text)
            .unwrap_or_default();
        if !text.is_empty() {
            return Ok(Some(text));
        }
        match candidate.finish_reason {
            Some(reason) if reason.is_content_filter() => Err(Error::blocked(
                reason.to_string(),
                "the response was withheld",
            )),
            _ => Ok(None),
        }
    }
}
