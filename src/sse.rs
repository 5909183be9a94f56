//! Server-Sent Events (SSE) processing for streaming responses.
//!
//! `streamGenerateContent?alt=sse` answers with one event per response chunk:
//!
//! ```text
//! data: {"candidates": [...]}\r\n\r\n
//! ```
//!
//! This module turns the raw byte stream into parsed [`GenerateContentResponse`]
//! chunks.  Bytes are buffered until a full event is available, so events and
//! multi-byte characters split across network reads are reassembled.

use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};
use serde::Deserialize;

use crate::error::ErrorEnvelope;
use crate::observability::{STREAM_BYTES, STREAM_ERRORS, STREAM_EVENTS};
use crate::{Error, GenerateContentResponse, Result};

/// A data payload is either a response chunk or an error reported mid-stream.
#[derive(Deserialize)]
#[serde(untagged)]
enum StreamPayload {
    Error(ErrorEnvelope),
    Chunk(GenerateContentResponse),
}

struct SseState<S> {
    stream: S,
    /// Bytes that do not yet form complete UTF-8.
    pending: Vec<u8>,
    /// Decoded text not yet consumed as events.
    buffer: String,
    done: bool,
}

/// Process a stream of bytes into a stream of response chunks.
pub fn process_sse<S>(byte_stream: S) -> impl Stream<Item = Result<GenerateContentResponse>>
where
    S: Stream<Item = std::result::Result<Bytes, reqwest::Error>> + Unpin + Send + 'static,
{
    // Convert reqwest errors to our error type
    let stream = byte_stream.map(|result| {
        result
            .map_err(|e| Error::streaming(format!("Error in HTTP stream: {e}"), Some(Box::new(e))))
    });

    let state = SseState {
        stream,
        pending: Vec::new(),
        buffer: String::new(),
        done: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(event_text) = take_event(&mut state.buffer) {
                match parse_event(&event_text) {
                    Some(item) => return Some((counted(item), state)),
                    None => continue,
                }
            }

            if state.done {
                return None;
            }

            match state.stream.next().await {
                Some(Ok(bytes)) => {
                    STREAM_BYTES.count(bytes.len() as u64);
                    state.pending.extend_from_slice(&bytes);
                    if let Err(e) = decode_pending(&mut state.pending, &mut state.buffer) {
                        state.done = true;
                        return Some((counted(Err(e)), state));
                    }
                }
                Some(Err(e)) => {
                    state.done = true;
                    return Some((counted(Err(e)), state));
                }
                None => {
                    state.done = true;
                    if !state.pending.is_empty() {
                        state.pending.clear();
                        let err = Error::encoding("stream ended inside a UTF-8 sequence", None);
                        return Some((counted(Err(err)), state));
                    }
                    // Flush a final event that lacks its trailing blank line.
                    let rest = std::mem::take(&mut state.buffer);
                    if let Some(item) = parse_event(&rest) {
                        return Some((counted(item), state));
                    }
                    return None;
                }
            }
        }
    })
}

fn counted(item: Result<GenerateContentResponse>) -> Result<GenerateContentResponse> {
    match &item {
        Ok(_) => STREAM_EVENTS.click(),
        Err(_) => STREAM_ERRORS.click(),
    }
    item
}

/// Moves every complete UTF-8 sequence from `pending` into `buffer`, normalizing
/// CRLF line endings.  A sequence cut off at the end of `pending` is left there
/// for the next read.
fn decode_pending(pending: &mut Vec<u8>, buffer: &mut String) -> Result<()> {
    let valid = match std::str::from_utf8(pending) {
        Ok(text) => text.len(),
        Err(e) if e.error_len().is_none() => e.valid_up_to(),
        Err(e) => {
            return Err(Error::encoding(
                format!("Invalid UTF-8 in stream: {e}"),
                Some(Box::new(e)),
            ));
        }
    };
    let text = std::str::from_utf8(&pending[..valid])?;
    buffer.push_str(text);
    pending.drain(..valid);
    if buffer.contains('\r') {
        *buffer = buffer.replace("\r\n", "\n");
    }
    Ok(())
}

/// Removes the first complete event (terminated by a blank line) from `buffer`.
fn take_event(buffer: &mut String) -> Option<String> {
    let end = buffer.find("\n\n")?;
    let event = buffer[..end].to_string();
    buffer.drain(..end + 2);
    Some(event)
}

/// Parses one event.  Events without data (comments, keep-alives) yield `None`.
fn parse_event(event_text: &str) -> Option<Result<GenerateContentResponse>> {
    let data = event_text
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|value| value.strip_prefix(' ').unwrap_or(value))
        .collect::<Vec<_>>()
        .join("\n");
    let data = data.trim();
    if data.is_empty() || data == "[DONE]" {
        return None;
    }

    match serde_json::from_str::<StreamPayload>(data) {
        Ok(StreamPayload::Chunk(chunk)) => Some(Ok(chunk)),
        Ok(StreamPayload::Error(envelope)) => Some(Err(envelope.into_error(500, None))),
        Err(e) => Some(Err(Error::serialization(
            format!("Failed to parse event JSON: {e}"),
            Some(Box::new(e)),
        ))),
    }
}
