//! Core chat session management.
//!
//! This module provides the `ChatSession` struct which owns the conversation
//! history and drives one streamed exchange with the backend per user turn.

use std::time::Instant;

use futures::StreamExt;

use crate::chat::backend::ChatBackend;
use crate::chat::history::History;
use crate::error::{Error, Result};
use crate::observability::{
    SESSION_FRAGMENTS, SESSION_TURN_ERRORS, SESSION_TURNS, STREAM_DURATION, STREAM_FIRST_FRAGMENT,
};
use crate::render::Renderer;

/// Where the session is in its read-send-stream cycle.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// Waiting for the next line of input.
    AwaitingInput,
    /// A user turn was appended and the backend has been called.
    Sending,
    /// The backend is delivering fragments.
    Streaming,
    /// The user ended the session.  No further turns are accepted.
    Terminated,
}

/// A chat session that manages conversation state and backend interactions.
///
/// The session is constructed once, seeded with a system instruction and an empty
/// history, and passed by reference to whatever drives it.
pub struct ChatSession<B: ChatBackend> {
    backend: B,
    system_instruction: String,
    history: History,
    state: SessionState,
}

impl<B: ChatBackend> ChatSession<B> {
    /// Starts a session with an empty history.
    pub fn start(backend: B, system_instruction: impl Into<String>) -> Self {
        Self {
            backend,
            system_instruction: system_instruction.into(),
            history: History::new(),
            state: SessionState::AwaitingInput,
        }
    }

    /// Sends a user message and streams the response.
    ///
    /// This method:
    /// 1. Adds the user message to history
    /// 2. Calls the backend with the full history
    /// 3. Renders fragments as they arrive
    /// 4. Adds the concatenated reply to history as an agent turn
    ///
    /// On error the user turn stays in history and no agent turn is added.
    ///
    /// # Errors
    ///
    /// Returns the backend's error if the call or the stream fails, and
    /// [`Error::Abort`] if the renderer reports an interrupt mid-stream.
    pub async fn send_streaming(
        &mut self,
        user_input: &str,
        renderer: &mut dyn Renderer,
    ) -> Result<String> {
        if self.state == SessionState::Terminated {
            return Err(Error::abort("the session has ended"));
        }

        self.history.push_user(user_input);
        self.state = SessionState::Sending;
        SESSION_TURNS.click();

        let outcome = self.stream_reply(renderer).await;
        self.state = SessionState::AwaitingInput;

        match outcome {
            Ok(reply) => {
                self.history.push_agent(reply.clone());
                Ok(reply)
            }
            Err(err) => {
                SESSION_TURN_ERRORS.click();
                Err(err)
            }
        }
    }

    async fn stream_reply(&mut self, renderer: &mut dyn Renderer) -> Result<String> {
        let start = Instant::now();
        let mut fragments = self
            .backend
            .stream_reply(&self.system_instruction, self.history.turns())
            .await?;
        self.state = SessionState::Streaming;
        renderer.start_response();

        let mut reply = String::new();
        let mut first = true;
        while let Some(fragment) = fragments.next().await {
            if renderer.should_interrupt() {
                renderer.print_interrupted();
                return Err(Error::abort("interrupted by user"));
            }
            let fragment = fragment?;
            if first {
                STREAM_FIRST_FRAGMENT.add(start.elapsed().as_secs_f64());
                first = false;
            }
            SESSION_FRAGMENTS.click();
            renderer.print_text(&fragment);
            reply.push_str(&fragment);
        }
        renderer.finish_response();
        STREAM_DURATION.add(start.elapsed().as_secs_f64());
        Ok(reply)
    }

    /// Ends the session.  Later calls to [`send_streaming`](Self::send_streaming)
    /// fail without touching history.
    pub fn terminate(&mut self) {
        self.state = SessionState::Terminated;
    }

    /// The current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The conversation so far.
    pub fn history(&self) -> &History {
        &self.history
    }

    /// The instruction sent with every request.
    pub fn system_instruction(&self) -> &str {
        &self.system_instruction
    }

    /// The backend replies come from.
    pub fn backend(&self) -> &B {
        &self.backend
    }
}
