//! Chat application module for interactive conversations with Gemini.
//!
//! This module provides a streaming REPL chat interface built on top of the
//! geminus client library.  It supports:
//!
//! - Streaming responses printed fragment by fragment as they arrive
//! - A conversation history resent in full with every turn
//! - Configurable model, system instruction, and traffic logging
//!
//! # Architecture
//!
//! The module is organized into several components:
//!
//! - [`config`]: CLI argument parsing and configuration
//! - [`history`]: The ordered record of user and agent turns
//! - [`backend`]: The seam between a session and the service that replies
//! - [`session`]: Core chat session management
//! - [`input`]: Reading and classifying lines of input
//! - [`repl`]: The interactive loop

mod backend;
mod config;
mod history;
mod input;
mod repl;
mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use crate::render::{PlainTextRenderer, Renderer};
pub use backend::{ChatBackend, FragmentStream, GeminiBackend};
pub use config::{ChatArgs, ChatConfig, DEFAULT_MODEL, DEFAULT_SYSTEM_INSTRUCTION};
pub use history::{History, Turn, TurnRole};
pub use input::{LineReader, ReadLine, UserInput, parse_input};
pub use repl::{BANNER, FAREWELL, PROMPT, SessionEnd, run_repl};
pub use session::{ChatSession, SessionState};
