//! Scripted collaborators for session and loop tests.

use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::Mutex;

use futures::stream;

use crate::chat::backend::{ChatBackend, FragmentStream};
use crate::chat::history::Turn;
use crate::chat::input::{LineReader, ReadLine};
use crate::error::{Error, Result};
use crate::render::Renderer;

/// What the scripted backend does for one call.
pub(crate) enum Reply {
    /// Stream these items, in order.
    Fragments(Vec<Result<String>>),
    /// Fail before any fragment.
    Fail(Error),
}

impl Reply {
    pub(crate) fn text(fragments: &[&str]) -> Self {
        Reply::Fragments(fragments.iter().map(|f| Ok(f.to_string())).collect())
    }
}

/// Backend that plays back replies and records every call it receives.
#[derive(Default)]
pub(crate) struct ScriptedBackend {
    replies: Mutex<VecDeque<Reply>>,
    calls: Mutex<Vec<(String, Vec<Turn>)>>,
}

impl ScriptedBackend {
    pub(crate) fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every (system instruction, history) pair the backend was called with.
    pub(crate) fn calls(&self) -> Vec<(String, Vec<Turn>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ChatBackend for ScriptedBackend {
    async fn stream_reply(
        &self,
        system_instruction: &str,
        history: &[Turn],
    ) -> Result<FragmentStream> {
        self.calls
            .lock()
            .unwrap()
            .push((system_instruction.to_string(), history.to_vec()));
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .expect("backend called more often than scripted");
        match reply {
            Reply::Fragments(items) => Ok(Box::pin(stream::iter(items))),
            Reply::Fail(err) => Err(err),
        }
    }
}

/// Line reader over a fixed script.  Runs out as end-of-input.
pub(crate) struct ScriptedInput {
    lines: VecDeque<ReadLine>,
    pub(crate) prompts: Vec<String>,
}

impl ScriptedInput {
    pub(crate) fn lines(lines: &[&str]) -> Self {
        Self::reads(lines.iter().map(|l| ReadLine::Line(l.to_string())).collect())
    }

    pub(crate) fn reads(reads: Vec<ReadLine>) -> Self {
        Self {
            lines: reads.into(),
            prompts: Vec::new(),
        }
    }
}

impl LineReader for ScriptedInput {
    fn read_line(&mut self, prompt: &str) -> Result<ReadLine> {
        self.prompts.push(prompt.to_string());
        Ok(self.lines.pop_front().unwrap_or(ReadLine::Eof))
    }
}

/// Renderer that records everything as plain text.
#[derive(Default)]
pub(crate) struct RecordingRenderer {
    pub(crate) output: String,
    /// Interrupt after this many fragments have been printed.
    pub(crate) interrupt_after: Option<usize>,
    fragments: usize,
}

impl RecordingRenderer {
    /// A renderer that reports an interrupt once `fragments` have been printed.
    pub(crate) fn interrupt_after(fragments: usize) -> Self {
        Self {
            interrupt_after: Some(fragments),
            ..Default::default()
        }
    }
}

/// Writer whose every write fails as if the reader went away.
pub(crate) struct ClosedPipe;

impl Write for ClosedPipe {
    fn write(&mut self, _: &[u8]) -> io::Result<usize> {
        Err(io::Error::from(io::ErrorKind::BrokenPipe))
    }

    fn flush(&mut self) -> io::Result<()> {
        Err(io::Error::from(io::ErrorKind::BrokenPipe))
    }
}

impl Renderer for RecordingRenderer {
    fn start_response(&mut self) {
        self.output.push_str("Agent: ");
    }

    fn print_text(&mut self, text: &str) {
        self.fragments += 1;
        self.output.push_str(text);
    }

    fn finish_response(&mut self) {
        self.output.push_str("\n\n");
    }

    fn print_error(&mut self, error: &str) {
        self.output.push_str(&format!("\n[Error]: {error}\n"));
    }

    fn print_info(&mut self, info: &str) {
        self.output.push_str(info);
        self.output.push('\n');
    }

    fn print_interrupted(&mut self) {
        self.output.push_str("\n[interrupted]\n");
    }

    fn should_interrupt(&self) -> bool {
        self.interrupt_after
            .is_some_and(|after| self.fragments >= after)
    }
}
