//! Output rendering for the chat loop.
//!
//! This module provides the renderer trait the session streams into and a
//! plain-text implementation for terminals.

use std::io::{self, Stdout, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// ANSI escape code for bold text (used for the agent label).
const ANSI_BOLD: &str = "\x1b[1m";

/// ANSI escape code for cyan text (used for the agent label).
const ANSI_CYAN: &str = "\x1b[36m";

/// ANSI escape code for red text (used for errors).
const ANSI_RED: &str = "\x1b[31m";

/// ANSI escape code for dim text (used for interruption notices).
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// Label printed before every streamed reply.
pub const AGENT_LABEL: &str = "Agent: ";

/// Marker printed before every per-turn error.
pub const ERROR_MARKER: &str = "[Error]: ";

/// Trait for rendering streaming output.
///
/// This abstraction allows for different rendering strategies:
/// - Plain text with ANSI styling
/// - Plain text without styling (for piping/redirecting)
/// - Capturing output in tests
pub trait Renderer: Send {
    /// Called once the remote call has started, before the first fragment.
    fn start_response(&mut self);

    /// Print a fragment of response text.
    ///
    /// This is called incrementally as fragments are streamed from the API.
    /// Fragments are printed back to back with nothing between them.
    fn print_text(&mut self, text: &str);

    /// Called when a response is complete.
    fn finish_response(&mut self);

    /// Print a per-turn error message.
    fn print_error(&mut self, error: &str);

    /// Print an informational line, such as the banner or the farewell.
    fn print_info(&mut self, info: &str);

    /// Called when the stream is interrupted by the user.
    fn print_interrupted(&mut self) {}

    /// Returns true if streaming should be interrupted.
    fn should_interrupt(&self) -> bool {
        false
    }

    /// Returns the first error hit while writing output, if any.  Once output
    /// has failed the chat loop stops rather than keep calling the API.
    fn take_write_error(&mut self) -> Option<io::Error> {
        None
    }
}

/// Plain text renderer with optional ANSI styling.
///
/// Writes to stdout unless constructed with [`PlainTextRenderer::with_writer`].
pub struct PlainTextRenderer<W: Write + Send = Stdout> {
    writer: W,
    use_color: bool,
    interrupted: Option<Arc<AtomicBool>>,
    write_error: Option<io::Error>,
}

impl PlainTextRenderer<Stdout> {
    /// Creates a new PlainTextRenderer with ANSI colors enabled.
    pub fn new() -> Self {
        Self::with_color(true)
    }

    /// Creates a new PlainTextRenderer with specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self::with_writer(io::stdout(), use_color)
    }

    /// Creates a new PlainTextRenderer with specified color and interrupt flag.
    pub fn with_color_and_interrupt(use_color: bool, interrupted: Arc<AtomicBool>) -> Self {
        Self::with_color(use_color).with_interrupt(interrupted)
    }
}

impl<W: Write + Send> PlainTextRenderer<W> {
    /// Creates a renderer that writes to `writer`.
    pub fn with_writer(writer: W, use_color: bool) -> Self {
        Self {
            writer,
            use_color,
            interrupted: None,
            write_error: None,
        }
    }

    /// Attaches an interrupt flag to the renderer.
    pub fn with_interrupt(mut self, interrupted: Arc<AtomicBool>) -> Self {
        self.interrupted = Some(interrupted);
        self
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Writes and flushes so streamed content shows up immediately.  After a
    /// failure nothing more is written until the error is taken.
    fn write(&mut self, text: &str) {
        if self.write_error.is_some() {
            return;
        }
        let result = self
            .writer
            .write_all(text.as_bytes())
            .and_then(|()| self.writer.flush());
        if let Err(err) = result {
            self.write_error = Some(err);
        }
    }

    fn styled(&self, style: &str, text: &str) -> String {
        if self.use_color {
            format!("{style}{text}{ANSI_RESET}")
        } else {
            text.to_string()
        }
    }
}

impl Default for PlainTextRenderer<Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write + Send> Renderer for PlainTextRenderer<W> {
    fn start_response(&mut self) {
        let label = self.styled(&format!("{ANSI_BOLD}{ANSI_CYAN}"), AGENT_LABEL);
        self.write(&label);
    }

    fn print_text(&mut self, text: &str) {
        self.write(text);
    }

    fn finish_response(&mut self) {
        self.write("\n\n");
    }

    fn print_error(&mut self, error: &str) {
        let line = self.styled(ANSI_RED, &format!("{ERROR_MARKER}{error}"));
        self.write(&format!("\n{line}\n"));
    }

    fn print_info(&mut self, info: &str) {
        self.write(&format!("{info}\n"));
    }

    fn print_interrupted(&mut self) {
        let notice = self.styled(ANSI_DIM, "[interrupted]");
        self.write(&format!("\n{notice}\n"));
    }

    fn should_interrupt(&self) -> bool {
        self.interrupted
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    fn take_write_error(&mut self) -> Option<io::Error> {
        self.write_error.take()
    }
}
