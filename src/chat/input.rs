//! Reading and classifying user input.

use std::io;

use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::error::{Error, Result};

/// What one read from the terminal produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadLine {
    /// A line of text, without its line terminator.
    Line(String),
    /// The user pressed Ctrl-C at the prompt.
    Interrupted,
    /// Input is exhausted (Ctrl-D or a closed stdin).
    Eof,
}

/// A source of input lines.
pub trait LineReader {
    /// Shows `prompt` and reads one line.
    fn read_line(&mut self, prompt: &str) -> Result<ReadLine>;
}

impl LineReader for DefaultEditor {
    fn read_line(&mut self, prompt: &str) -> Result<ReadLine> {
        match self.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = self.add_history_entry(line.as_str());
                }
                Ok(ReadLine::Line(line))
            }
            Err(ReadlineError::Interrupted) => Ok(ReadLine::Interrupted),
            Err(ReadlineError::Eof) => Ok(ReadLine::Eof),
            Err(ReadlineError::Io(err)) => Err(Error::io("failed to read input", err)),
            Err(err) => Err(Error::io(
                "failed to read input",
                io::Error::other(err.to_string()),
            )),
        }
    }
}

/// A classified line of input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserInput<'a> {
    /// `quit` or `exit`, in any case, ignoring surrounding whitespace.
    Exit,
    /// Nothing but whitespace.
    Empty,
    /// Anything else, exactly as typed.
    Message(&'a str),
}

/// Classifies a line of input.
///
/// # Examples
///
/// ```
/// # use geminus::chat::{UserInput, parse_input};
/// assert_eq!(parse_input("  QUIT "), UserInput::Exit);
/// assert_eq!(parse_input("   "), UserInput::Empty);
/// assert_eq!(parse_input("Hello"), UserInput::Message("Hello"));
/// ```
pub fn parse_input(line: &str) -> UserInput<'_> {
    let trimmed = line.trim();
    if trimmed.eq_ignore_ascii_case("quit") || trimmed.eq_ignore_ascii_case("exit") {
        UserInput::Exit
    } else if trimmed.is_empty() {
        UserInput::Empty
    } else {
        UserInput::Message(line)
    }
}
