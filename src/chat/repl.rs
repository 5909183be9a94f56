//! The interactive read-send-stream-print loop.

use crate::chat::backend::ChatBackend;
use crate::chat::input::{LineReader, ReadLine, UserInput, parse_input};
use crate::chat::session::ChatSession;
use crate::error::{Error, Result};
use crate::render::Renderer;

/// Printed once before the first prompt.
pub const BANNER: &str = "--- Gemini Agent Initialized (Type 'quit' to exit) ---";

/// Printed when the session ends.
pub const FAREWELL: &str = "Agent: Goodbye.";

/// Shown before every line of input.
pub const PROMPT: &str = "You: ";

/// How a session ended.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum SessionEnd {
    /// The user typed `quit` or `exit`.
    Quit,
    /// The user pressed Ctrl-C, at the prompt or while a reply streamed.
    Interrupted,
    /// Input ran out.
    EndOfInput,
}

impl SessionEnd {
    /// The process exit status for this ending.
    pub fn exit_code(&self) -> i32 {
        match self {
            SessionEnd::Quit | SessionEnd::EndOfInput => 0,
            SessionEnd::Interrupted => 130,
        }
    }
}

/// Runs the chat loop until the user leaves.
///
/// Per-turn failures are reported through the renderer and the loop carries on.
/// Interrupts end the session rather than the turn, including one that arrives
/// after a reply has finished but before the next prompt.
///
/// # Errors
///
/// A failure to read input or to write output is returned; either leaves the
/// session terminated.
pub async fn run_repl<B: ChatBackend>(
    session: &mut ChatSession<B>,
    input: &mut dyn LineReader,
    renderer: &mut dyn Renderer,
) -> Result<SessionEnd> {
    renderer.print_info(BANNER);
    loop {
        if let Some(err) = renderer.take_write_error() {
            session.terminate();
            return Err(Error::io("failed to write output", err));
        }
        if renderer.should_interrupt() {
            return Ok(finish(session, renderer, SessionEnd::Interrupted));
        }
        let read = match input.read_line(PROMPT) {
            Ok(read) => read,
            Err(err) => {
                session.terminate();
                return Err(err);
            }
        };
        let line = match read {
            ReadLine::Line(line) if !renderer.should_interrupt() => line,
            ReadLine::Line(_) | ReadLine::Interrupted => {
                return Ok(finish(session, renderer, SessionEnd::Interrupted));
            }
            ReadLine::Eof => {
                return Ok(finish(session, renderer, SessionEnd::EndOfInput));
            }
        };

        match parse_input(&line) {
            UserInput::Exit => return Ok(finish(session, renderer, SessionEnd::Quit)),
            UserInput::Empty => continue,
            UserInput::Message(text) => match session.send_streaming(text, renderer).await {
                Ok(_) => {}
                Err(err) if err.is_abort() => {
                    return Ok(finish(session, renderer, SessionEnd::Interrupted));
                }
                Err(err) => renderer.print_error(&err.to_string()),
            },
        }
    }
}

fn finish<B: ChatBackend>(
    session: &mut ChatSession<B>,
    renderer: &mut dyn Renderer,
    end: SessionEnd,
) -> SessionEnd {
    session.terminate();
    renderer.print_info(FAREWELL);
    end
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::history::Turn;
    use crate::chat::session::SessionState;
    use crate::chat::testing::{
        ClosedPipe, RecordingRenderer, Reply, ScriptedBackend, ScriptedInput,
    };
    use crate::render::PlainTextRenderer;

    fn session(replies: Vec<Reply>) -> ChatSession<ScriptedBackend> {
        ChatSession::start(ScriptedBackend::new(replies), "Be helpful.")
    }

    #[tokio::test]
    async fn hello_scenario() {
        let mut session = session(vec![Reply::text(&["Hi", " there!"])]);
        let mut input = ScriptedInput::lines(&["Hello", "quit"]);
        let mut renderer = RecordingRenderer::default();

        let end = run_repl(&mut session, &mut input, &mut renderer)
            .await
            .unwrap();

        assert_eq!(end, SessionEnd::Quit);
        assert_eq!(
            renderer.output,
            format!("{BANNER}\nAgent: Hi there!\n\n{FAREWELL}\n")
        );
        assert_eq!(
            session.history().turns(),
            &[Turn::user("Hello"), Turn::agent("Hi there!")]
        );
        assert_eq!(input.prompts, vec![PROMPT, PROMPT]);
        assert_eq!(session.state(), SessionState::Terminated);
    }

    #[tokio::test]
    async fn empty_input_is_skipped() {
        let mut session = session(vec![]);
        let mut input = ScriptedInput::lines(&["", "   ", "\t", "exit"]);
        let mut renderer = RecordingRenderer::default();

        let end = run_repl(&mut session, &mut input, &mut renderer)
            .await
            .unwrap();

        assert_eq!(end, SessionEnd::Quit);
        assert_eq!(renderer.output, format!("{BANNER}\n{FAREWELL}\n"));
        assert!(session.history().is_empty());
        assert!(session.backend().calls().is_empty());
        assert_eq!(input.prompts.len(), 4);
    }

    #[tokio::test]
    async fn quit_leaves_history_unchanged() {
        let mut session = session(vec![Reply::text(&["ok"])]);
        let mut input = ScriptedInput::lines(&["first", "QUIT", "never read"]);
        let mut renderer = RecordingRenderer::default();

        let end = run_repl(&mut session, &mut input, &mut renderer)
            .await
            .unwrap();

        assert_eq!(end, SessionEnd::Quit);
        assert_eq!(
            session.history().turns(),
            &[Turn::user("first"), Turn::agent("ok")]
        );
        assert_eq!(input.prompts.len(), 2);
        assert!(renderer.output.ends_with(&format!("{FAREWELL}\n")));
    }

    #[tokio::test]
    async fn failure_is_reported_and_loop_continues() {
        let mut session = session(vec![
            Reply::Fail(Error::service_unavailable("model overloaded", None)),
            Reply::text(&["recovered"]),
        ]);
        let mut input = ScriptedInput::lines(&["Hello", "Again", "exit"]);
        let mut renderer = RecordingRenderer::default();

        let end = run_repl(&mut session, &mut input, &mut renderer)
            .await
            .unwrap();

        assert_eq!(end, SessionEnd::Quit);
        assert!(
            renderer
                .output
                .contains("[Error]: Service unavailable: model overloaded")
        );
        assert!(renderer.output.contains("Agent: recovered\n\n"));
        assert_eq!(
            session.history().turns(),
            &[
                Turn::user("Hello"),
                Turn::user("Again"),
                Turn::agent("recovered"),
            ]
        );
    }

    #[tokio::test]
    async fn end_of_input_says_goodbye() {
        let mut session = session(vec![]);
        let mut input = ScriptedInput::lines(&[]);
        let mut renderer = RecordingRenderer::default();

        let end = run_repl(&mut session, &mut input, &mut renderer)
            .await
            .unwrap();

        assert_eq!(end, SessionEnd::EndOfInput);
        assert_eq!(end.exit_code(), 0);
        assert_eq!(renderer.output, format!("{BANNER}\n{FAREWELL}\n"));
    }

    #[tokio::test]
    async fn ctrl_c_at_prompt_ends_session() {
        let mut session = session(vec![]);
        let mut input = ScriptedInput::reads(vec![
            ReadLine::Interrupted,
            ReadLine::Line("Hello".to_string()),
        ]);
        let mut renderer = RecordingRenderer::default();

        let end = run_repl(&mut session, &mut input, &mut renderer)
            .await
            .unwrap();

        assert_eq!(end, SessionEnd::Interrupted);
        assert_eq!(end.exit_code(), 130);
        assert!(session.history().is_empty());
        assert_eq!(input.prompts.len(), 1);
    }

    #[tokio::test]
    async fn ctrl_c_mid_stream_ends_session() {
        let mut session = session(vec![Reply::text(&["partial", " reply"])]);
        let mut input = ScriptedInput::lines(&["Hello", "never read"]);
        let mut renderer = RecordingRenderer::interrupt_after(1);

        let end = run_repl(&mut session, &mut input, &mut renderer)
            .await
            .unwrap();

        assert_eq!(end, SessionEnd::Interrupted);
        assert!(!renderer.output.contains("[Error]"));
        assert_eq!(session.history().turns(), &[Turn::user("Hello")]);
        assert_eq!(input.prompts.len(), 1);
    }

    #[tokio::test]
    async fn ctrl_c_after_last_fragment_ends_before_next_prompt() {
        let mut session = session(vec![Reply::text(&["done"])]);
        let mut input = ScriptedInput::lines(&["Hello", "Next question"]);
        let mut renderer = RecordingRenderer::interrupt_after(1);

        let end = run_repl(&mut session, &mut input, &mut renderer)
            .await
            .unwrap();

        assert_eq!(end, SessionEnd::Interrupted);
        assert_eq!(input.prompts.len(), 1);
        assert_eq!(
            session.history().turns(),
            &[Turn::user("Hello"), Turn::agent("done")]
        );
        assert_eq!(session.backend().calls().len(), 1);
        assert_eq!(
            renderer.output,
            format!("{BANNER}\nAgent: done\n\n{FAREWELL}\n")
        );
    }

    #[tokio::test]
    async fn closed_output_stops_before_calling_backend() {
        let mut session = session(vec![]);
        let mut input = ScriptedInput::lines(&["Hello"]);
        let mut renderer = PlainTextRenderer::with_writer(ClosedPipe, false);

        let err = run_repl(&mut session, &mut input, &mut renderer)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Io { .. }));
        assert!(input.prompts.is_empty());
        assert!(session.backend().calls().is_empty());
        assert_eq!(session.state(), SessionState::Terminated);
    }

    #[tokio::test]
    async fn read_failure_is_fatal() {
        struct Broken;
        impl LineReader for Broken {
            fn read_line(&mut self, _: &str) -> Result<ReadLine> {
                Err(Error::io(
                    "failed to read input",
                    std::io::Error::other("terminal gone"),
                ))
            }
        }

        let mut session = session(vec![]);
        let mut renderer = RecordingRenderer::default();

        let err = run_repl(&mut session, &mut Broken, &mut renderer)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Io { .. }));
        assert_eq!(session.state(), SessionState::Terminated);
    }
}
