//! Interactive chat application for conversing with Gemini.
//!
//! This binary provides a streaming REPL interface for chatting with Gemini
//! models via the Gemini API.  The API key is read from `GEMINI_API_KEY`.
//!
//! # Usage
//!
//! ```bash
//! # Basic usage with default settings
//! geminus-chat
//!
//! # Specify a model
//! geminus-chat --model gemini-2.5-flash
//!
//! # Set a system instruction
//! geminus-chat --system "You are a helpful coding assistant"
//!
//! # Record API traffic as JSON lines
//! geminus-chat --log-file traffic.jsonl
//!
//! # Disable colors (useful for piping output)
//! geminus-chat --no-color
//! ```
//!
//! Type `quit` or `exit` to leave.  Ctrl-C or Ctrl-D also end the session.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use arrrg::CommandLine;
use biometrics::Collector;
use rustyline::DefaultEditor;

use geminus::chat::{
    ChatArgs, ChatConfig, ChatSession, GeminiBackend, PlainTextRenderer, run_repl,
};
use geminus::{ClientLogger, Gemini, JsonLinesLogger, register_biometrics};

/// Main entry point for the geminus-chat application.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (args, _) = ChatArgs::from_command_line_relaxed("geminus-chat [OPTIONS]");
    let config = ChatConfig::from(args);

    let collector = Collector::new();
    register_biometrics(&collector);

    let mut client = match Gemini::new(None) {
        Ok(client) => client,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };
    if let Some(path) = &config.log_file {
        let logger: Arc<dyn ClientLogger> = Arc::new(JsonLinesLogger::open(path)?);
        client = client.with_logger(logger);
    }

    let backend = GeminiBackend::new(client, config.model.clone());
    let mut session = ChatSession::start(backend, config.system_instruction);

    // The first Ctrl-C asks the stream to stop; a second one gives up waiting.
    let interrupted = Arc::new(AtomicBool::new(false));
    let interrupted_clone = interrupted.clone();
    ctrlc::set_handler(move || {
        if interrupted_clone.swap(true, Ordering::Relaxed) {
            std::process::exit(130);
        }
    })?;

    let mut renderer = PlainTextRenderer::with_color_and_interrupt(config.use_color, interrupted);
    let mut rl = DefaultEditor::new()?;

    let end = run_repl(&mut session, &mut rl, &mut renderer).await?;
    std::process::exit(end.exit_code());
}
