//! Configuration types for the chat application.
//!
//! This module provides CLI argument parsing via `arrrg` and the resolved
//! configuration a session is started from.

use std::path::PathBuf;

use arrrg_derive::CommandLine;

use crate::types::{KnownModel, Model};

/// Model used when `--model` is not given.
pub const DEFAULT_MODEL: KnownModel = KnownModel::Gemini15Flash;

/// Instruction sent with every request when `--system` is not given.
pub const DEFAULT_SYSTEM_INSTRUCTION: &str =
    "You are a helpful, analytical AI agent running in a terminal. You answer questions concisely.";

/// Command-line arguments for the geminus-chat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Model to use for chat.
    #[arrrg(optional, "Model to use (default: gemini-1.5-flash)", "MODEL")]
    pub model: Option<String>,

    /// System instruction sent with every request.
    #[arrrg(optional, "System instruction for the conversation", "INSTRUCTION")]
    pub system: Option<String>,

    /// Append every request, stream chunk, and error to this file as JSON lines.
    #[arrrg(optional, "Log API traffic to this file as JSON lines", "PATH")]
    pub log_file: Option<String>,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,
}

/// Configuration for a chat session.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatConfig {
    /// The model that answers.
    pub model: Model,

    /// The instruction sent with every request.
    pub system_instruction: String,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,

    /// Where to log API traffic, if anywhere.
    pub log_file: Option<PathBuf>,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    ///
    /// Defaults:
    /// - Model: gemini-1.5-flash
    /// - System instruction: [`DEFAULT_SYSTEM_INSTRUCTION`]
    /// - Color: enabled
    /// - Log file: none
    pub fn new() -> Self {
        Self {
            model: Model::Known(DEFAULT_MODEL),
            system_instruction: DEFAULT_SYSTEM_INSTRUCTION.to_string(),
            use_color: true,
            log_file: None,
        }
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: Model) -> Self {
        self.model = model;
        self
    }

    /// Sets the system instruction.
    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = instruction.into();
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }

    /// Sets the traffic log path.
    pub fn with_log_file(mut self, path: Option<PathBuf>) -> Self {
        self.log_file = path;
        self
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ChatArgs> for ChatConfig {
    fn from(args: ChatArgs) -> Self {
        let defaults = ChatConfig::new();
        ChatConfig {
            model: args
                .model
                .map(|s| s.parse::<Model>().unwrap_or(Model::Custom(s)))
                .unwrap_or(defaults.model),
            system_instruction: args.system.unwrap_or(defaults.system_instruction),
            use_color: !args.no_color,
            log_file: args.log_file.map(PathBuf::from),
        }
    }
}
