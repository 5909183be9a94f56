// Public modules
pub mod chat;
pub mod client;
pub mod client_logger;
pub mod error;
pub mod observability;
pub mod render;
pub mod sse;
pub mod types;

// Re-exports
pub use client::{ChunkStream, Gemini};
pub use client_logger::{ClientLogger, JsonLinesLogger};
pub use error::{Error, Result};
pub use observability::register_biometrics;
pub use render::{PlainTextRenderer, Renderer};
pub use types::*;
