//! ollama-bridge: a chat adapter for the Ollama serving API
//!
//! This library translates a generic "prompt/messages in, text/tool-call out"
//! contract into calls against Ollama's native `/api/chat` endpoint. It
//! normalizes streaming and non-streaming responses into a single string,
//! strips `<think>` reasoning markup, and forwards incremental progress to an
//! externally supplied reporter sink.

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]

pub mod config;
pub mod error;
pub mod limiter;
pub mod messages;
pub mod report;
pub mod services;

// Re-exports for convenience
pub use config::AdapterConfig;
pub use error::{BridgeError, Result};
pub use report::{ReportStatus, Reporter};
pub use services::ollama::OllamaAdapter;
pub use services::{ChatOptions, ChatReply, LlmClient, ToolSchema};
