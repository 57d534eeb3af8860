//! Uniform client interface over model-serving backends
//!
//! The [`LlmClient`] trait is the contract the surrounding orchestration
//! code programs against: prompt or messages in, text or raw tool-call
//! message out, with a blocking and a suspending entry point side by side.

pub mod ollama;
pub mod streaming;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    error::Result,
    messages::{ChatMessage, ResponseMessage},
    report::Reporter,
};

/// Tool schema passed to the backend chat endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    /// JSON schema describing the tool's parameters
    pub parameters: serde_json::Value,
}

impl ToolSchema {
    /// Create a tool schema
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }
}

/// Per-call options for [`LlmClient::chat`] and [`LlmClient::chat_async`]
#[derive(Default)]
pub struct ChatOptions<'a> {
    /// Explicit message list; bypasses prompt/image construction entirely
    pub messages: Option<Vec<ChatMessage>>,

    /// Tool definitions forwarded to the backend
    pub tools: Option<Vec<ToolSchema>>,

    /// Progress sink; when absent no reports are emitted
    pub reporter: Option<&'a dyn Reporter>,

    /// Report correlation: segment identifier
    pub segment_name: Option<String>,

    /// Report correlation: tag identifier
    pub tag_name: Option<String>,
}

impl<'a> ChatOptions<'a> {
    /// Options with every field unset
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Supply an explicit message list
    #[must_use]
    pub fn with_messages(mut self, messages: Vec<ChatMessage>) -> Self {
        self.messages = Some(messages);
        self
    }

    /// Supply tool definitions
    #[must_use]
    pub fn with_tools(mut self, tools: Vec<ToolSchema>) -> Self {
        self.tools = Some(tools);
        self
    }

    /// Supply a progress reporter with its correlation tags
    #[must_use]
    pub fn with_reporter(
        mut self,
        reporter: &'a dyn Reporter,
        segment_name: impl Into<String>,
        tag_name: impl Into<String>,
    ) -> Self {
        self.reporter = Some(reporter);
        self.segment_name = Some(segment_name.into());
        self.tag_name = Some(tag_name.into());
        self
    }
}

/// Outcome of a chat invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatReply {
    /// Final assistant text, post-processed
    Text(String),
    /// Raw backend message, returned when tools were supplied and the
    /// backend decided to invoke one
    Message(ResponseMessage),
}

impl ChatReply {
    /// The final text, if this reply is plain text
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Message(_) => None,
        }
    }

    /// The raw backend message, if the backend asked for a tool invocation
    #[must_use]
    pub fn as_message(&self) -> Option<&ResponseMessage> {
        match self {
            Self::Text(_) => None,
            Self::Message(message) => Some(message),
        }
    }
}

/// Core trait for chat model clients
///
/// Both entry points share parameter semantics; they differ only in
/// execution mode. Each invocation runs to completion independently, and
/// concurrency across simultaneous invocations is whatever the underlying
/// connection objects support.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Identity used for rate-limit bucketing
    fn name(&self) -> &str;

    /// Model identifier requests are issued for
    fn model(&self) -> &str;

    /// Blocking chat invocation
    fn chat(&self, prompt: &str, image_url: Option<&str>, options: ChatOptions<'_>)
        -> Result<ChatReply>;

    /// Suspending chat invocation
    async fn chat_async(
        &self,
        prompt: &str,
        image_url: Option<&str>,
        options: ChatOptions<'_>,
    ) -> Result<ChatReply>;
}
