//! Chat message types
//!
//! Defines the role-tagged message sequence sent to the backend chat endpoint
//! and the raw message shape coming back from it. User content is either a
//! plain string or a typed part list (text + image reference), matching the
//! multimodal chat wire format.

use serde::{Deserialize, Serialize};

/// System persona used when the adapter builds the message list itself.
pub const DEFAULT_SYSTEM_PROMPT: &str = "you are a helpful assistant";

/// Message role in the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// Image reference inside an `image_url` content part
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub url: String,
}

/// Typed part of a multimodal user message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageRef },
}

/// Message content: plain text or a list of typed parts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

/// A single message in the outgoing chat sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: MessageContent,
}

impl ChatMessage {
    /// Create a system message
    #[must_use]
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: MessageContent::Text(text.into()),
        }
    }

    /// Create a plain-text user message
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Text(text.into()),
        }
    }

    /// Create a user message carrying a text part and an image reference
    #[must_use]
    pub fn user_with_image(text: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Parts(vec![
                ContentPart::Text { text: text.into() },
                ContentPart::ImageUrl {
                    image_url: ImageRef {
                        url: image_url.into(),
                    },
                },
            ]),
        }
    }
}

/// Build the default message list for a prompt
///
/// Exactly one system message precedes the user message. With an image the
/// user content is the two-part list, otherwise the plain prompt string.
#[must_use]
pub fn prompt_messages(prompt: &str, image_url: Option<&str>) -> Vec<ChatMessage> {
    let user = match image_url {
        Some(url) => ChatMessage::user_with_image(prompt, url),
        None => ChatMessage::user(prompt),
    };
    vec![ChatMessage::system(DEFAULT_SYSTEM_PROMPT), user]
}

/// Raw assistant message returned by the backend
///
/// `tool_calls` is opaque to the adapter: its presence decides whether the
/// whole message is handed back instead of the accumulated text, but the
/// payload itself is never interpreted here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseMessage {
    pub role: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<serde_json::Value>>,
}

impl ResponseMessage {
    /// Check whether the backend asked for a tool invocation
    #[must_use]
    pub fn has_tool_calls(&self) -> bool {
        self.tool_calls.as_ref().is_some_and(|calls| !calls.is_empty())
    }
}
