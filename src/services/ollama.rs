//! Ollama chat adapter
//!
//! Talks to the Ollama native `/api/chat` endpoint. Holds one blocking and
//! one async connection object for the adapter's lifetime, one per execution
//! mode; both share the same sliding-window rate limiter. Backend failures
//! propagate untranslated as transport/decode errors, with no retries.

use std::io::{BufRead, BufReader};

use async_trait::async_trait;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    config::AdapterConfig,
    error::{BridgeError, Result},
    limiter::RateLimiter,
    messages::{prompt_messages, ChatMessage, ResponseMessage},
    report::ReportStatus,
    services::{streaming::NdjsonFramer, ChatOptions, ChatReply, LlmClient, ToolSchema},
};

const THINK_OPEN: &str = "<think>";
const THINK_CLOSE: &str = "</think>";

/// Chat adapter for the Ollama serving API
pub struct OllamaAdapter {
    config: AdapterConfig,
    name: String,
    endpoint: String,
    client: reqwest::blocking::Client,
    aclient: reqwest::Client,
    limiter: RateLimiter,
}

impl OllamaAdapter {
    /// Create a new adapter and verify the backend is reachable
    ///
    /// Builds both connection objects with the configured timeout and issues
    /// a connectivity check against `/api/tags`; the underlying HTTP error
    /// propagates when the backend is unavailable.
    ///
    /// Uses a blocking request for the check, so construction must happen
    /// outside an async runtime context.
    pub fn new(config: AdapterConfig) -> Result<Self> {
        if config.model.trim().is_empty() {
            return Err(BridgeError::InvalidConfig(
                "model name must not be empty".to_string(),
            ));
        }
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()?;
        let mut async_builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            async_builder = async_builder.timeout(timeout);
        }
        let aclient = async_builder.build()?;

        let adapter = Self {
            name: config.identity(),
            endpoint: config.endpoint(),
            limiter: RateLimiter::new(config.max_rate, config.time_period),
            client,
            aclient,
            config,
        };
        adapter.check()?;

        debug!(
            name = %adapter.name,
            max_rate = adapter.config.max_rate,
            time_period = ?adapter.config.time_period,
            "initialized ollama adapter"
        );
        Ok(adapter)
    }

    /// Connectivity check against the model listing endpoint
    fn check(&self) -> Result<()> {
        self.client
            .get(format!("{}/api/tags", self.endpoint))
            .send()?
            .error_for_status()?;
        Ok(())
    }

    fn build_request(
        &self,
        prompt: &str,
        image_url: Option<&str>,
        options: &mut ChatOptions<'_>,
    ) -> ChatRequest {
        let messages = options
            .messages
            .take()
            .unwrap_or_else(|| prompt_messages(prompt, image_url));
        ChatRequest {
            model: self.config.model.clone(),
            messages,
            stream: self.config.stream,
            tools: options.tools.take().map(convert_tools),
        }
    }
}

#[async_trait]
impl LlmClient for OllamaAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    fn chat(
        &self,
        prompt: &str,
        image_url: Option<&str>,
        mut options: ChatOptions<'_>,
    ) -> Result<ChatReply> {
        self.limiter.acquire_blocking();

        let request = self.build_request(prompt, image_url, &mut options);
        let has_tools = request.has_tools();
        debug!(model = %request.model, stream = request.stream, "sending chat request");

        let response = self
            .client
            .post(format!("{}/api/chat", self.endpoint))
            .json(&request)
            .send()?
            .error_for_status()?;

        let mut text = String::new();
        // Tool-call handling in streaming mode is unsupported: the raw
        // message is only available on the non-streaming path.
        let mut raw_message = None;
        if self.config.stream {
            let reader = BufReader::new(response);
            for line in reader.lines() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                if consume_chunk(line.as_bytes(), &mut text, &options)? {
                    break;
                }
            }
        } else {
            let parsed: ChatResponse = response.json()?;
            text = parsed.message.content.clone();
            raw_message = Some(parsed.message);
        }

        let text = strip_reasoning(text);
        emit_report(&options, &text, ReportStatus::Finish);

        if has_tools {
            if let Some(message) = raw_message {
                if message.has_tool_calls() {
                    return Ok(ChatReply::Message(message));
                }
            }
        }
        Ok(ChatReply::Text(text))
    }

    async fn chat_async(
        &self,
        prompt: &str,
        image_url: Option<&str>,
        mut options: ChatOptions<'_>,
    ) -> Result<ChatReply> {
        self.limiter.acquire().await;

        let request = self.build_request(prompt, image_url, &mut options);
        let has_tools = request.has_tools();
        debug!(model = %request.model, stream = request.stream, "sending chat request");

        let response = self
            .aclient
            .post(format!("{}/api/chat", self.endpoint))
            .json(&request)
            .send()
            .await?
            .error_for_status()?;

        let mut text = String::new();
        let mut raw_message = None;
        if self.config.stream {
            let mut byte_stream = response.bytes_stream();
            let mut framer = NdjsonFramer::new();
            // Chunks are consumed strictly in arrival order; dropping the
            // future here discards the partial accumulation.
            'stream: while let Some(bytes) = byte_stream.next().await {
                for line in framer.feed(&bytes?) {
                    if consume_chunk(&line, &mut text, &options)? {
                        break 'stream;
                    }
                }
            }
            if let Some(line) = framer.finish() {
                consume_chunk(&line, &mut text, &options)?;
            }
        } else {
            let parsed: ChatResponse = response.json().await?;
            text = parsed.message.content.clone();
            raw_message = Some(parsed.message);
        }

        emit_report(&options, &text, ReportStatus::Finish);

        if has_tools {
            if let Some(message) = raw_message {
                if message.has_tool_calls() {
                    return Ok(ChatReply::Message(message));
                }
            }
        }
        Ok(ChatReply::Text(text))
    }
}

/// Apply one streaming chunk line to the accumulation buffer
///
/// Appends the chunk's content, emits a `RUNNING` report with the text
/// accumulated so far, and returns whether the backend marked the stream
/// done.
fn consume_chunk(line: &[u8], text: &mut String, options: &ChatOptions<'_>) -> Result<bool> {
    let chunk: ChatChunk = serde_json::from_slice(line)?;
    if let Some(content) = chunk.message.content {
        text.push_str(&content);
        emit_report(options, text, ReportStatus::Running);
    }
    Ok(chunk.done)
}

fn emit_report(options: &ChatOptions<'_>, text: &str, status: ReportStatus) {
    if let Some(reporter) = options.reporter {
        reporter.add_report_line(
            options.segment_name.as_deref(),
            options.tag_name.as_deref(),
            text,
            status,
        );
    }
}

/// Remove a `<think>…</think>` reasoning block
///
/// When both markers are present, the span from the first open marker
/// through the end of the first close marker is removed and the result is
/// trimmed. Applied on the blocking path only; the async path returns the
/// text untouched.
fn strip_reasoning(text: String) -> String {
    match (text.find(THINK_OPEN), text.find(THINK_CLOSE)) {
        (Some(start), Some(close)) => {
            let end = close + THINK_CLOSE.len();
            let mut stripped = String::with_capacity(text.len());
            stripped.push_str(&text[..start]);
            stripped.push_str(&text[end..]);
            stripped.trim().to_string()
        }
        _ => text,
    }
}

fn convert_tools(tools: Vec<ToolSchema>) -> Vec<WireTool> {
    tools
        .into_iter()
        .map(|tool| WireTool {
            tool_type: "function".to_string(),
            function: WireFunction {
                name: tool.name,
                description: tool.description,
                parameters: tool.parameters,
            },
        })
        .collect()
}

// Ollama API wire types

#[derive(Debug, Clone, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<WireTool>>,
}

impl ChatRequest {
    /// Whether a non-empty tool list rides along with this request
    fn has_tools(&self) -> bool {
        self.tools.as_ref().is_some_and(|tools| !tools.is_empty())
    }
}

#[derive(Debug, Clone, Serialize)]
struct WireTool {
    #[serde(rename = "type")]
    tool_type: String,
    function: WireFunction,
}

#[derive(Debug, Clone, Serialize)]
struct WireFunction {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatResponse {
    message: ResponseMessage,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatChunk {
    #[serde(default)]
    message: ChunkMessage,
    #[serde(default)]
    done: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ChunkMessage {
    #[serde(default)]
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_strip_reasoning_removes_block() {
        let text = "<think>reasoning</think>answer".to_string();
        assert_eq!(strip_reasoning(text), "answer");
    }

    #[test]
    fn test_strip_reasoning_trims_whitespace() {
        let text = "<think>\nlong deliberation\n</think>\n\n  final answer  ".to_string();
        assert_eq!(strip_reasoning(text), "final answer");
    }

    #[test]
    fn test_strip_reasoning_requires_both_markers() {
        assert_eq!(
            strip_reasoning("<think>unterminated".to_string()),
            "<think>unterminated"
        );
        assert_eq!(strip_reasoning("plain".to_string()), "plain");
    }

    #[test]
    fn test_strip_reasoning_keeps_leading_text() {
        let text = "before <think>x</think> after".to_string();
        assert_eq!(strip_reasoning(text), "before  after");
    }

    #[test]
    fn test_convert_tools_wire_shape() {
        let tools = convert_tools(vec![ToolSchema::new(
            "get_weather",
            "Look up the weather",
            serde_json::json!({"type": "object", "properties": {"city": {"type": "string"}}}),
        )]);
        let json = serde_json::to_value(&tools).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{
                "type": "function",
                "function": {
                    "name": "get_weather",
                    "description": "Look up the weather",
                    "parameters": {"type": "object", "properties": {"city": {"type": "string"}}},
                }
            }])
        );
    }

    #[test]
    fn test_streamed_multibyte_content_survives_chunk_split() {
        let body = "{\"message\":{\"role\":\"assistant\",\"content\":\"h\u{e9}llo\"},\"done\":false}\n";
        let bytes = body.as_bytes();
        // Boundary inside the two-byte "é"
        let split = body.find('\u{e9}').unwrap() + 1;

        let mut framer = NdjsonFramer::new();
        let mut text = String::new();
        let options = ChatOptions::new();
        assert!(framer.feed(&bytes[..split]).is_empty());
        for line in framer.feed(&bytes[split..]) {
            consume_chunk(&line, &mut text, &options).unwrap();
        }
        assert_eq!(text, "h\u{e9}llo");
    }

    #[test]
    fn test_chunk_decoding() {
        let chunk: ChatChunk =
            serde_json::from_str(r#"{"message":{"role":"assistant","content":"hi"},"done":false}"#)
                .unwrap();
        assert_eq!(chunk.message.content.as_deref(), Some("hi"));
        assert!(!chunk.done);

        let done: ChatChunk = serde_json::from_str(r#"{"done":true}"#).unwrap();
        assert!(done.message.content.is_none());
        assert!(done.done);
    }

    #[test]
    fn test_request_tool_presence() {
        let request = ChatRequest {
            model: "llama3".into(),
            messages: prompt_messages("hi", None),
            stream: false,
            tools: Some(Vec::new()),
        };
        assert!(!request.has_tools());
    }
}
