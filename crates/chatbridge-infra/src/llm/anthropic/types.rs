//! Anthropic Messages API types.
//!
//! Anthropic-specific request/response structures. The system prompt is a
//! top-level field, not a message.

use serde::{Deserialize, Serialize};

use chatbridge_types::error::ProviderError;

/// Request body for `POST /v1/messages`.
#[derive(Debug, Clone, Serialize)]
pub struct AnthropicRequest {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
    pub system: String,
    pub messages: Vec<AnthropicMessage>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnthropicMessage {
    pub role: String,
    pub content: String,
}

/// Non-streaming response body. Only the content blocks are read.
#[derive(Debug, Clone, Deserialize)]
pub struct AnthropicResponse {
    #[serde(default)]
    pub content: Vec<AnthropicContentBlock>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum AnthropicContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    /// `tool_use`, `thinking`, and any block type added later.
    #[serde(other)]
    Other,
}

impl AnthropicResponse {
    /// Concatenate all text blocks, ignoring every other block type.
    pub fn into_reply(self) -> Result<String, ProviderError> {
        if self.content.is_empty() {
            return Err(ProviderError::empty_response("Anthropic response missing content."));
        }

        let combined: String = self
            .content
            .into_iter()
            .filter_map(|block| match block {
                AnthropicContentBlock::Text { text } => Some(text),
                AnthropicContentBlock::Other => None,
            })
            .collect();

        let combined = combined.trim();
        if combined.is_empty() {
            return Err(ProviderError::empty_response("Anthropic response content was empty."));
        }
        Ok(combined.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> AnthropicResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn text_blocks_are_joined_and_others_skipped() {
        let resp = parse(
            r#"{"id":"msg_1","content":[
                {"type":"text","text":"Hello, "},
                {"type":"tool_use","id":"t1","name":"search","input":{}},
                {"type":"text","text":"world. "}
            ]}"#,
        );
        assert_eq!(resp.into_reply().unwrap(), "Hello, world.");
    }

    #[test]
    fn empty_content_array_is_missing_content() {
        let err = parse(r#"{"content":[]}"#).into_reply().unwrap_err();
        assert_eq!(err.message, "Anthropic response missing content.");
    }

    #[test]
    fn whitespace_only_text_is_empty() {
        let err = parse(r#"{"content":[{"type":"text","text":"  \n "}]}"#)
            .into_reply()
            .unwrap_err();
        assert_eq!(err.message, "Anthropic response content was empty.");
    }
}
