//! @ai:module:intent Request and response types shared by all probe clients
//! @ai:module:layer domain
//! @ai:module:public_api ChatRequest, ChatMessage, ToolDefinition, ResponseFormat, ChatResponse, ToolCall, Usage, RemoteModel
//! @ai:module:stateless true

use serde::{Deserialize, Serialize};

/// @ai:intent Model entry returned by a model listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteModel {
    pub id: String,
    #[serde(default)]
    pub owned_by: Option<String>,
    #[serde(default)]
    pub created: Option<i64>,
}

impl RemoteModel {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            owned_by: None,
            created: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// @ai:intent Function tool offered to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormat {
    Text,
    JsonObject,
}

/// @ai:intent Provider-neutral chat completion request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub stream: bool,
    pub tools: Vec<ToolDefinition>,
    pub tool_choice: Option<String>,
    pub response_format: Option<ResponseFormat>,
}

impl ChatRequest {
    /// @ai:intent Build a single-turn request from a user prompt
    /// @ai:effects pure
    pub fn user(model: &str, prompt: impl Into<String>) -> Self {
        Self {
            model: model.to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.into(),
            }],
            ..Default::default()
        }
    }

    /// @ai:intent Build a request replaying earlier turns as `(role, content)` pairs
    /// @ai:effects pure
    pub fn conversation(model: &str, turns: &[(&str, &str)]) -> Self {
        Self {
            model: model.to_string(),
            messages: turns
                .iter()
                .map(|(role, content)| ChatMessage {
                    role: role.to_string(),
                    content: content.to_string(),
                })
                .collect(),
            ..Default::default()
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self.tool_choice = Some("auto".to_string());
        self
    }

    pub fn json_mode(mut self) -> Self {
        self.response_format = Some(ResponseFormat::JsonObject);
        self
    }

    pub fn streaming(mut self) -> Self {
        self.stream = true;
        self
    }

    /// @ai:intent Content of the last user message
    /// @ai:effects pure
    pub fn prompt(&self) -> &str {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == "user")
            .map(|m| m.content.as_str())
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

/// @ai:intent Provider-neutral chat completion response
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatResponse {
    pub model: String,
    pub content: String,
    pub tool_calls: Vec<ToolCall>,
    pub finish_reason: Option<String>,
    pub usage: Option<Usage>,
    /// Duration of the attempt that produced this response, excluding pacing and retry backoff.
    pub latency_ms: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builders() {
        let request = ChatRequest::user("gpt-4o", "hello")
            .with_max_tokens(10)
            .json_mode()
            .streaming();

        assert_eq!(request.prompt(), "hello");
        assert_eq!(request.max_tokens, Some(10));
        assert_eq!(request.response_format, Some(ResponseFormat::JsonObject));
        assert!(request.stream);
        assert!(request.tool_choice.is_none());
    }

    #[test]
    fn test_conversation_prompt_is_last_user_turn() {
        let request = ChatRequest::conversation(
            "m",
            &[
                ("user", "My name is John."),
                ("assistant", "Noted, John."),
                ("user", "What is my name?"),
            ],
        );

        assert_eq!(request.messages.len(), 3);
        assert_eq!(request.messages[1].role, "assistant");
        assert_eq!(request.prompt(), "What is my name?");
    }

    #[test]
    fn test_response_format_wire_names() {
        assert_eq!(
            serde_json::to_string(&ResponseFormat::JsonObject).unwrap(),
            "\"json_object\""
        );
    }
}
