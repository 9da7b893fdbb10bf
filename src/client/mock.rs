//! @ai:module:intent Scripted probe client and factory for tests and dry runs
//! @ai:module:layer infrastructure
//! @ai:module:public_api MockProbeClient, MockClientFactory
//! @ai:module:stateless false

use crate::client::types::{ChatRequest, ChatResponse, RemoteModel, ResponseFormat, ToolCall, Usage};
use crate::client::{ClientFactory, ProbeClientTrait};
use crate::config::ModelEndpoint;
use crate::error::ClientError;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::time::Instant;

const DEFAULT_REPLY: &str = "```python\ndef solve(items):\n    return sorted(items)\n```";
const JSON_REPLY: &str = r#"{"name": "Ada Lovelace", "age": 36, "email": "ada@example.com"}"#;

#[derive(Debug, Clone)]
enum Behavior {
    Reply,
    Fail(String),
    Hang,
}

/// @ai:intent Client returning scripted responses without any network access
#[derive(Debug)]
pub struct MockProbeClient {
    models: Result<Vec<RemoteModel>, String>,
    default_reply: String,
    rules: Vec<(String, String)>,
    behavior: Behavior,
    delay: Duration,
    calls: AtomicUsize,
}

impl MockProbeClient {
    /// @ai:intent Create a mock that lists the given models and replies with code
    /// @ai:effects pure
    pub fn new(models: &[&str]) -> Self {
        Self {
            models: Ok(models.iter().map(|id| RemoteModel::new(*id)).collect()),
            default_reply: DEFAULT_REPLY.to_string(),
            rules: Vec::new(),
            behavior: Behavior::Reply,
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_listing_failure(mut self, message: &str) -> Self {
        self.models = Err(message.to_string());
        self
    }

    pub fn with_reply(mut self, reply: &str) -> Self {
        self.default_reply = reply.to_string();
        self
    }

    /// @ai:intent Reply with `reply` when the prompt contains `needle` (first match wins)
    /// @ai:effects pure
    pub fn respond_when(mut self, needle: &str, reply: &str) -> Self {
        self.rules.push((needle.to_string(), reply.to_string()));
        self
    }

    /// @ai:intent Make every chat completion fail
    /// @ai:effects pure
    pub fn failing(mut self, message: &str) -> Self {
        self.behavior = Behavior::Fail(message.to_string());
        self
    }

    /// @ai:intent Make every call wait forever
    /// @ai:effects pure
    pub fn hanging(mut self) -> Self {
        self.behavior = Behavior::Hang;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// @ai:intent Number of calls received so far, listing included
    /// @ai:effects pure
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn enter(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if matches!(self.behavior, Behavior::Hang) {
            std::future::pending::<()>().await;
        }
    }

    fn reply_for(&self, request: &ChatRequest) -> ChatResponse {
        let prompt = request.prompt();

        if !request.tools.is_empty() {
            let tool_calls = request
                .tools
                .iter()
                .enumerate()
                .map(|(idx, tool)| ToolCall {
                    id: format!("call_{}", idx),
                    name: tool.name.clone(),
                    arguments: "{}".to_string(),
                })
                .collect();
            return ChatResponse {
                model: request.model.clone(),
                tool_calls,
                finish_reason: Some("tool_calls".to_string()),
                ..Default::default()
            };
        }

        let content = self
            .rules
            .iter()
            .find(|(needle, _)| prompt.contains(needle.as_str()))
            .map(|(_, reply)| reply.clone())
            .unwrap_or_else(|| match request.response_format {
                Some(ResponseFormat::JsonObject) => JSON_REPLY.to_string(),
                _ => self.default_reply.clone(),
            });

        let completion_tokens = content.split_whitespace().count() as u32;
        ChatResponse {
            model: request.model.clone(),
            content,
            tool_calls: Vec::new(),
            finish_reason: Some("stop".to_string()),
            usage: Some(Usage {
                prompt_tokens: prompt.split_whitespace().count() as u32,
                completion_tokens,
                total_tokens: completion_tokens,
            }),
            latency_ms: 0.0,
        }
    }
}

impl ProbeClientTrait for MockProbeClient {
    /// @ai:intent Return the scripted model list
    /// @ai:effects time
    async fn list_models(&self) -> Result<Vec<RemoteModel>, ClientError> {
        self.enter().await;
        self.models.clone().map_err(ClientError::Scripted)
    }

    /// @ai:intent Return the scripted reply for a request
    /// @ai:effects time
    async fn chat_completion(&self, request: &ChatRequest) -> Result<ChatResponse, ClientError> {
        let start = Instant::now();
        self.enter().await;
        match &self.behavior {
            Behavior::Fail(message) => Err(ClientError::Scripted(message.clone())),
            _ => {
                let mut response = self.reply_for(request);
                response.latency_ms = start.elapsed().as_secs_f64() * 1000.0;
                Ok(response)
            }
        }
    }
}

type BuildFn = dyn Fn(&ModelEndpoint) -> Result<MockProbeClient, ClientError> + Send + Sync;

/// @ai:intent Factory handing out scripted clients chosen per endpoint
pub struct MockClientFactory {
    build: Box<BuildFn>,
    created: AtomicUsize,
}

impl MockClientFactory {
    /// @ai:intent Create a factory from a per-endpoint builder
    /// @ai:effects pure
    pub fn new<F>(build: F) -> Self
    where
        F: Fn(&ModelEndpoint) -> MockProbeClient + Send + Sync + 'static,
    {
        Self::fallible(move |endpoint| Ok(build(endpoint)))
    }

    /// @ai:intent Create a factory whose builder may refuse an endpoint
    /// @ai:effects pure
    pub fn fallible<F>(build: F) -> Self
    where
        F: Fn(&ModelEndpoint) -> Result<MockProbeClient, ClientError> + Send + Sync + 'static,
    {
        Self {
            build: Box::new(build),
            created: AtomicUsize::new(0),
        }
    }

    pub fn created_count(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }
}

impl ClientFactory for MockClientFactory {
    type Client = MockProbeClient;

    fn create(&self, endpoint: &ModelEndpoint) -> Result<MockProbeClient, ClientError> {
        self.created.fetch_add(1, Ordering::SeqCst);
        (self.build)(endpoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::types::ToolDefinition;

    #[tokio::test]
    async fn test_mock_lists_models_and_replies() {
        let client = MockProbeClient::new(&["a", "b"]).respond_when("pong", "pong");

        let models = client.list_models().await.unwrap();
        assert_eq!(models.len(), 2);

        let response = client
            .chat_completion(&ChatRequest::user("a", "say pong"))
            .await
            .unwrap();
        assert_eq!(response.content, "pong");

        let response = client
            .chat_completion(&ChatRequest::user("a", "write code"))
            .await
            .unwrap();
        assert!(response.content.contains("def solve"));
        assert_eq!(client.call_count(), 3);
    }

    #[tokio::test]
    async fn test_default_reply_and_delay_latency() {
        let client = MockProbeClient::new(&["a"])
            .with_reply("plain prose, no code")
            .respond_when("pong", "pong")
            .with_delay(Duration::from_millis(30));

        let response = client
            .chat_completion(&ChatRequest::user("a", "write code"))
            .await
            .unwrap();
        assert_eq!(response.content, "plain prose, no code");
        assert!(response.latency_ms >= 30.0);

        let response = client
            .chat_completion(&ChatRequest::user("a", "say pong"))
            .await
            .unwrap();
        assert_eq!(response.content, "pong");
    }

    #[tokio::test]
    async fn test_mock_returns_one_tool_call_per_tool() {
        let client = MockProbeClient::new(&["a"]);
        let tool = |name: &str| ToolDefinition {
            name: name.to_string(),
            description: String::new(),
            parameters: serde_json::json!({}),
        };
        let request = ChatRequest::user("a", "go").with_tools(vec![tool("x"), tool("y")]);

        let response = client.chat_completion(&request).await.unwrap();
        assert_eq!(response.tool_calls.len(), 2);
    }

    #[tokio::test]
    async fn test_mock_failures() {
        let client = MockProbeClient::new(&[])
            .with_listing_failure("down")
            .failing("boom");

        assert_eq!(
            client.list_models().await.unwrap_err(),
            ClientError::Scripted("down".to_string())
        );
        assert!(client
            .chat_completion(&ChatRequest::user("a", "hi"))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_hanging_mock_never_completes() {
        let client = MockProbeClient::new(&["a"]).hanging();
        let outcome = tokio::time::timeout(Duration::from_millis(20), client.list_models()).await;
        assert!(outcome.is_err());
    }
}
