//! @ai:module:intent OpenAI-compatible HTTP probe client with pacing and retries
//! @ai:module:layer infrastructure
//! @ai:module:public_api OpenAiClient, OpenAiClientFactory, ClientSettings
//! @ai:module:stateless false

use crate::client::rate_limiter::RateLimiter;
use crate::client::retry::{retry_paced, RetryPolicy};
use crate::client::types::{
    ChatRequest, ChatResponse, RemoteModel, ResponseFormat, ToolCall, ToolDefinition, Usage,
};
use crate::client::{ClientFactory, ProbeClientTrait};
use crate::config::{ModelEndpoint, VerifierConfig};
use crate::error::ClientError;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, USER_AGENT};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const MAX_ERROR_BODY_CHARS: usize = 500;

/// @ai:intent Transport settings shared by every client the factory creates
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub max_retries: u32,
    pub requests_per_minute: u32,
    pub request_timeout: Duration,
    pub retry_base: Duration,
}

impl ClientSettings {
    pub fn from_config(config: &VerifierConfig) -> Self {
        Self {
            max_retries: config.global.max_retries,
            requests_per_minute: config.global.requests_per_minute,
            request_timeout: config.run.request_timeout(),
            retry_base: Duration::from_millis(250),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            request_timeout: self.request_timeout,
            retry_base: self.retry_base,
        }
    }
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self::from_config(&VerifierConfig::default())
    }
}

#[derive(Debug, Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    messages: Vec<ApiMessageOut<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    stream: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ApiTool<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ApiResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ApiMessageOut<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ApiTool<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    function: &'a ToolDefinition,
}

#[derive(Debug, Serialize)]
struct ApiResponseFormat {
    #[serde(rename = "type")]
    kind: ResponseFormat,
}

impl<'a> ApiRequest<'a> {
    fn from_request(request: &'a ChatRequest) -> Self {
        Self {
            model: &request.model,
            messages: request
                .messages
                .iter()
                .map(|m| ApiMessageOut {
                    role: &m.role,
                    content: &m.content,
                })
                .collect(),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            stream: request.stream,
            tools: request
                .tools
                .iter()
                .map(|function| ApiTool {
                    kind: "function",
                    function,
                })
                .collect(),
            tool_choice: request.tool_choice.as_deref(),
            response_format: request.response_format.map(|kind| ApiResponseFormat { kind }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiModelList {
    data: Vec<RemoteModel>,
}

#[derive(Debug, Deserialize)]
struct ApiChatResponse {
    #[serde(default)]
    model: String,
    #[serde(default)]
    choices: Vec<ApiChoice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiMessageIn,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiMessageIn {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<ApiToolCall>,
}

#[derive(Debug, Deserialize)]
struct ApiToolCall {
    #[serde(default)]
    id: String,
    function: ApiFunctionCall,
}

#[derive(Debug, Deserialize)]
struct ApiFunctionCall {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct ApiStreamChunk {
    #[serde(default)]
    model: String,
    #[serde(default)]
    choices: Vec<ApiStreamChoice>,
}

#[derive(Debug, Deserialize)]
struct ApiStreamChoice {
    #[serde(default)]
    delta: ApiDelta,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ApiDelta {
    #[serde(default)]
    content: Option<String>,
}

impl From<ApiChatResponse> for ChatResponse {
    fn from(api: ApiChatResponse) -> Self {
        let mut choices = api.choices.into_iter();
        let first = choices.next();

        let (content, tool_calls, finish_reason) = match first {
            Some(choice) => (
                choice.message.content.unwrap_or_default(),
                choice
                    .message
                    .tool_calls
                    .into_iter()
                    .map(|call| ToolCall {
                        id: call.id,
                        name: call.function.name,
                        arguments: call.function.arguments,
                    })
                    .collect(),
                choice.finish_reason,
            ),
            None => (String::new(), Vec::new(), None),
        };

        ChatResponse {
            model: api.model,
            content,
            tool_calls,
            finish_reason,
            usage: api.usage,
            latency_ms: 0.0,
        }
    }
}

/// @ai:intent Reassemble a server-sent-events completion body into one response
/// @ai:effects pure
fn parse_event_stream(body: &str) -> Result<ChatResponse, ClientError> {
    let mut response = ChatResponse::default();
    let mut saw_chunk = false;

    for line in body.lines() {
        let Some(data) = line.trim().strip_prefix("data:") else {
            continue;
        };
        let data = data.trim();
        if data == "[DONE]" {
            break;
        }

        let chunk: ApiStreamChunk =
            serde_json::from_str(data).map_err(|e| ClientError::Decode(e.to_string()))?;
        saw_chunk = true;

        if response.model.is_empty() {
            response.model = chunk.model;
        }
        for choice in chunk.choices {
            if let Some(content) = choice.delta.content {
                response.content.push_str(&content);
            }
            if choice.finish_reason.is_some() {
                response.finish_reason = choice.finish_reason;
            }
        }
    }

    if !saw_chunk {
        return Err(ClientError::Decode("stream contained no data events".to_string()));
    }
    Ok(response)
}

/// @ai:intent Client for one endpoint speaking the OpenAI REST dialect
pub struct OpenAiClient {
    http: reqwest::Client,
    base_url: String,
    rate_limiter: RateLimiter,
    policy: RetryPolicy,
}

impl OpenAiClient {
    /// @ai:intent Create a client for an endpoint
    /// @ai:pre endpoint.base_url is an http(s) URL
    /// @ai:effects pure
    pub fn new(endpoint: &ModelEndpoint, settings: ClientSettings) -> Result<Self, ClientError> {
        let headers = build_headers(endpoint)?;
        let http = reqwest::Client::builder()
            .connect_timeout(settings.request_timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            base_url: endpoint.base_url.trim_end_matches('/').to_string(),
            rate_limiter: RateLimiter::new(settings.requests_per_minute),
            policy: settings.retry_policy(),
        })
    }

    async fn list_models_once(&self) -> Result<Vec<RemoteModel>, ClientError> {
        let response = self
            .http
            .get(format!("{}/models", self.base_url))
            .send()
            .await?;
        let response = check_status(response).await?;
        let list: ApiModelList = response.json().await?;
        Ok(list.data)
    }

    async fn chat_completion_once(&self, request: &ChatRequest) -> Result<ChatResponse, ClientError> {
        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .json(&ApiRequest::from_request(request))
            .send()
            .await?;
        let response = check_status(response).await?;

        if request.stream {
            let body = response.text().await?;
            parse_event_stream(&body)
        } else {
            let api: ApiChatResponse = response.json().await?;
            Ok(api.into())
        }
    }
}

impl ProbeClientTrait for OpenAiClient {
    /// @ai:intent List models via GET /models
    /// @ai:effects network
    async fn list_models(&self) -> Result<Vec<RemoteModel>, ClientError> {
        let operation = format!("list models at {}", self.base_url);
        let attempt = retry_paced(&self.rate_limiter, &self.policy, &operation, || {
            self.list_models_once()
        })
        .await?;
        Ok(attempt.value)
    }

    /// @ai:intent Send a chat completion via POST /chat/completions
    /// @ai:effects network
    async fn chat_completion(&self, request: &ChatRequest) -> Result<ChatResponse, ClientError> {
        let operation = format!("chat completion at {}", self.base_url);
        let attempt = retry_paced(&self.rate_limiter, &self.policy, &operation, || {
            self.chat_completion_once(request)
        })
        .await?;

        let mut response = attempt.value;
        response.latency_ms = attempt.latency.as_secs_f64() * 1000.0;
        Ok(response)
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ClientError::Status {
        status: status.as_u16(),
        body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
    })
}

fn build_headers(endpoint: &ModelEndpoint) -> Result<HeaderMap, ClientError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        USER_AGENT,
        HeaderValue::from_static(concat!("llm-verifier/", env!("CARGO_PKG_VERSION"))),
    );

    if !endpoint.api_key.is_empty() {
        let value = HeaderValue::from_str(&format!("Bearer {}", endpoint.api_key))
            .map_err(|e| ClientError::Build(format!("invalid api key: {}", e)))?;
        headers.insert(AUTHORIZATION, value);
    }

    for (name, value) in &endpoint.headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| ClientError::Build(format!("invalid header name '{}': {}", name, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| ClientError::Build(format!("invalid value for header '{}': {}", name, e)))?;
        headers.insert(name, value);
    }

    Ok(headers)
}

/// @ai:intent Factory producing one `OpenAiClient` per endpoint
pub struct OpenAiClientFactory {
    settings: ClientSettings,
}

impl OpenAiClientFactory {
    /// @ai:intent Create a factory from verifier configuration
    /// @ai:effects pure
    pub fn new(config: &VerifierConfig) -> Self {
        Self {
            settings: ClientSettings::from_config(config),
        }
    }
}

impl ClientFactory for OpenAiClientFactory {
    type Client = OpenAiClient;

    fn create(&self, endpoint: &ModelEndpoint) -> Result<OpenAiClient, ClientError> {
        OpenAiClient::new(endpoint, self.settings.clone())
    }
}
