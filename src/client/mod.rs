//! @ai:module:intent Probe clients able to list models and run chat completions
//! @ai:module:layer infrastructure
//! @ai:module:public_api ProbeClientTrait, ClientFactory, OpenAiClient, OpenAiClientFactory, MockProbeClient, MockClientFactory, RateLimiter, RetryPolicy

pub mod mock;
pub mod openai;
pub mod rate_limiter;
pub mod retry;
pub mod types;

pub use mock::{MockClientFactory, MockProbeClient};
pub use openai::{OpenAiClient, OpenAiClientFactory};
pub use rate_limiter::RateLimiter;
pub use retry::{retry_paced, Attempt, RetryPolicy};
pub use types::{
    ChatMessage, ChatRequest, ChatResponse, RemoteModel, ResponseFormat, ToolCall,
    ToolDefinition, Usage,
};

use crate::config::ModelEndpoint;
use crate::error::ClientError;

/// @ai:intent Capability the verifier needs from a provider endpoint
/// @ai:pre implementations bound each network attempt themselves
#[allow(async_fn_in_trait)]
pub trait ProbeClientTrait: Send + Sync {
    /// @ai:intent List the models served by the endpoint
    async fn list_models(&self) -> Result<Vec<RemoteModel>, ClientError>;

    /// @ai:intent Perform one chat completion
    async fn chat_completion(&self, request: &ChatRequest) -> Result<ChatResponse, ClientError>;
}

/// @ai:intent Creates one client per endpoint so models never share client state
pub trait ClientFactory: Send + Sync {
    type Client: ProbeClientTrait;

    /// @ai:intent Build a client for an endpoint
    fn create(&self, endpoint: &ModelEndpoint) -> Result<Self::Client, ClientError>;
}
