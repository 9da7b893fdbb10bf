//! @ai:module:intent Shared plumbing for probes: client calls, latency and outcome folding
//! @ai:module:layer application
//! @ai:module:public_api ProbeOutcome, ProbeContext, Check, Accept, elapsed_ms, response_latency_ms, MIN_LATENCY_MS
//! @ai:module:stateless true

use crate::client::{ChatRequest, ChatResponse, ProbeClientTrait, RemoteModel};
use crate::error::ClientError;
use tokio::time::Instant;

/// Floor for any recorded latency, so a failed call never reports zero time.
pub const MIN_LATENCY_MS: f64 = 0.001;

/// @ai:intent Milliseconds since `start`, never below `MIN_LATENCY_MS`
/// @ai:effects time
pub fn elapsed_ms(start: Instant) -> f64 {
    (start.elapsed().as_secs_f64() * 1000.0).max(MIN_LATENCY_MS)
}

/// @ai:intent Endpoint latency of a call: the answering attempt when it succeeded, wall time otherwise
/// @ai:effects time
pub fn response_latency_ms(outcome: &Result<ChatResponse, ClientError>, start: Instant) -> f64 {
    match outcome {
        Ok(response) if response.latency_ms > 0.0 => response.latency_ms.max(MIN_LATENCY_MS),
        _ => elapsed_ms(start),
    }
}

/// Acceptance test applied to one probe response.
pub type Accept = fn(&ChatResponse) -> bool;

/// @ai:intent A request paired with the test its response must pass
#[derive(Clone)]
pub struct Check {
    pub request: ChatRequest,
    pub accept: Accept,
}

impl Check {
    pub fn new(request: ChatRequest, accept: Accept) -> Self {
        Self { request, accept }
    }
}

/// @ai:intent A single probe finding plus the error that degraded it, if any
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeOutcome<T> {
    pub value: T,
    pub error: Option<String>,
}

impl<T> ProbeOutcome<T> {
    pub fn ok(value: T) -> Self {
        Self { value, error: None }
    }

    pub fn failed(value: T, error: impl Into<String>) -> Self {
        Self {
            value,
            error: Some(error.into()),
        }
    }

    /// @ai:intent Take the value, recording any error as `probe: message`
    /// @ai:effects pure
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ProbeOutcome<U> {
        ProbeOutcome {
            value: f(self.value),
            error: self.error,
        }
    }

    pub fn fold_into(self, probe: &str, errors: &mut Vec<String>) -> T {
        if let Some(error) = self.error {
            tracing::debug!("Probe {} degraded: {}", probe, error);
            errors.push(format!("{}: {}", probe, error));
        }
        self.value
    }
}

/// @ai:intent One model's client; the client bounds and retries each call itself
pub struct ProbeContext<'a, C: ProbeClientTrait> {
    pub client: &'a C,
    pub model_id: &'a str,
}

impl<'a, C: ProbeClientTrait> ProbeContext<'a, C> {
    pub fn new(client: &'a C, model_id: &'a str) -> Self {
        Self { client, model_id }
    }

    /// @ai:intent Single-turn request addressed to this model
    /// @ai:effects pure
    pub fn request(&self, prompt: impl Into<String>) -> ChatRequest {
        ChatRequest::user(self.model_id, prompt)
    }

    /// @ai:intent Multi-turn request addressed to this model
    /// @ai:effects pure
    pub fn conversation(&self, turns: &[(&str, &str)]) -> ChatRequest {
        ChatRequest::conversation(self.model_id, turns)
    }

    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ClientError> {
        self.client.chat_completion(request).await
    }

    pub async fn list_models(&self) -> Result<Vec<RemoteModel>, ClientError> {
        self.client.list_models().await
    }

    /// @ai:intent Send a request and judge the response; call failures become `false`
    /// @ai:effects network
    pub async fn check<F>(&self, request: &ChatRequest, accept: F) -> ProbeOutcome<bool>
    where
        F: FnOnce(&ChatResponse) -> bool,
    {
        match self.chat(request).await {
            Ok(response) => ProbeOutcome::ok(accept(&response)),
            Err(err) => ProbeOutcome::failed(false, err.to_string()),
        }
    }

    /// @ai:intent Run several checks in order, counting passes and keeping the first call error
    /// @ai:effects network
    pub async fn count_passing(&self, checks: &[Check]) -> ProbeOutcome<usize> {
        let mut passed = 0;
        let mut error = None;
        for check in checks {
            let outcome = self.check(&check.request, check.accept).await;
            if outcome.value {
                passed += 1;
            }
            if error.is_none() {
                error = outcome.error;
            }
        }
        ProbeOutcome { value: passed, error }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockProbeClient;

    #[test]
    fn test_fold_records_prefixed_error() {
        let mut errors = Vec::new();
        let value = ProbeOutcome::failed(false, "HTTP 500").fold_into("tool_use", &mut errors);
        assert!(!value);
        assert_eq!(errors, vec!["tool_use: HTTP 500".to_string()]);

        let value = ProbeOutcome::ok(true).fold_into("streaming", &mut errors);
        assert!(value);
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_elapsed_is_never_zero() {
        assert!(elapsed_ms(Instant::now()) >= MIN_LATENCY_MS);
    }

    #[tokio::test]
    async fn test_check_turns_call_failures_into_false() {
        let client = MockProbeClient::new(&["m"]).failing("HTTP 503: busy");
        let ctx = ProbeContext::new(&client, "m");

        let outcome = ctx.check(&ctx.request("hi"), |_| true).await;
        assert!(!outcome.value);
        assert_eq!(outcome.error.as_deref(), Some("HTTP 503: busy"));
    }

    #[tokio::test]
    async fn test_count_passing_keeps_first_error() {
        let client = MockProbeClient::new(&["m"]).respond_when("blue", "Your color is blue.");
        let ctx = ProbeContext::new(&client, "m");
        let checks = [
            Check::new(ctx.request("favorite color blue?"), |r| r.content.contains("blue")),
            Check::new(ctx.request("anything"), |r| r.content.contains("blue")),
            Check::new(ctx.request("blue again"), |r| !r.content.is_empty()),
        ];

        let outcome = ctx.count_passing(&checks).await;
        assert_eq!(outcome.value, 2);
        assert!(outcome.error.is_none());

        let failing = MockProbeClient::new(&["m"]).failing("refused");
        let ctx = ProbeContext::new(&failing, "m");
        let checks = [
            Check::new(ctx.request("a"), |_| true),
            Check::new(ctx.request("b"), |_| true),
        ];
        let outcome = ctx.count_passing(&checks).await;
        assert_eq!(outcome.value, 0);
        assert_eq!(outcome.error.as_deref(), Some("refused"));
    }

    #[test]
    fn test_latency_prefers_the_answering_attempt() {
        let start = Instant::now();
        let answered: Result<ChatResponse, ClientError> = Ok(ChatResponse {
            latency_ms: 42.0,
            ..Default::default()
        });
        assert_eq!(response_latency_ms(&answered, start), 42.0);

        let failed: Result<ChatResponse, ClientError> =
            Err(ClientError::Scripted("down".to_string()));
        assert!(response_latency_ms(&failed, start) >= MIN_LATENCY_MS);
    }
}
