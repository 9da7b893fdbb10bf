//! @ai:module:intent Per-model verification pipeline running the fixed probe sequence
//! @ai:module:layer application
//! @ai:module:public_api ModelVerifier, ProbeOutcome, FeatureHeuristics, ResponseAnalyzer
//! @ai:module:stateless true

pub mod analysis;
pub mod availability;
pub mod code;
pub mod features;
pub mod generative;
pub mod heuristics;
pub mod probe;

pub use analysis::ResponseAnalyzer;
pub use heuristics::{FeatureHeuristics, ProbeTarget};
pub use probe::{Check, ProbeContext, ProbeOutcome};

use crate::client::ProbeClientTrait;
use crate::config::{ModelEndpoint, OverloadConfig, VerifierConfig};
use crate::results::VerificationResult;
use availability::Existence;
use chrono::Utc;

/// @ai:intent Runs every probe against one model and fills a result in place
pub struct ModelVerifier {
    overload: OverloadConfig,
    heuristics: FeatureHeuristics,
    analyzer: ResponseAnalyzer,
}

impl ModelVerifier {
    /// @ai:intent Create a verifier from configuration
    /// @ai:effects pure
    pub fn new(config: &VerifierConfig) -> Self {
        Self {
            overload: config.overload.clone(),
            heuristics: FeatureHeuristics::default(),
            analyzer: ResponseAnalyzer::new(),
        }
    }

    /// @ai:intent Replace the feature heuristics
    /// @ai:effects pure
    pub fn with_heuristics(mut self, heuristics: FeatureHeuristics) -> Self {
        self.heuristics = heuristics;
        self
    }

    /// @ai:intent Verify one model; the result is always populated, failures included
    /// @ai:effects network, time
    pub async fn verify<C: ProbeClientTrait>(
        &self,
        client: &C,
        model_id: &str,
        endpoint: &ModelEndpoint,
    ) -> VerificationResult {
        let mut result = VerificationResult::new(model_id, &endpoint.name, &endpoint.base_url);
        self.run_probes(client, endpoint, &mut result).await;
        result
    }

    /// @ai:intent Run the probe sequence, writing each finding as soon as it is known
    /// @ai:pre result.model_info.id names the model to probe
    /// @ai:effects network, time
    pub async fn run_probes<C: ProbeClientTrait>(
        &self,
        client: &C,
        endpoint: &ModelEndpoint,
        result: &mut VerificationResult,
    ) {
        let model_id = result.model_info.id.clone();
        let ctx = ProbeContext::new(client, &model_id);

        match availability::check_existence(&ctx).await {
            Existence::Found(model) => {
                result.availability.exists = true;
                result.model_info.owned_by = model.owned_by;
                result.model_info.created = model.created;
            }
            Existence::Missing => {
                tracing::warn!("Model {} not listed by {}", model_id, endpoint.name);
                result.error = Some("model does not exist".to_string());
                return;
            }
            Existence::Unknown(error) => {
                tracing::warn!("Existence check for {} failed: {}", model_id, error);
                result.availability.error = Some(error);
            }
        }

        let responsiveness = availability::check_responsiveness(&ctx).await;
        result.availability.responsive = responsiveness.responsive;
        result.availability.latency_ms = responsiveness.latency_ms;
        result.availability.last_checked = Some(Utc::now());
        result.model_info.reported_name = responsiveness.reported_name;
        if let Some(error) = responsiveness.error {
            tracing::warn!("{} is not responsive: {}", model_id, error);
            result
                .availability
                .error
                .get_or_insert_with(|| format!("responsiveness: {}", error));
        }

        let (overloaded, stats) = availability::check_overload(&ctx, &self.overload).await;
        result.availability.overloaded = overloaded;
        result.response_time = stats;
        tracing::debug!(
            "{} burst: avg {:.1}ms, {:.2} req/s, overloaded={}",
            model_id,
            result.response_time.average_latency_ms,
            result.response_time.throughput_rps,
            overloaded
        );

        let mut features =
            features::detect_features(&ctx, &self.heuristics, &endpoint.base_url).await;
        endpoint.features.apply(&mut features);
        features::refresh_modalities(&mut features);
        result.features = features;

        result.code_capabilities = code::assess_code(&ctx, &self.analyzer).await;

        result.generative = if result.features.text_generation {
            generative::assess_generative(&ctx).await
        } else {
            tracing::debug!("Skipping generative probes for non-generative model {}", model_id);
            generative::skipped()
        };

        tracing::info!(
            "Verified {} at {} (responsive={}, code={:.0}%)",
            model_id,
            endpoint.name,
            result.availability.responsive,
            result.code_capabilities.overall_success_rate
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockProbeClient;
    use crate::config::FeatureOverrides;
    use std::collections::BTreeMap;

    fn endpoint(base_url: &str) -> ModelEndpoint {
        ModelEndpoint {
            name: "test".to_string(),
            base_url: base_url.to_string(),
            api_key: "k".to_string(),
            model: None,
            headers: BTreeMap::new(),
            features: FeatureOverrides::default(),
            pricing: None,
        }
    }

    fn verifier() -> ModelVerifier {
        ModelVerifier::new(&VerifierConfig::default())
    }

    #[tokio::test]
    async fn test_verify_healthy_model() {
        let client = MockProbeClient::new(&["gpt-4o"]);
        let result = verifier()
            .verify(&client, "gpt-4o", &endpoint("https://api.openai.com/v1"))
            .await;

        assert!(result.error.is_none());
        assert!(result.availability.exists);
        assert!(result.availability.responsive);
        assert!(!result.availability.overloaded);
        assert!(result.availability.latency_ms > 0.0);
        assert_eq!(result.response_time.request_count, 10);
        assert!(result.features.tool_use);
        assert_eq!(result.code_capabilities.overall_success_rate, 100.0);
        assert!(!result.generative.skipped);
    }

    #[tokio::test]
    async fn test_missing_model_skips_remaining_probes() {
        let client = MockProbeClient::new(&["other-model"]);
        let result = verifier()
            .verify(&client, "gpt-4o", &endpoint("https://api.openai.com/v1"))
            .await;

        assert_eq!(result.error.as_deref(), Some("model does not exist"));
        assert_eq!(result.model_info.id, "gpt-4o");
        assert_eq!(client.call_count(), 1);
        assert!(!result.availability.responsive);
    }

    #[tokio::test]
    async fn test_listing_failure_is_recoverable() {
        let client = MockProbeClient::new(&[]).with_listing_failure("HTTP 404: no /models");
        let result = verifier()
            .verify(&client, "local-model", &endpoint("http://localhost:8080/v1"))
            .await;

        assert!(result.error.is_none());
        assert!(!result.availability.exists);
        assert!(result.availability.responsive);
        assert!(result
            .availability
            .error
            .as_deref()
            .unwrap()
            .contains("no /models"));
    }

    #[tokio::test]
    async fn test_non_generative_model_skips_creative_probes() {
        let client = MockProbeClient::new(&["text-embedding-3-small"]);
        let result = verifier()
            .verify(&client, "text-embedding-3-small", &endpoint("https://api.openai.com/v1"))
            .await;

        assert!(result.features.embeddings);
        assert!(result.generative.skipped);
        assert!(result.generative.errors.is_empty());
    }

    #[tokio::test]
    async fn test_overrides_win_over_detection() {
        let client = MockProbeClient::new(&["m"]).failing("HTTP 400");
        let mut ep = endpoint("http://localhost:8080/v1");
        ep.features.streaming = Some(true);
        ep.features.multimodal = Some(true);

        let result = verifier().verify(&client, "m", &ep).await;

        assert!(result.features.streaming);
        assert!(!result.features.tool_use);
        assert!(result.features.modalities.contains(&"image".to_string()));
    }

    #[tokio::test]
    async fn test_custom_heuristics_are_used() {
        fn always(_: &ProbeTarget<'_>) -> bool {
            true
        }
        let client = MockProbeClient::new(&["m"]);
        let verifier = verifier().with_heuristics(FeatureHeuristics {
            http3: always,
            ..Default::default()
        });

        let result = verifier.verify(&client, "m", &endpoint("http://localhost")).await;
        assert!(result.features.http3);
    }
}
