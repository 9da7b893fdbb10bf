//! @ai:module:intent Deterministic reduction of raw probe observations into weighted scores
//! @ai:module:layer domain
//! @ai:module:public_api ScoringEngine, weights
//! @ai:module:stateless true

use crate::config::{Pricing, ScoringConfig};
use crate::results::{
    CodeCapabilityBreakdown, FeatureRichnessBreakdown, PerformanceScore, ReliabilityBreakdown,
    ResponsivenessBreakdown, ScoreBreakdown, ValuePropositionBreakdown, VerificationResult,
};

/// Fixed weights. Each group sums to 1.0.
pub mod weights {
    pub const CODE_LANGUAGE_SUCCESS: f64 = 0.20;
    pub const CODE_GENERATION: f64 = 0.12;
    pub const CODE_COMPLETION: f64 = 0.10;
    pub const CODE_DEBUGGING: f64 = 0.10;
    pub const CODE_COMPLEXITY: f64 = 0.10;
    pub const CODE_REVIEW: f64 = 0.08;
    pub const CODE_TEST_GENERATION: f64 = 0.08;
    pub const CODE_DOCUMENTATION: f64 = 0.08;
    pub const CODE_ARCHITECTURE: f64 = 0.08;
    pub const CODE_OPTIMIZATION: f64 = 0.06;

    pub const RESPONSE_LATENCY: f64 = 0.50;
    pub const RESPONSE_THROUGHPUT: f64 = 0.30;
    pub const RESPONSE_CONSISTENCY: f64 = 0.20;

    pub const RELIABILITY_AVAILABILITY: f64 = 0.30;
    pub const RELIABILITY_CONSISTENCY: f64 = 0.30;
    pub const RELIABILITY_ERROR_RATE: f64 = 0.20;
    pub const RELIABILITY_STABILITY: f64 = 0.20;

    pub const FEATURE_CORE: f64 = 0.35;
    pub const FEATURE_ADVANCED: f64 = 0.35;
    pub const FEATURE_EXPERIMENTAL: f64 = 0.15;
    pub const FEATURE_GENERATIVE: f64 = 0.15;

    pub const VALUE_QUALITY: f64 = 0.60;
    pub const VALUE_COST_EFFICIENCY: f64 = 0.40;

    /// Quality inside the value score.
    pub const QUALITY_CODE: f64 = 0.50;
    pub const QUALITY_RESPONSIVENESS: f64 = 0.30;
    pub const QUALITY_RELIABILITY: f64 = 0.20;

    pub const OVERALL_CODE: f64 = 0.40;
    pub const OVERALL_RESPONSIVENESS: f64 = 0.15;
    pub const OVERALL_RELIABILITY: f64 = 0.15;
    pub const OVERALL_FEATURES: f64 = 0.20;
    pub const OVERALL_VALUE: f64 = 0.10;
}

use weights::*;

/// @ai:intent Pure scorer parameterized by normalization thresholds
#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    config: ScoringConfig,
    pricing: Option<Pricing>,
}

impl ScoringEngine {
    /// @ai:intent Create an engine with the given thresholds
    /// @ai:effects pure
    pub fn new(config: ScoringConfig) -> Self {
        Self {
            config,
            pricing: None,
        }
    }

    /// @ai:intent Same thresholds, with a known price as the cost proxy
    /// @ai:effects pure
    pub fn with_pricing(&self, pricing: Option<Pricing>) -> Self {
        Self {
            config: self.config.clone(),
            pricing,
        }
    }

    /// @ai:intent Score one result; failed results score zero everywhere
    /// @ai:effects pure
    pub fn score(&self, result: &VerificationResult) -> PerformanceScore {
        if result.is_failed() {
            return PerformanceScore::default();
        }

        let code = self.code_capability(result);
        let responsiveness = self.responsiveness(result);
        let reliability = self.reliability(result);
        let features = self.feature_richness(result);
        let code_score = code.total();
        let responsiveness_score = responsiveness.total();
        let reliability_score = reliability.total();
        let value = self.value_proposition(result, code_score, responsiveness_score, reliability_score);

        let feature_score = features.total();
        let value_score = value.total();
        let overall = clamp(
            code_score * OVERALL_CODE
                + responsiveness_score * OVERALL_RESPONSIVENESS
                + reliability_score * OVERALL_RELIABILITY
                + feature_score * OVERALL_FEATURES
                + value_score * OVERALL_VALUE,
        );

        PerformanceScore {
            overall,
            code_capability: code_score,
            responsiveness: responsiveness_score,
            reliability: reliability_score,
            feature_richness: feature_score,
            value_proposition: value_score,
            breakdown: ScoreBreakdown {
                code_capability: code,
                responsiveness,
                reliability,
                feature_richness: features,
                value_proposition: value,
            },
        }
    }

    fn code_capability(&self, result: &VerificationResult) -> CodeCapabilityBreakdown {
        let caps = &result.code_capabilities;
        let debugging = if caps.code_debugging {
            100.0
        } else if caps.code_generation || caps.code_completion {
            50.0
        } else {
            0.0
        };
        let depth_score = caps.complexity.max_handled_depth as f64 * 20.0;

        CodeCapabilityBreakdown {
            language_success: clamp(caps.overall_success_rate),
            generation: flag(caps.code_generation),
            completion: flag(caps.code_completion),
            debugging,
            complexity: clamp(depth_score.max(caps.complexity.code_quality)),
            review: flag(caps.code_review),
            test_generation: flag(caps.test_generation),
            documentation: flag(caps.documentation),
            architecture: flag(caps.architecture),
            optimization: flag(caps.code_optimization),
        }
    }

    fn responsiveness(&self, result: &VerificationResult) -> ResponsivenessBreakdown {
        let stats = &result.response_time;
        let target = self.config.latency_target_ms.max(f64::EPSILON);

        let latency = if !result.availability.responsive {
            0.0
        } else {
            let latency = result.availability.latency_ms;
            match latency / target {
                r if r > 10.0 => 10.0,
                r if r > 5.0 => 30.0,
                r if r > 2.0 => 60.0,
                r if r > 1.0 => 80.0,
                _ => 100.0,
            }
        };

        let rps_target = self.config.throughput_target_rps.max(f64::EPSILON);
        let throughput = match stats.throughput_rps {
            t if t <= 0.0 => 0.0,
            t if t >= rps_target => 100.0,
            t if t >= rps_target / 2.0 => 80.0,
            t if t >= rps_target / 5.0 => 60.0,
            t if t >= rps_target / 10.0 => 40.0,
            _ => 20.0,
        };

        let consistency = if stats.request_count == 0 || stats.min_latency_ms <= 0.0 {
            0.0
        } else {
            let spread = (stats.max_latency_ms - stats.min_latency_ms) / stats.min_latency_ms;
            clamp(100.0 - spread * 50.0)
        };

        ResponsivenessBreakdown {
            latency,
            throughput,
            consistency,
        }
    }

    fn reliability(&self, result: &VerificationResult) -> ReliabilityBreakdown {
        let availability = &result.availability;
        let availability_score = match (availability.exists, availability.responsive) {
            (true, true) => 100.0,
            (false, true) => 75.0,
            (true, false) => 50.0,
            (false, false) => 0.0,
        };

        let consistency = if availability.overloaded { 30.0 } else { 100.0 };

        let mut error_rate = if result.response_time.request_count == 0 {
            if availability.responsive { 100.0 } else { 0.0 }
        } else {
            (1.0 - result.response_time.failure_ratio()) * 100.0
        };
        if availability.error.is_some() {
            error_rate = error_rate.min(20.0);
        }

        let stability = if availability.overloaded || availability.error.is_some() {
            60.0
        } else {
            100.0
        };

        ReliabilityBreakdown {
            availability: availability_score,
            consistency,
            error_rate: clamp(error_rate),
            stability,
        }
    }

    fn feature_richness(&self, result: &VerificationResult) -> FeatureRichnessBreakdown {
        let f = &result.features;
        let c = &result.code_capabilities;

        let core = [
            c.code_generation,
            c.code_completion,
            c.code_explanation,
            c.code_review,
            f.tool_use,
            f.streaming,
        ];
        let advanced = [
            f.embeddings,
            f.reasoning,
            f.structured_output,
            f.json_mode,
            f.parallel_tool_use,
            f.multimodal,
            c.refactoring,
            c.documentation,
        ];
        let experimental = [
            f.http3,
            f.brotli,
            f.toon,
            f.mcp,
            f.lsp,
            f.acp,
            f.batch_processing,
            f.reranking,
            f.image_generation,
            f.audio_generation,
            f.video_generation,
        ];

        FeatureRichnessBreakdown {
            core: share(&core),
            advanced: share(&advanced),
            experimental: share(&experimental),
            generative: clamp(result.generative.creativity_score),
        }
    }

    fn value_proposition(
        &self,
        result: &VerificationResult,
        code: f64,
        responsiveness: f64,
        reliability: f64,
    ) -> ValuePropositionBreakdown {
        let quality = clamp(
            code * QUALITY_CODE
                + responsiveness * QUALITY_RESPONSIVENESS
                + reliability * QUALITY_RELIABILITY,
        );

        let cost_efficiency = match self.pricing {
            Some(pricing) => {
                let reference = self.config.reference_price_per_1m.max(f64::EPSILON);
                100.0 / (1.0 + pricing.blended_per_1m().max(0.0) / reference)
            }
            None if result.response_time.request_count > 0 || result.availability.responsive => {
                let latency = if result.response_time.request_count > 0 {
                    result.response_time.average_latency_ms
                } else {
                    result.availability.latency_ms
                };
                let reference = self.config.reference_latency_ms.max(f64::EPSILON);
                100.0 / (1.0 + latency.max(0.0) / reference)
            }
            None => 0.0,
        };

        ValuePropositionBreakdown {
            quality,
            cost_efficiency: clamp(cost_efficiency),
        }
    }
}

impl CodeCapabilityBreakdown {
    /// @ai:intent Weighted sum of the components
    /// @ai:effects pure
    pub fn total(&self) -> f64 {
        clamp(
            self.language_success * CODE_LANGUAGE_SUCCESS
                + self.generation * CODE_GENERATION
                + self.completion * CODE_COMPLETION
                + self.debugging * CODE_DEBUGGING
                + self.complexity * CODE_COMPLEXITY
                + self.review * CODE_REVIEW
                + self.test_generation * CODE_TEST_GENERATION
                + self.documentation * CODE_DOCUMENTATION
                + self.architecture * CODE_ARCHITECTURE
                + self.optimization * CODE_OPTIMIZATION,
        )
    }
}

impl ResponsivenessBreakdown {
    pub fn total(&self) -> f64 {
        clamp(
            self.latency * RESPONSE_LATENCY
                + self.throughput * RESPONSE_THROUGHPUT
                + self.consistency * RESPONSE_CONSISTENCY,
        )
    }
}

impl ReliabilityBreakdown {
    pub fn total(&self) -> f64 {
        clamp(
            self.availability * RELIABILITY_AVAILABILITY
                + self.consistency * RELIABILITY_CONSISTENCY
                + self.error_rate * RELIABILITY_ERROR_RATE
                + self.stability * RELIABILITY_STABILITY,
        )
    }
}

impl FeatureRichnessBreakdown {
    pub fn total(&self) -> f64 {
        clamp(
            self.core * FEATURE_CORE
                + self.advanced * FEATURE_ADVANCED
                + self.experimental * FEATURE_EXPERIMENTAL
                + self.generative * FEATURE_GENERATIVE,
        )
    }
}

impl ValuePropositionBreakdown {
    pub fn total(&self) -> f64 {
        clamp(self.quality * VALUE_QUALITY + self.cost_efficiency * VALUE_COST_EFFICIENCY)
    }
}

fn flag(value: bool) -> f64 {
    if value {
        100.0
    } else {
        0.0
    }
}

/// Percentage of true flags.
fn share(flags: &[bool]) -> f64 {
    if flags.is_empty() {
        return 0.0;
    }
    flags.iter().filter(|f| **f).count() as f64 / flags.len() as f64 * 100.0
}

fn clamp(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::{ComplexityMetrics, ResponseTimeStats};
    use pretty_assertions::assert_eq;

    const EPS: f64 = 1e-9;

    fn strong_result() -> VerificationResult {
        let mut result = VerificationResult::new("gpt-4o", "openai", "https://api.openai.com/v1");
        result.availability.exists = true;
        result.availability.responsive = true;
        result.availability.latency_ms = 400.0;
        result.response_time = ResponseTimeStats {
            average_latency_ms: 500.0,
            min_latency_ms: 400.0,
            max_latency_ms: 600.0,
            p95_latency_ms: 600.0,
            throughput_rps: 12.0,
            request_count: 10,
            failure_count: 0,
            last_error: None,
        };
        let caps = &mut result.code_capabilities;
        caps.overall_success_rate = 100.0;
        caps.code_generation = true;
        caps.code_completion = true;
        caps.code_debugging = true;
        caps.code_review = true;
        caps.code_explanation = true;
        caps.test_generation = true;
        caps.documentation = true;
        caps.architecture = true;
        caps.code_optimization = true;
        caps.complexity = ComplexityMetrics {
            max_handled_depth: 5,
            ..Default::default()
        };
        result.features.tool_use = true;
        result.features.streaming = true;
        result.generative.creativity_score = 50.0;
        result
    }

    #[test]
    fn test_weights_sum_to_one() {
        let groups: [&[f64]; 6] = [
            &[
                CODE_LANGUAGE_SUCCESS,
                CODE_GENERATION,
                CODE_COMPLETION,
                CODE_DEBUGGING,
                CODE_COMPLEXITY,
                CODE_REVIEW,
                CODE_TEST_GENERATION,
                CODE_DOCUMENTATION,
                CODE_ARCHITECTURE,
                CODE_OPTIMIZATION,
            ],
            &[RESPONSE_LATENCY, RESPONSE_THROUGHPUT, RESPONSE_CONSISTENCY],
            &[
                RELIABILITY_AVAILABILITY,
                RELIABILITY_CONSISTENCY,
                RELIABILITY_ERROR_RATE,
                RELIABILITY_STABILITY,
            ],
            &[FEATURE_CORE, FEATURE_ADVANCED, FEATURE_EXPERIMENTAL, FEATURE_GENERATIVE],
            &[VALUE_QUALITY, VALUE_COST_EFFICIENCY],
            &[
                OVERALL_CODE,
                OVERALL_RESPONSIVENESS,
                OVERALL_RELIABILITY,
                OVERALL_FEATURES,
                OVERALL_VALUE,
            ],
        ];

        for group in groups {
            assert!((group.iter().sum::<f64>() - 1.0).abs() < EPS);
        }
        assert!((QUALITY_CODE + QUALITY_RESPONSIVENESS + QUALITY_RELIABILITY - 1.0).abs() < EPS);
    }

    #[test]
    fn test_failed_result_scores_zero() {
        let mut result = strong_result();
        result.error = Some("model does not exist".to_string());

        let score = ScoringEngine::default().score(&result);
        assert_eq!(score, PerformanceScore::default());
    }

    #[test]
    fn test_scoring_is_deterministic() {
        let engine = ScoringEngine::default();
        let result = strong_result();

        let first = engine.score(&result);
        let second = engine.score(&result);
        assert_eq!(first, second);
        assert_eq!(first.overall.to_bits(), second.overall.to_bits());
    }

    #[test]
    fn test_strong_result_breakdown() {
        let score = ScoringEngine::default().score(&strong_result());

        assert!((score.code_capability - 100.0).abs() < EPS);
        let r = &score.breakdown.responsiveness;
        assert_eq!(r.latency, 100.0);
        assert_eq!(r.throughput, 100.0);
        assert!((r.consistency - 75.0).abs() < EPS);
        assert!((score.responsiveness - 95.0).abs() < EPS);
        assert!((score.reliability - 100.0).abs() < EPS);

        let f = &score.breakdown.feature_richness;
        assert!((f.core - 100.0).abs() < EPS);
        assert!((f.advanced - 12.5).abs() < EPS);
        assert_eq!(f.experimental, 0.0);
        assert!((f.generative - 50.0).abs() < EPS);
    }

    #[test]
    fn test_agent_protocols_count_as_experimental() {
        let mut result = strong_result();
        result.features.mcp = true;
        result.features.lsp = true;
        result.features.acp = true;
        result.features.function_calling = true;

        let score = ScoringEngine::default().score(&result);

        let f = &score.breakdown.feature_richness;
        assert!((f.experimental - 300.0 / 11.0).abs() < EPS);
        assert!((f.advanced - 12.5).abs() < EPS);
    }

    #[test]
    fn test_all_scores_within_bounds() {
        let engine = ScoringEngine::default();
        let mut result = strong_result();
        result.code_capabilities.overall_success_rate = 250.0;
        result.code_capabilities.complexity.code_quality = 400.0;
        result.response_time.min_latency_ms = 0.0;
        result.generative.creativity_score = -5.0;

        let score = engine.score(&result);
        for value in [
            score.overall,
            score.code_capability,
            score.responsiveness,
            score.reliability,
            score.feature_richness,
            score.value_proposition,
        ] {
            assert!((0.0..=100.0).contains(&value), "{} out of range", value);
        }
    }

    #[test]
    fn test_overload_and_errors_reduce_reliability() {
        let engine = ScoringEngine::default();
        let mut result = strong_result();
        result.availability.overloaded = true;
        result.availability.error = Some("responsiveness: timeout".to_string());
        result.response_time.failure_count = 6;

        let r = engine.score(&result).breakdown.reliability;
        assert_eq!(r.consistency, 30.0);
        assert_eq!(r.error_rate, 20.0);
        assert_eq!(r.stability, 60.0);
    }

    #[test]
    fn test_unresponsive_model_gets_no_latency_credit() {
        let mut result = strong_result();
        result.availability.responsive = false;
        result.availability.latency_ms = 0.5;

        let r = ScoringEngine::default().score(&result).breakdown.responsiveness;
        assert_eq!(r.latency, 0.0);
    }

    #[test]
    fn test_pricing_drives_cost_efficiency() {
        let engine = ScoringEngine::default();
        let result = strong_result();

        let cheap = engine
            .with_pricing(Some(Pricing {
                input_per_1m: 0.0,
                output_per_1m: 0.0,
            }))
            .score(&result);
        let pricey = engine
            .with_pricing(Some(Pricing {
                input_per_1m: 10.0,
                output_per_1m: 30.0,
            }))
            .score(&result);

        assert_eq!(cheap.breakdown.value_proposition.cost_efficiency, 100.0);
        assert!((pricey.breakdown.value_proposition.cost_efficiency - 100.0 / 3.0).abs() < EPS);
        assert!(cheap.value_proposition > pricey.value_proposition);
    }

    #[test]
    fn test_latency_cost_proxy_without_pricing() {
        let result = strong_result();
        let value = ScoringEngine::default().score(&result).breakdown.value_proposition;
        assert!((value.cost_efficiency - 100.0 / 1.25).abs() < EPS);
    }
}
