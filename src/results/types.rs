//! @ai:module:intent Result records produced by the model verifier and scoring engine
//! @ai:module:layer domain
//! @ai:module:public_api VerificationResult, ModelInfo, Availability, ResponseTimeStats, FeatureDetection, CodeCapabilities, GenerativeCapabilities, PerformanceScore, ResultSet
//! @ai:module:stateless true

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// @ai:intent Everything observed about one (endpoint, model) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub model_info: ModelInfo,
    pub availability: Availability,
    pub response_time: ResponseTimeStats,
    pub features: FeatureDetection,
    pub code_capabilities: CodeCapabilities,
    pub generative: GenerativeCapabilities,
    pub performance: PerformanceScore,
    /// Set when the whole record is failed; scoring then yields zero.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// @ai:intent Identity of the verified model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    pub endpoint_name: String,
    pub base_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owned_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<i64>,
    /// Model name echoed back by the endpoint in a chat response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reported_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Availability {
    pub exists: bool,
    pub responsive: bool,
    pub overloaded: bool,
    pub latency_ms: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_checked: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// @ai:intent Latency and throughput measured by the overload burst
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseTimeStats {
    pub average_latency_ms: f64,
    pub min_latency_ms: f64,
    pub max_latency_ms: f64,
    pub p95_latency_ms: f64,
    pub throughput_rps: f64,
    pub request_count: usize,
    pub failure_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl ResponseTimeStats {
    /// @ai:intent Fraction of burst requests that failed, 0 when none were sent
    /// @ai:effects pure
    pub fn failure_ratio(&self) -> f64 {
        if self.request_count == 0 {
            0.0
        } else {
            self.failure_count as f64 / self.request_count as f64
        }
    }
}

/// @ai:intent Detected feature flags; undetectable features stay false
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureDetection {
    pub tool_use: bool,
    pub function_calling: bool,
    pub parallel_tool_use: bool,
    pub max_parallel_calls: usize,
    pub streaming: bool,
    pub json_mode: bool,
    pub structured_output: bool,
    pub reasoning: bool,
    pub multimodal: bool,
    pub embeddings: bool,
    pub reranking: bool,
    pub image_generation: bool,
    pub audio_generation: bool,
    pub video_generation: bool,
    pub text_generation: bool,
    pub batch_processing: bool,
    /// Keeps and summarizes conversation context the way MCP clients rely on.
    pub mcp: bool,
    /// Answers language-server style diagnostics, completion and symbol queries.
    pub lsp: bool,
    /// Handles agent-protocol work: JSON-RPC, tool calls, project context, diagnostics.
    pub acp: bool,
    pub http3: bool,
    pub brotli: bool,
    pub toon: bool,
    pub modalities: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

/// @ai:intent Languages exercised by the code capability probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeLanguage {
    Python,
    JavaScript,
    Go,
    Java,
    Cpp,
    TypeScript,
}

impl CodeLanguage {
    pub const ALL: [CodeLanguage; 6] = [
        CodeLanguage::Python,
        CodeLanguage::JavaScript,
        CodeLanguage::Go,
        CodeLanguage::Java,
        CodeLanguage::Cpp,
        CodeLanguage::TypeScript,
    ];

    /// @ai:intent Get the display name used in prompts and reports
    /// @ai:effects pure
    pub fn as_str(&self) -> &'static str {
        match self {
            CodeLanguage::Python => "Python",
            CodeLanguage::JavaScript => "JavaScript",
            CodeLanguage::Go => "Go",
            CodeLanguage::Java => "Java",
            CodeLanguage::Cpp => "C++",
            CodeLanguage::TypeScript => "TypeScript",
        }
    }
}

impl std::fmt::Display for CodeLanguage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// @ai:intent Success of the prompts sent for one language
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageResult {
    pub language: CodeLanguage,
    pub attempted: usize,
    pub passed: usize,
    pub success_rate: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComplexityMetrics {
    /// 1 (plain functions) to 5 (design patterns); 0 when not measured.
    pub max_handled_depth: u8,
    pub response_chars: usize,
    pub code_quality: f64,
    pub logic_correctness: f64,
    pub runtime_efficiency: f64,
}

/// @ai:intent Per-language rates, task capabilities and complexity metrics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodeCapabilities {
    pub languages: Vec<LanguageResult>,
    pub overall_success_rate: f64,
    pub code_generation: bool,
    pub code_completion: bool,
    pub code_debugging: bool,
    pub code_optimization: bool,
    pub code_review: bool,
    pub code_explanation: bool,
    pub test_generation: bool,
    pub documentation: bool,
    pub refactoring: bool,
    pub error_resolution: bool,
    pub architecture: bool,
    pub security_assessment: bool,
    pub pattern_recognition: bool,
    pub complexity: ComplexityMetrics,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerativeCapabilities {
    /// True when the model was flagged non-generative and no probe ran.
    pub skipped: bool,
    pub creative_writing: bool,
    pub storytelling: bool,
    pub content_generation: bool,
    pub artistic_creativity: bool,
    pub problem_solving: bool,
    pub multimodal_generative: bool,
    pub creativity_score: f64,
    pub originality_score: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

/// @ai:intent Composite scores, each in [0, 100]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceScore {
    pub overall: f64,
    pub code_capability: f64,
    pub responsiveness: f64,
    pub reliability: f64,
    pub feature_richness: f64,
    pub value_proposition: f64,
    pub breakdown: ScoreBreakdown,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub code_capability: CodeCapabilityBreakdown,
    pub responsiveness: ResponsivenessBreakdown,
    pub reliability: ReliabilityBreakdown,
    pub feature_richness: FeatureRichnessBreakdown,
    pub value_proposition: ValuePropositionBreakdown,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodeCapabilityBreakdown {
    pub language_success: f64,
    pub generation: f64,
    pub completion: f64,
    pub debugging: f64,
    pub complexity: f64,
    pub review: f64,
    pub test_generation: f64,
    pub documentation: f64,
    pub architecture: f64,
    pub optimization: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponsivenessBreakdown {
    pub latency: f64,
    pub throughput: f64,
    pub consistency: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReliabilityBreakdown {
    pub availability: f64,
    pub consistency: f64,
    pub error_rate: f64,
    pub stability: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureRichnessBreakdown {
    pub core: f64,
    pub advanced: f64,
    pub experimental: f64,
    pub generative: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValuePropositionBreakdown {
    pub quality: f64,
    pub cost_efficiency: f64,
}

impl VerificationResult {
    /// @ai:intent Create the empty record a verifier fills in place
    /// @ai:effects time
    pub fn new(model_id: &str, endpoint_name: &str, base_url: &str) -> Self {
        Self {
            model_info: ModelInfo {
                id: model_id.to_string(),
                endpoint_name: endpoint_name.to_string(),
                base_url: base_url.to_string(),
                ..Default::default()
            },
            availability: Availability::default(),
            response_time: ResponseTimeStats::default(),
            features: FeatureDetection::default(),
            code_capabilities: CodeCapabilities::default(),
            generative: GenerativeCapabilities::default(),
            performance: PerformanceScore::default(),
            error: None,
            timestamp: Utc::now(),
        }
    }

    /// @ai:intent Whether the record carries a top-level error
    /// @ai:effects pure
    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

/// @ai:intent Ordered collection of results, one slot per verification task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub results: Vec<VerificationResult>,
}

impl ResultSet {
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, VerificationResult> {
        self.results.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_result_carries_identity() {
        let result = VerificationResult::new("gpt-4o", "openai", "https://api.openai.com/v1");
        assert_eq!(result.model_info.id, "gpt-4o");
        assert_eq!(result.model_info.endpoint_name, "openai");
        assert!(!result.is_failed());
        assert_eq!(result.performance.overall, 0.0);
    }

    #[test]
    fn test_failure_ratio_handles_empty_burst() {
        let stats = ResponseTimeStats::default();
        assert_eq!(stats.failure_ratio(), 0.0);

        let stats = ResponseTimeStats {
            request_count: 10,
            failure_count: 3,
            ..Default::default()
        };
        assert!((stats.failure_ratio() - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_result_serializes_without_empty_error() {
        let result = VerificationResult::new("m", "e", "http://localhost");
        let json = serde_json::to_string(&result).unwrap();
        assert!(!json.contains("\"error\""));

        let back: VerificationResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
    }
}
