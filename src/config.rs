//! @ai:module:intent Typed configuration for the verifier with env expansion and validation
//! @ai:module:layer infrastructure
//! @ai:module:public_api VerifierConfig, GlobalConfig, RunConfig, OverloadConfig, ScoringConfig, ModelEndpoint, FeatureOverrides, Pricing
//! @ai:module:stateless true

use crate::error::{Error, Result};
use crate::results::FeatureDetection;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

static ENV_VAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap());

/// @ai:intent Main configuration for a verification run
/// @ai:effects pure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerifierConfig {
    #[serde(default)]
    pub global: GlobalConfig,
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub overload: OverloadConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub models: Vec<ModelEndpoint>,
}

/// @ai:intent Global endpoint used for discovery, plus client-wide settings
/// @ai:effects pure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_model")]
    pub default_model: String,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_rate_limit")]
    pub requests_per_minute: u32,
}

/// @ai:intent Batch execution settings
/// @ai:effects pure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Deadline for the whole batch.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Deadline for a single model's probe run.
    #[serde(default = "default_model_timeout_secs")]
    pub model_timeout_secs: u64,
    /// Deadline for one client call.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

/// @ai:intent Burst settings for the overload probe
/// @ai:effects pure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverloadConfig {
    #[serde(default = "default_burst_size")]
    pub burst_size: usize,
    #[serde(default = "default_failure_ratio")]
    pub failure_ratio: f64,
    #[serde(default = "default_latency_threshold_ms")]
    pub latency_threshold_ms: f64,
}

/// @ai:intent Normalization thresholds used by the scoring engine
/// @ai:effects pure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default = "default_latency_target_ms")]
    pub latency_target_ms: f64,
    #[serde(default = "default_throughput_target_rps")]
    pub throughput_target_rps: f64,
    #[serde(default = "default_reference_price")]
    pub reference_price_per_1m: f64,
    #[serde(default = "default_reference_latency_ms")]
    pub reference_latency_ms: f64,
}

/// @ai:intent One configured endpoint; `model` unset means every model it lists
/// @ai:effects pure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelEndpoint {
    pub name: String,
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "FeatureOverrides::is_empty")]
    pub features: FeatureOverrides,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pricing: Option<Pricing>,
}

/// @ai:intent Operator-asserted feature flags that replace detected values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_use: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parallel_tool_use: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub streaming: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json_mode: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structured_output: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multimodal: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embeddings: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http3: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brotli: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub toon: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_calling: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_processing: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mcp: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lsp: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acp: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_generation: Option<bool>,
}

/// @ai:intent Per-million-token prices in USD, used as the value cost proxy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pricing {
    pub input_per_1m: f64,
    pub output_per_1m: f64,
}

impl Pricing {
    /// @ai:intent Average of input and output price
    /// @ai:effects pure
    pub fn blended_per_1m(&self) -> f64 {
        (self.input_per_1m + self.output_per_1m) / 2.0
    }
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: String::new(),
            default_model: default_model(),
            max_retries: default_max_retries(),
            requests_per_minute: default_rate_limit(),
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            timeout_secs: default_timeout_secs(),
            model_timeout_secs: default_model_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for OverloadConfig {
    fn default() -> Self {
        Self {
            burst_size: default_burst_size(),
            failure_ratio: default_failure_ratio(),
            latency_threshold_ms: default_latency_threshold_ms(),
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            latency_target_ms: default_latency_target_ms(),
            throughput_target_rps: default_throughput_target_rps(),
            reference_price_per_1m: default_reference_price(),
            reference_latency_ms: default_reference_latency_ms(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_max_retries() -> u32 {
    3
}

fn default_rate_limit() -> u32 {
    60
}

fn default_concurrency() -> usize {
    10
}

fn default_timeout_secs() -> u64 {
    1800
}

fn default_model_timeout_secs() -> u64 {
    300
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_burst_size() -> usize {
    10
}

fn default_failure_ratio() -> f64 {
    0.5
}

fn default_latency_threshold_ms() -> f64 {
    10_000.0
}

fn default_latency_target_ms() -> f64 {
    1_000.0
}

fn default_throughput_target_rps() -> f64 {
    10.0
}

fn default_reference_price() -> f64 {
    10.0
}

fn default_reference_latency_ms() -> f64 {
    2_000.0
}

impl RunConfig {
    pub fn batch_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn model_timeout(&self) -> Duration {
        Duration::from_secs(self.model_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl VerifierConfig {
    /// @ai:intent Load, env-expand and validate configuration from a TOML file
    /// @ai:pre path exists and is readable
    /// @ai:effects fs:read, env
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Self = toml::from_str(&content).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;

        config.expand_env();
        config.validate()?;
        Ok(config)
    }

    /// @ai:intent Save configuration to a TOML file
    /// @ai:effects fs:write
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// @ai:intent Replace `${VAR}` placeholders with environment values
    /// @ai:effects env
    pub fn expand_env(&mut self) {
        let global = &mut self.global;
        global.base_url = expand_env_vars(&global.base_url);
        global.api_key = expand_env_vars(&global.api_key);

        for model in &mut self.models {
            model.name = expand_env_vars(&model.name);
            model.base_url = expand_env_vars(&model.base_url);
            model.api_key = expand_env_vars(&model.api_key);
            model.model = model.model.as_deref().map(expand_env_vars);
            for value in model.headers.values_mut() {
                *value = expand_env_vars(value);
            }
        }
    }

    /// @ai:intent Reject configurations the orchestrator cannot run
    /// @ai:effects pure
    pub fn validate(&self) -> Result<()> {
        if !(1..=100).contains(&self.run.concurrency) {
            return Err(Error::invalid("run.concurrency", "must be between 1 and 100"));
        }
        if !(1..=86_400).contains(&self.run.timeout_secs) {
            return Err(Error::invalid("run.timeout_secs", "must be between 1 and 86400"));
        }
        if self.run.model_timeout_secs == 0 {
            return Err(Error::invalid("run.model_timeout_secs", "must be positive"));
        }
        if !(1..=600).contains(&self.run.request_timeout_secs) {
            return Err(Error::invalid(
                "run.request_timeout_secs",
                "must be between 1 and 600",
            ));
        }
        if !(1..=100).contains(&self.overload.burst_size) {
            return Err(Error::invalid("overload.burst_size", "must be between 1 and 100"));
        }
        if !(0.0..=1.0).contains(&self.overload.failure_ratio) {
            return Err(Error::invalid("overload.failure_ratio", "must be within 0.0..=1.0"));
        }
        if self.global.requests_per_minute == 0 {
            return Err(Error::invalid("global.requests_per_minute", "must be positive"));
        }

        if self.models.is_empty() {
            validate_endpoint("global", &self.global.base_url, &self.global.api_key)?;
        }

        for (idx, model) in self.models.iter().enumerate() {
            if model.name.trim().is_empty() {
                return Err(Error::invalid(format!("models[{}].name", idx), "is required"));
            }
            validate_endpoint(&format!("models[{}]", idx), &model.base_url, &model.api_key)?;
        }

        Ok(())
    }
}

impl ModelEndpoint {
    /// @ai:intent Build the endpoint used for discovery from the global section
    /// @ai:effects pure
    pub fn from_global(global: &GlobalConfig) -> Self {
        Self {
            name: "global".to_string(),
            base_url: global.base_url.clone(),
            api_key: global.api_key.clone(),
            model: None,
            headers: BTreeMap::new(),
            features: FeatureOverrides::default(),
            pricing: None,
        }
    }
}

impl FeatureOverrides {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// @ai:intent Overwrite detected flags with operator-asserted values
    /// @ai:effects pure
    pub fn apply(&self, features: &mut FeatureDetection) {
        let pairs = [
            (self.tool_use, &mut features.tool_use),
            (self.parallel_tool_use, &mut features.parallel_tool_use),
            (self.streaming, &mut features.streaming),
            (self.json_mode, &mut features.json_mode),
            (self.structured_output, &mut features.structured_output),
            (self.reasoning, &mut features.reasoning),
            (self.multimodal, &mut features.multimodal),
            (self.embeddings, &mut features.embeddings),
            (self.http3, &mut features.http3),
            (self.brotli, &mut features.brotli),
            (self.toon, &mut features.toon),
            (self.batch_processing, &mut features.batch_processing),
            (self.mcp, &mut features.mcp),
            (self.lsp, &mut features.lsp),
            (self.acp, &mut features.acp),
            (self.video_generation, &mut features.video_generation),
            // Function calling follows tool use unless asserted separately.
            (
                self.function_calling.or(self.tool_use),
                &mut features.function_calling,
            ),
        ];

        for (value, flag) in pairs {
            if let Some(value) = value {
                *flag = value;
            }
        }
    }
}

fn validate_endpoint(field: &str, base_url: &str, api_key: &str) -> Result<()> {
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(Error::invalid(
            format!("{}.base_url", field),
            format!("must start with http:// or https://, got '{}'", base_url),
        ));
    }
    if api_key.trim().is_empty() && !is_local_endpoint(base_url) {
        return Err(Error::invalid(
            format!("{}.api_key", field),
            "is required for non-local endpoints",
        ));
    }
    Ok(())
}

/// @ai:intent Whether an endpoint is served from this machine
/// @ai:effects pure
pub fn is_local_endpoint(base_url: &str) -> bool {
    base_url.contains("localhost") || base_url.contains("127.0.0.1")
}

/// @ai:intent Expand `${VAR}` from the environment; unknown variables become empty
/// @ai:effects env
pub fn expand_env_vars(value: &str) -> String {
    ENV_VAR_PATTERN
        .replace_all(value, |caps: &regex::Captures| {
            std::env::var(&caps[1]).unwrap_or_default()
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn endpoint(name: &str, base_url: &str, api_key: &str) -> ModelEndpoint {
        ModelEndpoint {
            name: name.to_string(),
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
            model: Some("gpt-4o".to_string()),
            headers: BTreeMap::new(),
            features: FeatureOverrides::default(),
            pricing: None,
        }
    }

    #[test]
    fn test_load_applies_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("verifier.toml");
        std::fs::write(
            &path,
            r#"
[[models]]
name = "local"
base_url = "http://localhost:8080/v1"
model = "llama3"
"#,
        )
        .unwrap();

        let config = VerifierConfig::load(&path).unwrap();
        assert_eq!(config.run.concurrency, 10);
        assert_eq!(config.run.timeout_secs, 1800);
        assert_eq!(config.overload.burst_size, 10);
        assert_eq!(config.global.max_retries, 3);
        assert_eq!(config.models.len(), 1);
        assert_eq!(config.models[0].model.as_deref(), Some("llama3"));
    }

    #[test]
    fn test_expand_env_vars() {
        std::env::set_var("LLM_VERIFIER_TEST_KEY", "sk-test");
        assert_eq!(expand_env_vars("${LLM_VERIFIER_TEST_KEY}"), "sk-test");
        assert_eq!(expand_env_vars("Bearer ${LLM_VERIFIER_TEST_KEY}!"), "Bearer sk-test!");
        assert_eq!(expand_env_vars("${LLM_VERIFIER_SURELY_UNSET_VAR}"), "");
        assert_eq!(expand_env_vars("plain"), "plain");
    }

    #[test]
    fn test_expand_env_covers_models_and_headers() {
        std::env::set_var("LLM_VERIFIER_TEST_HEADER", "org-42");
        let mut model = endpoint("m", "https://api.example.com", "k");
        model
            .headers
            .insert("X-Org".to_string(), "${LLM_VERIFIER_TEST_HEADER}".to_string());
        let mut config = VerifierConfig {
            models: vec![model],
            ..Default::default()
        };

        config.expand_env();
        assert_eq!(config.models[0].headers["X-Org"], "org-42");
    }

    #[test]
    fn test_validate_rejects_bad_concurrency() {
        let mut config = VerifierConfig {
            models: vec![endpoint("m", "https://api.example.com", "k")],
            ..Default::default()
        };
        config.run.concurrency = 0;
        assert!(config.validate().is_err());
        config.run.concurrency = 101;
        assert!(config.validate().is_err());
        config.run.concurrency = 1;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_requires_api_key_for_remote_endpoints() {
        let config = VerifierConfig {
            models: vec![endpoint("m", "https://api.example.com", "")],
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = VerifierConfig {
            models: vec![endpoint("m", "http://127.0.0.1:11434/v1", "")],
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_name_and_bad_url() {
        let config = VerifierConfig {
            models: vec![endpoint(" ", "https://api.example.com", "k")],
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = VerifierConfig {
            models: vec![endpoint("m", "ftp://api.example.com", "k")],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_discovery_mode_validates_global_endpoint() {
        let config = VerifierConfig::default();
        assert!(config.validate().is_err());

        let mut config = VerifierConfig::default();
        config.global.api_key = "sk-test".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_save_and_reload() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("verifier.toml");
        let mut config = VerifierConfig {
            models: vec![endpoint("m", "https://api.example.com", "k")],
            ..Default::default()
        };
        config.models[0].pricing = Some(Pricing {
            input_per_1m: 2.5,
            output_per_1m: 10.0,
        });

        config.save(&path).unwrap();
        let loaded = VerifierConfig::load(&path).unwrap();
        assert_eq!(loaded.models, config.models);
    }

    #[test]
    fn test_overrides_replace_detected_flags() {
        let overrides = FeatureOverrides {
            tool_use: Some(true),
            streaming: Some(false),
            ..Default::default()
        };
        let mut features = FeatureDetection {
            streaming: true,
            ..Default::default()
        };

        overrides.apply(&mut features);
        assert!(features.tool_use);
        assert!(features.function_calling);
        assert!(!features.streaming);
        assert!(!features.json_mode);
    }

    #[test]
    fn test_protocol_overrides_from_toml() {
        let overrides: FeatureOverrides = toml::from_str(
            r#"
tool_use = true
function_calling = false
mcp = true
acp = false
video_generation = true
"#,
        )
        .unwrap();
        let mut features = FeatureDetection {
            acp: true,
            lsp: true,
            ..Default::default()
        };

        overrides.apply(&mut features);
        assert!(features.tool_use);
        assert!(!features.function_calling);
        assert!(features.mcp);
        assert!(!features.acp);
        assert!(features.lsp);
        assert!(features.video_generation);
        assert!(!features.batch_processing);
    }
}
