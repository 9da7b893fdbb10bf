//! @ai:module:intent Run-level summary statistics and per-category rankings
//! @ai:module:layer domain
//! @ai:module:public_api Summary, CategoryRankings
//! @ai:module:stateless true

use crate::results::{ResultSet, VerificationResult};
use crate::scoring::ranking::{rank, TopPerformer};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// @ai:intent Rankings for the overall score and every sub-score
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryRankings {
    pub by_overall: Vec<TopPerformer>,
    pub by_code_capability: Vec<TopPerformer>,
    pub by_responsiveness: Vec<TopPerformer>,
    pub by_reliability: Vec<TopPerformer>,
    pub by_feature_richness: Vec<TopPerformer>,
    pub by_value: Vec<TopPerformer>,
}

/// @ai:intent Aggregate view over a verification run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_models: usize,
    pub available_models: usize,
    pub failed_models: usize,
    pub average_score: f64,
    /// Percentage of available models.
    pub brotli_support_rate: f64,
    pub http3_support_rate: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<f64>,
    pub rankings: CategoryRankings,
}

impl Summary {
    /// @ai:intent Summarize scored results; failed results count only toward totals
    /// @ai:effects pure
    pub fn from_results(results: &[VerificationResult]) -> Self {
        let available: Vec<&VerificationResult> =
            results.iter().filter(|r| !r.is_failed()).collect();

        let average_score = average(available.iter().map(|r| r.performance.overall));
        let brotli_support_rate = percentage(&available, |r| r.features.brotli);
        let http3_support_rate = percentage(&available, |r| r.features.http3);

        Self {
            total_models: results.len(),
            available_models: available.len(),
            failed_models: results.len() - available.len(),
            average_score,
            brotli_support_rate,
            http3_support_rate,
            started_at: None,
            finished_at: None,
            duration_secs: None,
            rankings: CategoryRankings::from_results(results),
        }
    }
}

impl CategoryRankings {
    /// @ai:intent Build all six rankings
    /// @ai:effects pure
    pub fn from_results(results: &[VerificationResult]) -> Self {
        Self {
            by_overall: rank(results, |r| r.performance.overall),
            by_code_capability: rank(results, |r| r.performance.code_capability),
            by_responsiveness: rank(results, |r| r.performance.responsiveness),
            by_reliability: rank(results, |r| r.performance.reliability),
            by_feature_richness: rank(results, |r| r.performance.feature_richness),
            by_value: rank(results, |r| r.performance.value_proposition),
        }
    }

    /// @ai:intent Iterate (title, ranking) pairs in display order
    /// @ai:effects pure
    pub fn categories(&self) -> [(&'static str, &[TopPerformer]); 6] {
        [
            ("Overall", self.by_overall.as_slice()),
            ("Code Capability", self.by_code_capability.as_slice()),
            ("Responsiveness", self.by_responsiveness.as_slice()),
            ("Reliability", self.by_reliability.as_slice()),
            ("Feature Richness", self.by_feature_richness.as_slice()),
            ("Value Proposition", self.by_value.as_slice()),
        ]
    }
}

impl ResultSet {
    /// @ai:intent Summarize the set, including run timing
    /// @ai:effects pure
    pub fn summary(&self) -> Summary {
        let mut summary = Summary::from_results(&self.results);
        let elapsed = self.finished_at - self.started_at;
        summary.started_at = Some(self.started_at);
        summary.finished_at = Some(self.finished_at);
        summary.duration_secs = Some(elapsed.num_milliseconds().max(0) as f64 / 1000.0);
        summary
    }
}

fn average(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

fn percentage<F>(results: &[&VerificationResult], predicate: F) -> f64
where
    F: Fn(&VerificationResult) -> bool,
{
    if results.is_empty() {
        return 0.0;
    }
    let hits = results.iter().filter(|&&r| predicate(r)).count();
    hits as f64 / results.len() as f64 * 100.0
}
