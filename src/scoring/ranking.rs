//! @ai:module:intent Stable descending ranking of scored results
//! @ai:module:layer domain
//! @ai:module:public_api TopPerformer, rank
//! @ai:module:stateless true

use crate::results::VerificationResult;
use serde::{Deserialize, Serialize};

/// @ai:intent One entry of a ranking, 1-based
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopPerformer {
    pub model_name: String,
    pub endpoint_name: String,
    pub score: f64,
    pub rank: usize,
}

/// @ai:intent Rank non-failed results by the selected score, highest first
/// @ai:pre ties keep input order
/// @ai:effects pure
pub fn rank<F>(results: &[VerificationResult], selector: F) -> Vec<TopPerformer>
where
    F: Fn(&VerificationResult) -> f64,
{
    let mut scored: Vec<(&VerificationResult, f64)> = results
        .iter()
        .filter(|r| !r.is_failed())
        .map(|r| (r, selector(r)))
        .collect();

    scored.sort_by(|a, b| b.1.total_cmp(&a.1));

    scored
        .into_iter()
        .enumerate()
        .map(|(i, (result, score))| TopPerformer {
            model_name: result.model_info.id.clone(),
            endpoint_name: result.model_info.endpoint_name.clone(),
            score,
            rank: i + 1,
        })
        .collect()
}
