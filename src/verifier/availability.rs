//! @ai:module:intent Existence, responsiveness and overload probes
//! @ai:module:layer application
//! @ai:module:public_api Existence, Responsiveness, check_existence, check_responsiveness, check_overload, summarize_burst
//! @ai:module:stateless true

use crate::client::{ProbeClientTrait, RemoteModel};
use crate::config::OverloadConfig;
use crate::results::ResponseTimeStats;
use crate::verifier::probe::{response_latency_ms, ProbeContext, MIN_LATENCY_MS};
use futures::future::join_all;
use tokio::time::Instant;

const PING_PROMPT: &str = "Hello, please respond with just the word 'pong'.";

/// @ai:intent Outcome of looking the model up in the endpoint's listing
#[derive(Debug, Clone, PartialEq)]
pub enum Existence {
    Found(RemoteModel),
    Missing,
    /// The listing call itself failed; existence is unknown.
    Unknown(String),
}

/// @ai:intent Check the model appears in the endpoint's model listing
/// @ai:effects network
pub async fn check_existence<C: ProbeClientTrait>(ctx: &ProbeContext<'_, C>) -> Existence {
    match ctx.list_models().await {
        Ok(models) => models
            .into_iter()
            .find(|m| m.id == ctx.model_id)
            .map(Existence::Found)
            .unwrap_or(Existence::Missing),
        Err(err) => Existence::Unknown(format!("failed to list models: {}", err)),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Responsiveness {
    pub responsive: bool,
    pub latency_ms: f64,
    pub reported_name: Option<String>,
    pub error: Option<String>,
}

/// @ai:intent Time one minimal completion; latency is kept even when it fails
/// @ai:effects network, time
pub async fn check_responsiveness<C: ProbeClientTrait>(ctx: &ProbeContext<'_, C>) -> Responsiveness {
    let request = ctx.request(PING_PROMPT).with_max_tokens(10);
    let start = Instant::now();
    let outcome = ctx.chat(&request).await;
    let latency_ms = response_latency_ms(&outcome, start);

    match outcome {
        Ok(response) => Responsiveness {
            responsive: true,
            latency_ms,
            reported_name: Some(response.model).filter(|name| !name.is_empty()),
            error: None,
        },
        Err(err) => Responsiveness {
            responsive: false,
            latency_ms,
            reported_name: None,
            error: Some(err.to_string()),
        },
    }
}

/// @ai:intent Fire a concurrent burst and decide whether the model is overloaded
/// @ai:effects network, time
pub async fn check_overload<C: ProbeClientTrait>(
    ctx: &ProbeContext<'_, C>,
    config: &OverloadConfig,
) -> (bool, ResponseTimeStats) {
    let burst_size = config.burst_size.max(1);
    let burst_start = Instant::now();

    let calls = (1..=burst_size).map(|n| async move {
        let request = ctx
            .request(format!("Test request {}, respond with just the number {}", n, n))
            .with_max_tokens(10);
        let start = Instant::now();
        let outcome = ctx.chat(&request).await;
        (
            response_latency_ms(&outcome, start),
            outcome.err().map(|e| e.to_string()),
        )
    });
    let samples = join_all(calls).await;

    let wall_secs = burst_start.elapsed().as_secs_f64();
    summarize_burst(&samples, wall_secs, config)
}

/// @ai:intent Reduce burst samples `(latency_ms, error)` to statistics and an overload verdict
/// @ai:effects pure
pub fn summarize_burst(
    samples: &[(f64, Option<String>)],
    wall_secs: f64,
    config: &OverloadConfig,
) -> (bool, ResponseTimeStats) {
    if samples.is_empty() {
        return (false, ResponseTimeStats::default());
    }

    let successes: Vec<f64> = samples
        .iter()
        .filter(|(_, err)| err.is_none())
        .map(|(latency, _)| *latency)
        .collect();
    let failure_count = samples.len() - successes.len();

    // Failed calls still took time; use them when nothing succeeded.
    let mut basis: Vec<f64> = if successes.is_empty() {
        samples.iter().map(|(latency, _)| *latency).collect()
    } else {
        successes.clone()
    };
    basis.sort_by(f64::total_cmp);

    let average = (basis.iter().sum::<f64>() / basis.len() as f64).max(MIN_LATENCY_MS);
    let p95_index = ((basis.len() as f64 * 0.95).ceil() as usize).saturating_sub(1);

    let throughput_rps = if successes.is_empty() || wall_secs <= 0.0 {
        0.0
    } else {
        successes.len() as f64 / wall_secs
    };

    let stats = ResponseTimeStats {
        average_latency_ms: average,
        min_latency_ms: basis[0],
        max_latency_ms: basis[basis.len() - 1],
        p95_latency_ms: basis[p95_index.min(basis.len() - 1)],
        throughput_rps,
        request_count: samples.len(),
        failure_count,
        last_error: samples.iter().rev().find_map(|(_, err)| err.clone()),
    };

    let overloaded = stats.failure_ratio() > config.failure_ratio
        || stats.average_latency_ms > config.latency_threshold_ms;

    (overloaded, stats)
}
