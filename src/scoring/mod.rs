//! @ai:module:intent Scoring, ranking and summary over verification results
//! @ai:module:layer domain
//! @ai:module:public_api ScoringEngine, TopPerformer, rank, Summary, CategoryRankings

pub mod engine;
pub mod ranking;
pub mod summary;

pub use engine::ScoringEngine;
pub use ranking::{rank, TopPerformer};
pub use summary::{CategoryRankings, Summary};
