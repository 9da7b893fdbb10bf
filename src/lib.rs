//! @ai:module:intent LLM endpoint verification and scoring library
//! @ai:module:layer application
//! @ai:module:public_api config, error, client, results, verifier, scoring, runner, report

pub mod client;
pub mod config;
pub mod error;
pub mod report;
pub mod results;
pub mod runner;
pub mod scoring;
pub mod verifier;

pub use client::{ClientFactory, OpenAiClientFactory, ProbeClientTrait};
pub use config::{ModelEndpoint, VerifierConfig};
pub use error::{ClientError, Error, Result};
pub use report::ReportGenerator;
pub use results::{PerformanceScore, ResultSet, VerificationResult};
pub use runner::VerificationOrchestrator;
pub use scoring::{rank, ScoringEngine, Summary, TopPerformer};
pub use verifier::ModelVerifier;
