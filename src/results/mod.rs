//! @ai:module:intent Verification result records
//! @ai:module:layer domain
//! @ai:module:public_api VerificationResult, ResultSet, PerformanceScore, FeatureDetection, CodeLanguage

pub mod types;

pub use types::{
    Availability, CodeCapabilities, CodeCapabilityBreakdown, CodeLanguage, ComplexityMetrics,
    FeatureDetection, FeatureRichnessBreakdown, GenerativeCapabilities, LanguageResult, ModelInfo,
    PerformanceScore, ReliabilityBreakdown, ResponseTimeStats, ResponsivenessBreakdown,
    ResultSet, ScoreBreakdown, ValuePropositionBreakdown, VerificationResult,
};
