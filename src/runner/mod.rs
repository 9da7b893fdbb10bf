//! @ai:module:intent Batch orchestration of model verifications
//! @ai:module:layer application
//! @ai:module:public_api VerificationOrchestrator, VerificationTask

pub mod orchestrator;

pub use orchestrator::{VerificationOrchestrator, VerificationTask};
