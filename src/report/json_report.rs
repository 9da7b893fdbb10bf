//! @ai:module:intent JSON report generation and loading
//! @ai:module:layer infrastructure
//! @ai:module:public_api JsonReporter, ResultsDocument
//! @ai:module:stateless true

use crate::results::ResultSet;
use crate::scoring::Summary;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// @ai:intent On-disk shape of results.json
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultsDocument {
    #[serde(flatten)]
    pub result_set: ResultSet,
    pub summary: Summary,
}

/// @ai:intent Trait for JSON report generation
pub trait JsonReporterTrait: Send + Sync {
    /// @ai:intent Write the result set and its summary as JSON
    fn generate(&self, result_set: &ResultSet, summary: &Summary, output_path: &Path) -> Result<()>;

    /// @ai:intent Read a result set back from a JSON report
    fn load(&self, path: &Path) -> Result<ResultSet>;
}

pub struct JsonReporter;

impl JsonReporter {
    /// @ai:intent Create a new JSON reporter
    /// @ai:effects pure
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonReporterTrait for JsonReporter {
    /// @ai:effects fs:write
    fn generate(&self, result_set: &ResultSet, summary: &Summary, output_path: &Path) -> Result<()> {
        let document = ResultsDocument {
            result_set: result_set.clone(),
            summary: summary.clone(),
        };
        let json = serde_json::to_string_pretty(&document)?;
        std::fs::write(output_path, json)
            .with_context(|| format!("Failed to write {}", output_path.display()))?;
        Ok(())
    }

    /// @ai:effects fs:read
    fn load(&self, path: &Path) -> Result<ResultSet> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let document: ResultsDocument = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(document.result_set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::VerificationResult;
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn sample_set() -> ResultSet {
        let mut ok = VerificationResult::new("gpt-4o", "openai", "https://api.openai.com/v1");
        ok.performance.overall = 82.5;
        let mut missing = VerificationResult::new("ghost", "openai", "https://api.openai.com/v1");
        missing.error = Some("model does not exist".to_string());

        ResultSet {
            started_at: Utc::now(),
            finished_at: Utc::now(),
            results: vec![ok, missing],
        }
    }

    #[test]
    fn test_generate_json_report() {
        let reporter = JsonReporter::new();
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("results.json");
        let set = sample_set();

        reporter.generate(&set, &set.summary(), &output).unwrap();

        let content = std::fs::read_to_string(&output).unwrap();
        assert!(content.contains("\"summary\""));
        assert!(content.contains("\"started_at\""));
        assert!(content.contains("model does not exist"));
    }

    #[test]
    fn test_load_reads_back_written_report() {
        let reporter = JsonReporter::new();
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("results.json");
        let set = sample_set();

        reporter.generate(&set, &set.summary(), &output).unwrap();
        let loaded = reporter.load(&output).unwrap();

        assert_eq!(loaded, set);
    }

    #[test]
    fn test_load_missing_file_names_the_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("absent.json");

        let err = JsonReporter::new().load(&path).unwrap_err();
        assert!(err.to_string().contains("absent.json"));
    }
}
