//! @ai:module:intent Report generation for verification results
//! @ai:module:layer infrastructure
//! @ai:module:public_api ReportGenerator, JsonReporter, MarkdownReporter, ChartGenerator

pub mod charts;
pub mod json_report;
pub mod markdown_report;

pub use charts::{ChartGenerator, ChartGeneratorTrait};
pub use json_report::{JsonReporter, JsonReporterTrait, ResultsDocument};
pub use markdown_report::{MarkdownReporter, MarkdownReporterTrait};

use crate::results::ResultSet;
use anyhow::Result;
use std::path::Path;

/// @ai:intent Combined report generator
pub struct ReportGenerator {
    json: JsonReporter,
    markdown: MarkdownReporter,
    charts: ChartGenerator,
}

impl ReportGenerator {
    /// @ai:intent Create a new report generator
    /// @ai:effects pure
    pub fn new() -> Self {
        Self {
            json: JsonReporter::new(),
            markdown: MarkdownReporter::new(),
            charts: ChartGenerator::new(),
        }
    }

    /// @ai:intent Generate every report for a result set
    /// @ai:effects fs:write
    pub fn generate_all(&self, result_set: &ResultSet, output_dir: &Path) -> Result<()> {
        std::fs::create_dir_all(output_dir)?;
        let summary = result_set.summary();

        self.json
            .generate(result_set, &summary, &output_dir.join("results.json"))?;
        self.markdown
            .generate(result_set, &summary, &output_dir.join("results.md"))?;
        self.charts.generate_all(result_set, &summary, output_dir)?;

        tracing::info!("Reports generated in {}", output_dir.display());
        Ok(())
    }

    /// @ai:intent Load a result set from a previously written results.json
    /// @ai:effects fs:read
    pub fn load_results(&self, path: &Path) -> Result<ResultSet> {
        self.json.load(path)
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::VerificationResult;
    use chrono::Utc;
    use tempfile::TempDir;

    #[test]
    fn test_generate_all_writes_every_report() {
        let mut result = VerificationResult::new("gpt-4o", "openai", "https://api.openai.com/v1");
        result.performance.overall = 75.0;
        let set = ResultSet {
            started_at: Utc::now(),
            finished_at: Utc::now(),
            results: vec![result],
        };
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("run");

        let generator = ReportGenerator::new();
        generator.generate_all(&set, &dir).unwrap();

        for file in ["results.json", "results.md", "scores.png", "categories.png"] {
            assert!(dir.join(file).exists(), "{} missing", file);
        }
        let loaded = generator.load_results(&dir.join("results.json")).unwrap();
        assert_eq!(loaded.len(), 1);
    }
}
