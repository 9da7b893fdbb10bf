//! @ai:module:intent Chart generation for verification results
//! @ai:module:layer infrastructure
//! @ai:module:public_api ChartGenerator
//! @ai:module:stateless true

use crate::results::{ResultSet, VerificationResult};
use crate::scoring::Summary;
use anyhow::Result;
use plotters::prelude::*;
use std::path::Path;

const BAR_HALF_WIDTH: f64 = 0.35;

/// @ai:intent Trait for chart generation
pub trait ChartGeneratorTrait: Send + Sync {
    /// @ai:intent Generate all charts, returning the written file names
    fn generate_all(
        &self,
        result_set: &ResultSet,
        summary: &Summary,
        output_dir: &Path,
    ) -> Result<Vec<String>>;
}

/// @ai:intent Generates bar charts from verification results
pub struct ChartGenerator;

impl ChartGenerator {
    /// @ai:intent Create a new chart generator
    /// @ai:effects pure
    pub fn new() -> Self {
        Self
    }

    /// @ai:intent Draw labelled bars on a 0..100 axis
    /// @ai:effects fs:write
    fn draw_bars(
        &self,
        caption: &str,
        y_desc: &str,
        bars: &[(String, f64)],
        color: RGBColor,
        output_path: &Path,
    ) -> Result<()> {
        let root = BitMapBackend::new(output_path, (900, 500)).into_drawing_area();
        root.fill(&WHITE)?;

        let upper = bars.len().max(1) as f64 - 0.5;
        let mut chart = ChartBuilder::on(&root)
            .caption(caption, ("sans-serif", 25))
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(-0.5f64..upper, 0f64..100f64)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(bars.len().max(1))
            .y_desc(y_desc)
            .x_label_formatter(&|x| {
                let idx = x.round();
                if (x - idx).abs() > 0.01 || idx < 0.0 {
                    return String::new();
                }
                bars.get(idx as usize)
                    .map(|(name, _)| name.clone())
                    .unwrap_or_default()
            })
            .draw()?;

        chart.draw_series(bars.iter().enumerate().map(|(i, (_, value))| {
            let x = i as f64;
            Rectangle::new(
                [(x - BAR_HALF_WIDTH, 0.0), (x + BAR_HALF_WIDTH, value.clamp(0.0, 100.0))],
                color.mix(0.7).filled(),
            )
        }))?;

        root.present()?;
        Ok(())
    }

    /// @ai:intent Overall score per available model, best first
    /// @ai:effects pure
    fn score_bars(summary: &Summary) -> Vec<(String, f64)> {
        summary
            .rankings
            .by_overall
            .iter()
            .map(|p| (p.model_name.clone(), p.score))
            .collect()
    }

    /// @ai:intent Average of each category score over available models
    /// @ai:effects pure
    fn category_bars(results: &[VerificationResult]) -> Vec<(String, f64)> {
        let available: Vec<_> = results.iter().filter(|r| !r.is_failed()).collect();
        let average = |select: fn(&VerificationResult) -> f64| {
            if available.is_empty() {
                0.0
            } else {
                available.iter().map(|r| select(r)).sum::<f64>() / available.len() as f64
            }
        };

        vec![
            ("Code".to_string(), average(|r| r.performance.code_capability)),
            ("Responsiveness".to_string(), average(|r| r.performance.responsiveness)),
            ("Reliability".to_string(), average(|r| r.performance.reliability)),
            ("Features".to_string(), average(|r| r.performance.feature_richness)),
            ("Value".to_string(), average(|r| r.performance.value_proposition)),
        ]
    }
}

impl Default for ChartGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ChartGeneratorTrait for ChartGenerator {
    /// @ai:intent Generate all charts
    /// @ai:effects fs:write
    fn generate_all(
        &self,
        result_set: &ResultSet,
        summary: &Summary,
        output_dir: &Path,
    ) -> Result<Vec<String>> {
        std::fs::create_dir_all(output_dir)?;

        let mut generated = Vec::new();

        self.draw_bars(
            "Overall Score by Model",
            "Score",
            &Self::score_bars(summary),
            BLUE,
            &output_dir.join("scores.png"),
        )?;
        generated.push("scores.png".to_string());

        self.draw_bars(
            "Average Score by Category",
            "Average Score",
            &Self::category_bars(&result_set.results),
            GREEN,
            &output_dir.join("categories.png"),
        )?;
        generated.push("categories.png".to_string());

        Ok(generated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn create_test_set() -> ResultSet {
        let mut a = VerificationResult::new("gpt-4o", "openai", "https://api.openai.com/v1");
        a.performance.overall = 80.0;
        a.performance.code_capability = 90.0;
        let mut b = VerificationResult::new("llama3", "local", "http://localhost:11434/v1");
        b.performance.overall = 60.0;
        b.performance.code_capability = 50.0;
        let mut failed = VerificationResult::new("ghost", "local", "http://localhost:11434/v1");
        failed.error = Some("model does not exist".to_string());
        failed.performance.code_capability = 100.0;

        ResultSet {
            started_at: Utc::now(),
            finished_at: Utc::now(),
            results: vec![a, b, failed],
        }
    }

    #[test]
    fn test_category_bars_average_available_models() {
        let set = create_test_set();
        let bars = ChartGenerator::category_bars(&set.results);

        assert_eq!(bars.len(), 5);
        assert_eq!(bars[0], ("Code".to_string(), 70.0));
    }

    #[test]
    fn test_score_bars_follow_ranking() {
        let set = create_test_set();
        let bars = ChartGenerator::score_bars(&set.summary());

        assert_eq!(
            bars,
            vec![("gpt-4o".to_string(), 80.0), ("llama3".to_string(), 60.0)]
        );
    }

    #[test]
    fn test_generate_all_charts() {
        let generator = ChartGenerator::new();
        let temp = TempDir::new().unwrap();
        let set = create_test_set();

        let files = generator
            .generate_all(&set, &set.summary(), temp.path())
            .unwrap();

        assert_eq!(files.len(), 2);
        assert!(temp.path().join("scores.png").exists());
        assert!(temp.path().join("categories.png").exists());
    }
}
