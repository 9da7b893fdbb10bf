//! @ai:module:intent Markdown report generation
//! @ai:module:layer infrastructure
//! @ai:module:public_api MarkdownReporter
//! @ai:module:stateless true

use crate::results::{ResultSet, VerificationResult};
use crate::scoring::{Summary, TopPerformer};
use anyhow::Result;
use std::fmt::Write as FmtWrite;
use std::path::Path;

/// @ai:intent Trait for Markdown report generation
pub trait MarkdownReporterTrait: Send + Sync {
    /// @ai:intent Generate Markdown report from results
    fn generate(&self, result_set: &ResultSet, summary: &Summary, output_path: &Path) -> Result<()>;
}

/// @ai:intent Generates Markdown reports from verification results
pub struct MarkdownReporter;

impl MarkdownReporter {
    /// @ai:intent Create a new Markdown reporter
    /// @ai:effects pure
    pub fn new() -> Self {
        Self
    }

    fn yes_no(value: bool) -> &'static str {
        if value {
            "yes"
        } else {
            "no"
        }
    }

    /// @ai:intent Render the full report
    /// @ai:effects pure
    pub fn render(result_set: &ResultSet, summary: &Summary) -> String {
        let mut content = String::new();
        content.push_str(&Self::generate_summary(summary));
        content.push_str(&Self::generate_rankings(summary));
        content.push_str(&Self::generate_details(&result_set.results));
        content.push_str(&Self::generate_failures(&result_set.results));
        content
    }

    /// @ai:intent Generate overall summary section
    /// @ai:effects pure
    fn generate_summary(summary: &Summary) -> String {
        let mut output = String::new();

        writeln!(output, "# LLM Verification Results").unwrap();
        writeln!(output).unwrap();
        if let Some(started_at) = summary.started_at {
            writeln!(output, "**Started:** {}", started_at.to_rfc3339()).unwrap();
        }
        if let Some(duration) = summary.duration_secs {
            writeln!(output, "**Duration:** {:.1}s", duration).unwrap();
        }
        writeln!(output).unwrap();

        writeln!(output, "## Summary").unwrap();
        writeln!(output).unwrap();
        writeln!(output, "| Metric | Value |").unwrap();
        writeln!(output, "|--------|-------|").unwrap();
        writeln!(output, "| Total Models | {} |", summary.total_models).unwrap();
        writeln!(output, "| Available Models | {} |", summary.available_models).unwrap();
        writeln!(output, "| Failed Models | {} |", summary.failed_models).unwrap();
        writeln!(output, "| Average Score | {:.1} |", summary.average_score).unwrap();
        writeln!(output, "| Brotli Support | {:.1}% |", summary.brotli_support_rate).unwrap();
        writeln!(output, "| HTTP/3 Support | {:.1}% |", summary.http3_support_rate).unwrap();
        writeln!(output).unwrap();

        output
    }

    /// @ai:intent One ranking table per score category
    /// @ai:effects pure
    fn generate_rankings(summary: &Summary) -> String {
        let mut output = String::new();

        writeln!(output, "## Rankings").unwrap();
        writeln!(output).unwrap();

        for (title, ranking) in summary.rankings.categories() {
            writeln!(output, "### {}", title).unwrap();
            writeln!(output).unwrap();
            output.push_str(&Self::ranking_table(ranking));
            writeln!(output).unwrap();
        }

        output
    }

    fn ranking_table(ranking: &[TopPerformer]) -> String {
        let mut output = String::new();
        if ranking.is_empty() {
            writeln!(output, "_No available models._").unwrap();
            return output;
        }

        writeln!(output, "| Rank | Model | Endpoint | Score |").unwrap();
        writeln!(output, "|------|-------|----------|-------|").unwrap();
        for entry in ranking {
            writeln!(
                output,
                "| {} | {} | {} | {:.1} |",
                entry.rank, entry.model_name, entry.endpoint_name, entry.score
            )
            .unwrap();
        }
        output
    }

    /// @ai:intent Per-model detail section for available models
    /// @ai:effects pure
    fn generate_details(results: &[VerificationResult]) -> String {
        let mut output = String::new();

        writeln!(output, "## Model Details").unwrap();
        writeln!(output).unwrap();

        for result in results.iter().filter(|r| !r.is_failed()) {
            let score = &result.performance;
            let features = &result.features;

            writeln!(
                output,
                "### {} ({})",
                result.model_info.id, result.model_info.endpoint_name
            )
            .unwrap();
            writeln!(output).unwrap();
            writeln!(output, "| Score | Value |").unwrap();
            writeln!(output, "|-------|-------|").unwrap();
            writeln!(output, "| Overall | {:.1} |", score.overall).unwrap();
            writeln!(output, "| Code Capability | {:.1} |", score.code_capability).unwrap();
            writeln!(output, "| Responsiveness | {:.1} |", score.responsiveness).unwrap();
            writeln!(output, "| Reliability | {:.1} |", score.reliability).unwrap();
            writeln!(output, "| Feature Richness | {:.1} |", score.feature_richness).unwrap();
            writeln!(output, "| Value Proposition | {:.1} |", score.value_proposition).unwrap();
            writeln!(output).unwrap();

            writeln!(
                output,
                "- **Latency:** {:.0}ms (avg {:.0}ms, p95 {:.0}ms, {:.2} req/s)",
                result.availability.latency_ms,
                result.response_time.average_latency_ms,
                result.response_time.p95_latency_ms,
                result.response_time.throughput_rps
            )
            .unwrap();
            writeln!(
                output,
                "- **Overloaded:** {}",
                Self::yes_no(result.availability.overloaded)
            )
            .unwrap();
            writeln!(
                output,
                "- **Tools:** {} (parallel calls: {}), **Streaming:** {}, **JSON mode:** {}",
                Self::yes_no(features.tool_use),
                features.max_parallel_calls,
                Self::yes_no(features.streaming),
                Self::yes_no(features.json_mode)
            )
            .unwrap();
            writeln!(
                output,
                "- **Agent protocols:** MCP {}, LSP {}, ACP {}",
                Self::yes_no(features.mcp),
                Self::yes_no(features.lsp),
                Self::yes_no(features.acp)
            )
            .unwrap();
            writeln!(output, "- **Modalities:** {}", features.modalities.join(", ")).unwrap();
            writeln!(
                output,
                "- **Code success rate:** {:.1}%",
                result.code_capabilities.overall_success_rate
            )
            .unwrap();

            if let Some(error) = &result.availability.error {
                writeln!(output, "- **Availability warning:** {}", error).unwrap();
            }
            writeln!(output).unwrap();
        }

        output
    }

    /// @ai:intent Failed models and their errors
    /// @ai:effects pure
    fn generate_failures(results: &[VerificationResult]) -> String {
        let mut output = String::new();
        let failed: Vec<_> = results.iter().filter(|r| r.is_failed()).collect();
        if failed.is_empty() {
            return output;
        }

        writeln!(output, "## Failed Models").unwrap();
        writeln!(output).unwrap();
        writeln!(output, "| Model | Endpoint | Error |").unwrap();
        writeln!(output, "|-------|----------|-------|").unwrap();
        for result in failed {
            writeln!(
                output,
                "| {} | {} | {} |",
                result.model_info.id,
                result.model_info.endpoint_name,
                result.error.as_deref().unwrap_or_default().replace('|', "\\|")
            )
            .unwrap();
        }
        writeln!(output).unwrap();

        output
    }
}

impl Default for MarkdownReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownReporterTrait for MarkdownReporter {
    /// @ai:intent Generate Markdown report to file
    /// @ai:effects fs:write
    fn generate(&self, result_set: &ResultSet, summary: &Summary, output_path: &Path) -> Result<()> {
        std::fs::write(output_path, Self::render(result_set, summary))?;
        Ok(())
    }
}
