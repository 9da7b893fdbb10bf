//! @ai:module:intent CLI for the LLM endpoint verifier
//! @ai:module:layer presentation

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use llm_verifier::{
    client::{MockClientFactory, MockProbeClient},
    config::{ModelEndpoint, VerifierConfig},
    report::ReportGenerator,
    runner::VerificationOrchestrator,
    ClientFactory, OpenAiClientFactory, ResultSet, Summary,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "llm-verifier")]
#[command(about = "Verify and score OpenAI-compatible LLM endpoints")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify every configured model and write reports
    Run {
        /// Path to configuration file
        #[arg(short, long)]
        config: PathBuf,

        /// Output directory for results
        #[arg(short, long, default_value = "results")]
        output: PathBuf,

        /// Maximum number of models verified at once
        #[arg(long)]
        concurrency: Option<usize>,

        /// Deadline for the whole batch, in seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Use scripted clients instead of calling the endpoints
        #[arg(long)]
        dry_run: bool,
    },

    /// Generate reports from existing results
    Report {
        /// Path to results JSON file
        #[arg(short, long)]
        results: PathBuf,

        /// Output directory for reports
        #[arg(short, long, default_value = "reports")]
        output: PathBuf,
    },

    /// Initialize default configuration
    Init {
        /// Output path for config file
        #[arg(short, long, default_value = "llm-verifier.toml")]
        output: PathBuf,
    },

    /// Validate a configuration file
    Validate {
        /// Path to configuration file
        #[arg(short, long)]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("llm_verifier=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    let outcome = match cli.command {
        Commands::Run {
            config,
            output,
            concurrency,
            timeout,
            dry_run,
        } => run_verification(config, output, concurrency, timeout, dry_run).await,
        Commands::Report { results, output } => generate_reports(results, output),
        Commands::Init { output } => init_config(output),
        Commands::Validate { config } => validate(config),
    };

    if let Err(err) = &outcome {
        tracing::error!("{:#}", err);
    }
    outcome
}

/// @ai:intent Verify all models and write timestamped reports
/// @ai:effects network, fs:write
async fn run_verification(
    config_path: PathBuf,
    output: PathBuf,
    concurrency: Option<usize>,
    timeout: Option<u64>,
    dry_run: bool,
) -> Result<()> {
    let mut config = VerifierConfig::load(&config_path)?;
    if let Some(concurrency) = concurrency {
        config.run.concurrency = concurrency;
    }
    if let Some(timeout) = timeout {
        config.run.timeout_secs = timeout;
    }
    config.validate().context("Invalid command-line overrides")?;

    let result_set = if dry_run {
        tracing::info!("Running in dry-run mode");
        let default_model = config.global.default_model.clone();
        let factory = MockClientFactory::new(move |endpoint| {
            let model = endpoint.model.clone().unwrap_or_else(|| default_model.clone());
            MockProbeClient::new(&[model.as_str()])
        });
        verify(factory, config).await?
    } else {
        let factory = OpenAiClientFactory::new(&config);
        verify(factory, config).await?
    };

    let timestamp = chrono::Utc::now().format("%Y-%m-%d_%H-%M-%S");
    let output_dir = output.join(timestamp.to_string());
    ReportGenerator::new().generate_all(&result_set, &output_dir)?;

    print_summary(&result_set.summary());
    println!("Reports written to {}", output_dir.display());
    Ok(())
}

async fn verify<F: ClientFactory>(factory: F, config: VerifierConfig) -> Result<ResultSet> {
    let models: Vec<ModelEndpoint> = config.models.clone();
    let orchestrator = VerificationOrchestrator::new(factory, config);
    Ok(orchestrator.verify_all(&models).await?)
}

fn generate_reports(results_path: PathBuf, output_dir: PathBuf) -> Result<()> {
    let reporter = ReportGenerator::new();
    let result_set: ResultSet = reporter.load_results(&results_path)?;
    reporter.generate_all(&result_set, &output_dir)?;

    println!("Reports generated in {}", output_dir.display());
    Ok(())
}

fn init_config(output: PathBuf) -> Result<()> {
    let config = VerifierConfig::default();
    config.save(&output)?;
    println!("Configuration saved to {}", output.display());
    Ok(())
}

fn validate(config_path: PathBuf) -> Result<()> {
    let config = VerifierConfig::load(&config_path)?;
    println!("Configuration {} is valid", config_path.display());

    if config.models.is_empty() {
        println!(
            "No models configured; models will be discovered at {}",
            config.global.base_url
        );
        return Ok(());
    }

    for model in &config.models {
        println!(
            "  {:<20} {:<40} {}",
            model.name,
            model.base_url,
            model.model.as_deref().unwrap_or("(all listed models)")
        );
    }
    Ok(())
}

fn print_summary(summary: &Summary) {
    println!();
    println!("LLM Verification Results");
    println!("========================");
    println!();
    println!("{:<25} {:>10}", "Total models:", summary.total_models);
    println!("{:<25} {:>10}", "Available:", summary.available_models);
    println!("{:<25} {:>10}", "Failed:", summary.failed_models);
    println!("{:<25} {:>10.1}", "Average score:", summary.average_score);
    println!("{:<25} {:>9.1}%", "Brotli support:", summary.brotli_support_rate);
    println!("{:<25} {:>9.1}%", "HTTP/3 support:", summary.http3_support_rate);
    println!();

    if summary.rankings.by_overall.is_empty() {
        return;
    }

    println!("{:<6} {:<35} {:<20} {:>8}", "Rank", "Model", "Endpoint", "Score");
    println!("{}", "-".repeat(72));
    for entry in summary.rankings.by_overall.iter().take(10) {
        println!(
            "{:<6} {:<35} {:<20} {:>8.1}",
            entry.rank, entry.model_name, entry.endpoint_name, entry.score
        );
    }
    println!();
}
