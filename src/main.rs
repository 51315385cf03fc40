//! Procurement Insight - LLM-assisted procurement KPI analysis
//!
//! A CLI tool that asks a Qwen model questions about a procurement CSV
//! and writes its answers next to manually computed statistics.
//!
//! Exit codes:
//!   0 - Success (individual AI answers may still have failed)
//!   1 - Fatal error (missing credential, bad dataset, write failure, etc.)

mod agent;
mod analysis;
mod cli;
mod config;
mod dataset;
mod errors;
mod models;
mod report;

use agent::{AnswerProvider, OfflineProvider, QwenConfig, QwenProvider};
use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::Config;
use models::{Report, ReportMetadata};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    init_logging(&args);

    info!("Procurement Insight v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run_analysis(args).await {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("Analysis failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .procurement-insight.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(config::CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            config::CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", config::CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", config::CONFIG_FILE_NAME);
    println!("   Edit it to customize the model, dataset path and report layout.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Run the complete analysis workflow.
async fn run_analysis(args: Args) -> Result<()> {
    let start_time = Instant::now();

    let mut config = load_config(&args, Path::new("."))?;
    config.merge_with_args(&args);

    // Step 1: Set up the answer provider. A missing credential fails here,
    // before any data is read.
    let provider = build_provider(&args, &config)?;

    // Step 2: Load the dataset and compute the manual statistics
    println!("📥 Loading dataset: {}", config.dataset.path.display());
    let dataset = dataset::load_dataset(&config.dataset.path)?;
    let aggregates = analysis::compute_aggregates(&dataset.records)?;

    println!("   Records: {}", aggregates.total_records);
    println!("   Suppliers: {}", aggregates.distinct_suppliers);
    println!("   Categories: {}", aggregates.distinct_categories);
    println!("   Total amount: {:.2}", aggregates.total_amount);

    // Step 3: Ask every question, one at a time
    let sections = analysis::default_sections();
    let question_count: usize = sections.iter().map(|s| s.entries.len()).sum();
    let context = dataset.context(config.dataset.sample_rows);

    println!(
        "\n🤖 Asking {} questions with model {}...",
        question_count,
        provider.model_name()
    );
    let answered =
        agent::collect_answers(provider.as_ref(), &sections, Some(&context), !args.quiet).await;

    let failed: usize = answered.iter().map(|s| s.failed_count()).sum();
    if failed > 0 {
        warn!("{} of {} questions failed", failed, question_count);
    }

    // Step 4: Render and write the report(s)
    println!("\n📝 Writing report...");
    let outputs = match args.format {
        OutputFormat::Json => {
            let full_report = Report {
                metadata: ReportMetadata {
                    dataset_path: config.dataset.path.display().to_string(),
                    generated_at: Utc::now(),
                    model_used: provider.model_name().to_string(),
                    total_records: aggregates.total_records,
                    total_questions: question_count,
                    failed_answers: failed,
                    duration_seconds: start_time.elapsed().as_secs_f64(),
                },
                aggregates,
                sections: answered,
            };
            vec![(report::JSON_FILE_NAME, report::generate_json_report(&full_report)?)]
        }
        OutputFormat::Text => report::render_text_outputs(
            &config.report.title,
            &answered,
            &aggregates,
            config.report.split_sections,
        ),
    };

    for (file_name, content) in &outputs {
        let path = config.general.output_dir.join(file_name);
        report::write_report(content, &path)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        println!("   Saved: {}", path.display());
    }

    println!("\n📊 Analysis Summary:");
    println!("   Questions: {} ({} failed)", question_count, failed);
    println!("   Duration: {:.1}s", start_time.elapsed().as_secs_f64());
    println!("\n✅ Analysis complete!");

    Ok(())
}

/// Pick the answer provider: offline for --dry-run, DashScope otherwise.
fn build_provider(args: &Args, config: &Config) -> Result<Box<dyn AnswerProvider>> {
    if args.dry_run {
        println!("🔍 Dry run: no model calls will be made.");
        return Ok(Box::new(OfflineProvider));
    }

    let api_key = config::require_api_key(args.api_key.as_deref())?;

    println!("🤖 Initializing answer provider...");
    println!("   Model: {}", config.model.name);
    println!("   Endpoint: {}", config.model.base_url);
    println!("   Timeout: {}s", config.model.timeout_seconds);

    let provider = QwenProvider::new(QwenConfig {
        base_url: config.model.base_url.clone(),
        model_name: config.model.name.clone(),
        api_key,
        timeout_seconds: config.model.timeout_seconds,
    })?;

    Ok(Box::new(provider))
}

/// Load configuration from `--config`, else from `search_dir`, else defaults.
///
/// A config file that exists but cannot be read or parsed is fatal.
fn load_config(args: &Args, search_dir: &Path) -> Result<Config> {
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    match Config::load_from_dir(search_dir)? {
        Some(config) => {
            info!("Loaded default config from {}", config::CONFIG_FILE_NAME);
            Ok(config)
        }
        None => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
    }
}
