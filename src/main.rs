//! TrendScout - Reddit-driven product research reports
//!
//! A CLI tool that translates a topic into an English search phrase,
//! collects recent Reddit discussions about it and asks Gemini for a
//! structured product-sourcing report.
//!
//! Exit codes:
//!   0 - Success (including runs that found no data)
//!   1 - Configuration error or translation failure

mod cli;
mod config;
mod console;
mod error;
mod llm;
mod models;
mod pipeline;
mod reddit;
mod report;

use anyhow::{Context, Result};
use cli::Args;
use config::Config;
use console::ReportOutput;
use llm::gemini::GeminiSettings;
use llm::GeminiClient;
use pipeline::{Pipeline, PipelineSettings};
use reddit::client::RedditSettings;
use reddit::RedditClient;
use std::path::PathBuf;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Credentials may live in a .env file; load it before clap reads env vars
    let _ = dotenvy::dotenv();

    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("TrendScout v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run(args).await {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("Run failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .trendscout.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(config::DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            config::DEFAULT_CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", config::DEFAULT_CONFIG_FILE))?;

    println!(
        "✅ Created {} with default settings.",
        config::DEFAULT_CONFIG_FILE
    );
    println!(
        "   Put credentials in it, or export {}, {} and {}.",
        config::ENV_MODEL_API_KEY,
        config::ENV_REDDIT_CLIENT_ID,
        config::ENV_REDDIT_CLIENT_SECRET
    );
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
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

/// Build the clients once and hand them to the selected front end.
async fn run(args: Args) -> Result<()> {
    // Load configuration
    let mut config = load_config(&args)?;
    config.apply_env();
    config.merge_with_args(&args);

    // Configuration problems stop us before any stage runs
    config.validate()?;

    let model = GeminiClient::new(GeminiSettings::try_from(&config.model)?)?;
    let source = RedditClient::new(RedditSettings::try_from(&config.reddit)?)?;

    if !args.quiet {
        println!("🤖 Clients ready");
        println!("   Model: {}", config.model.name);
        println!("   Subreddits: {}", config.reddit.subreddits.join("+"));
    }

    let settings = PipelineSettings::from(&config);
    let pipeline = Pipeline::new(&model, &source, &settings);

    let output = ReportOutput {
        path: config.general.output.as_ref().map(PathBuf::from),
        format: args.format,
    };

    if args.interactive {
        console::interactive::run_session(&pipeline, config.reddit.limit, &output).await
    } else {
        console::batch::run_batch(
            &pipeline,
            args.topic.clone(),
            config.reddit.limit,
            &output,
            args.quiet,
        )
        .await
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", config::DEFAULT_CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
