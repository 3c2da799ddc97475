mod config;
mod db;
mod digest;
mod errors;
mod llm_client;
mod matching;
mod models;
mod scraping;
mod store;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::LlmClient;

#[derive(Parser)]
#[command(name = "jobscout")]
#[command(about = "Career-page job aggregator with AI match scoring", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape all configured Greenhouse boards and save new jobs
    Scrape {
        /// Skip fetching full job descriptions (faster, but needed for AI matching)
        #[arg(long)]
        no_descriptions: bool,
    },
    /// Score unscored jobs against the candidate profile
    Match {
        /// Score jobs but don't save to the database
        #[arg(long)]
        dry_run: bool,
    },
    /// Email the weekly digest of new jobs
    Digest {
        /// Save an HTML preview instead of sending the email
        #[arg(long)]
        dry_run: bool,
    },
    /// Seed the companies table from the configured board list
    Seed,
    /// Print aggregate store statistics
    Stats,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("jobscout v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    let pool = create_pool(&config.database_url).await?;

    match cli.command {
        Commands::Scrape { no_descriptions } => {
            scraping::run::scrape_all(&pool, !no_descriptions).await?;
        }
        Commands::Match { dry_run } => {
            let llm = LlmClient::new(config.anthropic_api_key.clone());
            info!("LLM client initialized (model: {})", llm_client::MODEL);

            let summary = matching::pipeline::run_matcher(&pool, llm, &config, dry_run).await?;
            if summary.all_errored() {
                // Individual job errors are not fatal, but a run where every
                // attempted job failed should surface in the exit code.
                std::process::exit(1);
            }
        }
        Commands::Digest { dry_run } => {
            digest::run_digest(&pool, &config, dry_run).await?;
        }
        Commands::Seed => {
            store::companies::seed_companies(&pool).await?;
        }
        Commands::Stats => {
            let stats = store::stats::get_stats(&pool).await?;
            info!("Active companies:  {}", stats.active_companies);
            info!("New jobs:          {}", stats.new_jobs);
            info!("Unscored jobs:     {}", stats.unscored_jobs);
            info!("Jobs ≥ threshold:  {}", stats.matching_jobs);
        }
    }

    Ok(())
}
