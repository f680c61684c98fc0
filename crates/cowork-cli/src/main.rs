mod export;
mod offline;
mod pipeline;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use cowork_core::AppConfig;
use cowork_scraper::{ChromeOptions, ChromeSession};
use tracing_subscriber::EnvFilter;

use crate::export::XlsxSink;
use crate::pipeline::{run_until_interrupted, PipelineOptions, SessionOutcome};

#[derive(Debug, Parser)]
#[command(name = "cowork")]
#[command(about = "Scrape the coworking directory into a spreadsheet")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Collect listings, scrape every detail page, and write the workbook
    Run(RunArgs),
    /// Parse a saved listing page and print its entries as JSON
    ParseListing {
        #[arg(long)]
        file: PathBuf,
        /// URL the saved page was served from, used to resolve links
        #[arg(long)]
        base_url: String,
    },
    /// Parse a saved detail page and print the extracted record as JSON
    ParseDetail {
        #[arg(long)]
        file: PathBuf,
    },
}

#[derive(Debug, Default, Args)]
struct RunArgs {
    /// Listing page to start from (overrides COWORK_LISTING_URL)
    #[arg(long)]
    url: Option<String>,
    /// Only process the first N listings
    #[arg(long)]
    limit: Option<usize>,
    /// Directory for checkpoints and the final workbook (overrides COWORK_OUTPUT_DIR)
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

impl RunArgs {
    fn apply(&self, mut config: AppConfig) -> AppConfig {
        if let Some(url) = &self.url {
            config.listing_url.clone_from(url);
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir.clone_from(dir);
        }
        config
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = cowork_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command.unwrap_or(Commands::Run(RunArgs::default())) {
        Commands::Run(args) => run(args.apply(config), args.limit).await?,
        Commands::ParseListing { file, base_url } => {
            println!("{}", offline::listing_json(&file, &base_url)?);
        }
        Commands::ParseDetail { file } => {
            println!("{}", offline::detail_json(&file)?);
        }
    }

    Ok(())
}

/// Owns the browser for the whole run. Ctrl-C stops the run without a final
/// save.
async fn run(config: AppConfig, limit: Option<usize>) -> anyhow::Result<()> {
    let options = PipelineOptions::from_config(&config, limit);
    let mut sink = XlsxSink::new(&config.output_dir);

    let mut session = ChromeSession::launch(&ChromeOptions::from_config(&config))
        .await
        .context("failed to start browser")?;

    let interrupt = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %err, "cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };
    let outcome = run_until_interrupted(&mut session, &mut sink, &options, interrupt).await;
    if matches!(outcome, SessionOutcome::Finished(ref summary) if summary.final_saved) {
        tracing::info!(output = %config.output_path().display(), "workbook written");
    }
    Ok(())
}
