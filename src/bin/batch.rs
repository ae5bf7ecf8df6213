use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use naukri_cv_scraper::{
    batch::{run_job, storage::LocalStorage},
    config::Config,
    init_tracing,
    workflow::WorkflowClient,
};

/// Run a single Naukri CV scrape as a batch job, reading INPUT from and
/// writing results to local platform storage.
#[derive(Parser, Debug)]
#[command(name = "naukri-batch", version, about)]
struct Args {
    /// Root of the dataset / key-value store directories
    #[arg(long, env = "APIFY_LOCAL_STORAGE_DIR", default_value = "./storage")]
    storage_dir: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    let config = Config::load().context("Failed to load configuration")?;
    let workflow = WorkflowClient::new(&config).context("Failed to build workflow client")?;
    let storage = LocalStorage::open(&args.storage_dir)
        .await
        .with_context(|| format!("Failed to open storage at {}", args.storage_dir.display()))?;

    let summary = run_job(&workflow, &storage).await.context("Scraping job failed")?;
    tracing::info!(
        requested = summary.requested,
        received = summary.received,
        saved = summary.items_saved,
        "Job complete"
    );

    Ok(())
}
