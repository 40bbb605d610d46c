use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use shared::{Config, PipelineError, PublishPipeline, RunOptions, SummarizeFailurePolicy};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fetch-and-publish")]
#[command(about = "Summarize new RSS items and post them to a Facebook page")]
struct Args {
    /// Path of the posted-set store (overrides POSTED_STORE_PATH)
    #[arg(long)]
    state_file: Option<PathBuf>,

    /// Maximum number of posts this run (overrides MAX_POSTS_PER_RUN)
    #[arg(short, long)]
    max_posts: Option<usize>,

    /// Seconds to wait between successful posts (overrides POST_DELAY_SECS)
    #[arg(long)]
    delay_secs: Option<u64>,

    /// What to do when summarization fails: skip or post-original
    #[arg(long)]
    on_summarize_failure: Option<SummarizeFailurePolicy>,

    /// Summarize and print messages without posting or updating the store
    #[arg(long)]
    dry_run: bool,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut config = Config::from_env()?;
    if let Some(path) = args.state_file {
        config.posted_store_path = path;
    }

    let mut options = RunOptions::from_config(&config);
    if let Some(max_posts) = args.max_posts {
        options.max_posts = max_posts;
    }
    if let Some(secs) = args.delay_secs {
        options.post_delay = Duration::from_secs(secs);
    }
    if let Some(policy) = args.on_summarize_failure {
        options.on_summarize_failure = policy;
    }
    options.dry_run = args.dry_run;

    println!("📰 Feed: {}", config.feed_url);
    println!("💾 Store: {}", config.posted_store_path.display());

    let pipeline = PublishPipeline::new(&config, options).context("Failed to set up pipeline")?;

    let report = match pipeline.run().await {
        Ok(report) => report,
        Err(e @ PipelineError::StoreWrite { .. }) => {
            tracing::error!(error = %e, "posted-set store was not saved");
            return Err(e).context("Posts were published but could not be recorded");
        }
        Err(e) => return Err(e).context("Run aborted"),
    };

    if !report.failed.is_empty() {
        println!("\n⚠ {} item(s) failed and will be retried next run:", report.failed.len());
        for id in &report.failed {
            println!("  ✗ {}", id);
        }
    }

    println!(
        "\n✅ Posted {} item(s), {} already posted{}",
        report.posted.len(),
        report.already_posted,
        if report.cap_reached {
            " (run cap reached)"
        } else {
            ""
        }
    );

    Ok(())
}
