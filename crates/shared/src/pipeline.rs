//! Fetch → summarize → publish → record, one item at a time.

use std::time::Duration;

use crate::config::{Config, SummarizeFailurePolicy};
use crate::error::PipelineError;
use crate::extractor::summary_input;
use crate::facebook::{FacebookPublisher, PublishOutcome};
use crate::feed::FeedClient;
use crate::io::PostedStore;
use crate::models::FeedItem;
use crate::summarizer::{HuggingFaceSummarizer, Summary};

/// Knobs that shape a single run
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub max_posts: usize,
    pub post_delay: Duration,
    pub on_summarize_failure: SummarizeFailurePolicy,
    /// Summarize and compose, but neither publish nor persist
    pub dry_run: bool,
}

impl RunOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_posts: config.max_posts_per_run,
            post_delay: config.post_delay,
            on_summarize_failure: config.on_summarize_failure,
            dry_run: false,
        }
    }
}

/// What happened during a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Identifiers published this run, in feed order
    pub posted: Vec<String>,
    /// Identifiers whose summarize or publish step failed
    pub failed: Vec<String>,
    pub already_posted: usize,
    pub missing_identifier: usize,
    pub cap_reached: bool,
}

pub struct PublishPipeline {
    feed_url: String,
    feed: FeedClient,
    summarizer: HuggingFaceSummarizer,
    publisher: FacebookPublisher,
    store: PostedStore,
    options: RunOptions,
}

impl PublishPipeline {
    pub fn new(config: &Config, options: RunOptions) -> Result<Self, PipelineError> {
        Ok(Self {
            feed_url: config.feed_url.clone(),
            feed: FeedClient::new()?,
            summarizer: HuggingFaceSummarizer::new(config)?,
            publisher: FacebookPublisher::new(config)?,
            store: PostedStore::new(&config.posted_store_path),
            options,
        })
    }

    /// Run one pass over the feed.
    ///
    /// Fails only when the feed cannot be fetched (store untouched) or the
    /// store cannot be written. Per-item failures are logged and counted in
    /// the report.
    pub async fn run(&self) -> Result<RunReport, PipelineError> {
        let mut posted = self.store.load();
        let items = self.feed.fetch_items(&self.feed_url).await?;

        tracing::info!(
            items = items.len(),
            known = posted.len(),
            cap = self.options.max_posts,
            "processing feed"
        );

        let mut report = RunReport::default();
        let mut cooldown_due = false;

        for item in &items {
            if report.posted.len() >= self.options.max_posts {
                report.cap_reached = true;
                break;
            }

            let Some(id) = item.identifier() else {
                tracing::debug!(title = %item.title, "item has no identifier, skipping");
                report.missing_identifier += 1;
                continue;
            };

            if posted.contains(id) {
                tracing::debug!(id, "already posted, skipping");
                report.already_posted += 1;
                continue;
            }

            // Cooldown runs before the next attempt, never after the last post
            if cooldown_due && !self.options.post_delay.is_zero() {
                tokio::time::sleep(self.options.post_delay).await;
            }
            cooldown_due = false;

            match self.process_item(id, item).await {
                Some(post_id) => {
                    tracing::info!(id, title = %item.title, post_id = %post_id, "posted");
                    posted.insert(id);
                    report.posted.push(id.to_string());
                    cooldown_due = true;

                    if report.posted.len() >= self.options.max_posts {
                        report.cap_reached = true;
                        break;
                    }
                }
                None => report.failed.push(id.to_string()),
            }
        }

        if self.options.dry_run {
            tracing::info!("dry run, posted-set store left unchanged");
        } else {
            self.store.save(&posted)?;
        }

        tracing::info!(
            posted = report.posted.len(),
            failed = report.failed.len(),
            already_posted = report.already_posted,
            missing_identifier = report.missing_identifier,
            cap_reached = report.cap_reached,
            "run finished"
        );

        Ok(report)
    }

    /// Summarize and publish one item; returns the post id on success.
    async fn process_item(&self, id: &str, item: &FeedItem) -> Option<String> {
        let input = summary_input(&item.title, item.body());
        if input.is_empty() {
            tracing::warn!(id, title = %item.title, "item has no text to summarize, skipping");
            return None;
        }

        let text = match self.summarizer.summarize(&input).await {
            Summary::Success(text) => text,
            Summary::Failed(reason) => match self.options.on_summarize_failure {
                SummarizeFailurePolicy::Skip => {
                    tracing::warn!(
                        id,
                        title = %item.title,
                        %reason,
                        "summarization failed, skipping"
                    );
                    return None;
                }
                SummarizeFailurePolicy::PostOriginal => {
                    tracing::warn!(
                        id,
                        title = %item.title,
                        %reason,
                        "summarization failed, posting original text"
                    );
                    input
                }
            },
        };

        let message = compose_message(&text, &item.link);

        if self.options.dry_run {
            tracing::info!(id, %message, "dry run, not publishing");
            return Some("dry-run".to_string());
        }

        match self.publisher.publish(&message).await {
            PublishOutcome::Posted(post_id) => Some(post_id),
            PublishOutcome::Failed(reason) => {
                tracing::warn!(id, title = %item.title, %reason, "publish failed, skipping");
                None
            }
        }
    }
}

/// Outgoing post text: summary, blank line, source link.
pub fn compose_message(summary: &str, link: &str) -> String {
    let summary = summary.trim();
    let link = link.trim();

    if link.is_empty() {
        summary.to_string()
    } else {
        format!("{summary}\n\n{link}")
    }
}
