use reqwest::Client;
use serde::Deserialize;

use crate::config::Config;
use crate::error::PipelineError;

/// Result of one publish call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// Post identifier returned by the Graph API
    Posted(String),
    Failed(String),
}

#[derive(Debug, Deserialize)]
struct GraphResponse {
    id: Option<String>,
    post_id: Option<String>,
}

/// Publishes messages to a page feed through the Graph API
pub struct FacebookPublisher {
    client: Client,
    feed_endpoint: String,
    access_token: String,
}

impl FacebookPublisher {
    pub fn new(config: &Config) -> Result<Self, PipelineError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        let feed_endpoint = format!(
            "{}/{}/feed",
            config.fb_graph_base.trim_end_matches('/'),
            urlencoding::encode(&config.fb_page_id)
        );

        Ok(Self {
            client,
            feed_endpoint,
            access_token: config.fb_page_token.clone(),
        })
    }

    /// Post `message` to the page feed. Never returns an error; every failure
    /// becomes `PublishOutcome::Failed`.
    pub async fn publish(&self, message: &str) -> PublishOutcome {
        match self.try_publish(message).await {
            Ok(post_id) => PublishOutcome::Posted(post_id),
            Err(reason) => PublishOutcome::Failed(reason),
        }
    }

    async fn try_publish(&self, message: &str) -> Result<String, String> {
        let url = format!(
            "{}?message={}&access_token={}",
            self.feed_endpoint,
            urlencoding::encode(message),
            urlencoding::encode(&self.access_token)
        );

        // reqwest errors carry the full URL, which includes the access token
        let response = self
            .client
            .post(&url)
            .send()
            .await
            .map_err(|e| format!("request to Graph API failed: {}", e.without_url()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| format!("failed to read Graph API response: {}", e.without_url()))?;

        if !status.is_success() {
            return Err(format!("Graph API returned {status}: {body}"));
        }

        post_id_from_body(&body)
    }
}

/// Extract the post identifier from a Graph API response body.
pub fn post_id_from_body(body: &str) -> Result<String, String> {
    let parsed: GraphResponse = serde_json::from_str(body)
        .map_err(|e| format!("unexpected Graph API response ({e}): {body}"))?;

    parsed
        .id
        .or(parsed.post_id)
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| format!("Graph API response has no post id: {body}"))
}
