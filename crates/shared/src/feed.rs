use feed_rs::model::Entry;
use feed_rs::parser;
use reqwest::Client;

use crate::error::PipelineError;
use crate::extractor::snippet_from_html;
use crate::models::FeedItem;

pub struct FeedClient {
    client: Client,
}

impl FeedClient {
    pub fn new() -> Result<Self, PipelineError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (compatible; FeedPublisher/1.0)")
            .build()?;

        Ok(Self { client })
    }

    /// Fetch the feed and return its items in feed order.
    ///
    /// Any failure here aborts the run, so nothing is retried.
    pub async fn fetch_items(&self, url: &str) -> Result<Vec<FeedItem>, PipelineError> {
        let fetch_err = |reason: String| PipelineError::FeedFetch {
            url: url.to_string(),
            reason,
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| fetch_err(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(fetch_err(format!("HTTP {status}")));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| fetch_err(format!("failed to read response body: {e}")))?;

        let items = parse_feed(&bytes).map_err(|reason| PipelineError::FeedParse {
            url: url.to_string(),
            reason,
        })?;

        tracing::debug!(url, count = items.len(), "fetched feed");
        Ok(items)
    }
}

/// Parse RSS/Atom bytes into feed items.
///
/// feed-rs normally invents an id for entries without a guid; that is switched
/// off here so identifier resolution can fall through to link and title.
pub fn parse_feed(bytes: &[u8]) -> Result<Vec<FeedItem>, String> {
    let feed = parser::Builder::new()
        .id_generator(|_, _, _| String::new())
        .build()
        .parse(bytes)
        .map_err(|e| e.to_string())?;

    Ok(feed.entries.into_iter().map(item_from_entry).collect())
}

fn item_from_entry(entry: Entry) -> FeedItem {
    let title = entry.title.map(|t| t.content).unwrap_or_default();
    let link = select_link(&entry.links);
    let content = entry.content.and_then(|c| c.body).unwrap_or_default();
    let summary = entry.summary.map(|s| s.content).unwrap_or_default();

    let snippet_source = if content.trim().is_empty() {
        &summary
    } else {
        &content
    };
    let content_snippet = snippet_from_html(snippet_source);

    FeedItem {
        guid: entry.id,
        title,
        link,
        content,
        summary,
        content_snippet,
    }
}

fn select_link(links: &[feed_rs::model::Link]) -> String {
    let non_empty = || links.iter().filter(|l| !l.href.trim().is_empty());

    non_empty()
        .find(|l| {
            l.rel
                .as_deref()
                .map_or(true, |rel| rel.eq_ignore_ascii_case("alternate"))
        })
        .or_else(|| non_empty().next())
        .map(|l| l.href.trim().to_string())
        .unwrap_or_default()
}
