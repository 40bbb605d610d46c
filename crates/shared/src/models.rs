use serde::{Deserialize, Serialize};

/// One entry from the RSS source
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedItem {
    pub guid: String,
    pub title: String,
    pub link: String,
    /// Full HTML body (`content:encoded` for RSS, `<content>` for Atom)
    pub content: String,
    /// Description / Atom summary
    pub summary: String,
    /// Plain text rendering of `content`, or of `summary` when there is no content
    pub content_snippet: String,
}

impl FeedItem {
    /// Identity used for deduplication: first non-empty of guid, link, title.
    ///
    /// Returns `None` when all three are blank; such items cannot be deduped and are skipped.
    pub fn identifier(&self) -> Option<&str> {
        first_non_empty(&[&self.guid, &self.link, &self.title])
    }

    /// Text to summarize: first non-empty of content snippet, content, summary.
    pub fn body(&self) -> &str {
        first_non_empty(&[&self.content_snippet, &self.content, &self.summary]).unwrap_or("")
    }
}

fn first_non_empty<'a>(candidates: &[&'a String]) -> Option<&'a str> {
    candidates
        .iter()
        .copied()
        .map(|s| s.trim())
        .find(|s| !s.is_empty())
}

/// On-disk layout of the posted-set store
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PostedRecord {
    pub posted: Vec<String>,
}
