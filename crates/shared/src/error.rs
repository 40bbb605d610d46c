use std::path::PathBuf;

use thiserror::Error;

/// Fatal outcomes of a run. Per-item summarize/publish failures are not errors;
/// they are reported through [`crate::Summary`] and [`crate::PublishOutcome`].
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("failed to create HTTP client: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to fetch feed {url}: {reason}")]
    FeedFetch { url: String, reason: String },

    #[error("failed to parse feed {url}: {reason}")]
    FeedParse { url: String, reason: String },

    #[error(
        "failed to write posted-set store {}: {source} (items posted this run may be posted again next run)",
        .path.display()
    )]
    StoreWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
