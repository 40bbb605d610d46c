// Public modules
pub mod config;
pub mod error;
pub mod extractor;
pub mod facebook;
pub mod feed;
pub mod io;
pub mod models;
pub mod pipeline;
pub mod summarizer;

// Re-export commonly used types
pub use config::{Config, SummarizeFailurePolicy};
pub use error::PipelineError;
pub use facebook::{FacebookPublisher, PublishOutcome};
pub use feed::FeedClient;
pub use io::{PostedSet, PostedStore};
pub use models::FeedItem;
pub use pipeline::{compose_message, PublishPipeline, RunOptions, RunReport};
pub use summarizer::{HuggingFaceSummarizer, Summary};
