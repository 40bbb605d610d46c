use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::PipelineError;

const APP_DIR: &str = "feed-publisher";

const DEFAULT_FEED_URL: &str = "https://feeds.bbci.co.uk/news/rss.xml";
const DEFAULT_HF_MODEL: &str = "facebook/bart-large-cnn";
const DEFAULT_HF_API_BASE: &str = "https://api-inference.huggingface.co/models";
const DEFAULT_GRAPH_BASE: &str = "https://graph.facebook.com";
const DEFAULT_MAX_POSTS: usize = 3;
const DEFAULT_POST_DELAY_SECS: u64 = 2;

/// What to do with an item whose summarization failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SummarizeFailurePolicy {
    /// Leave the item unposted; it stays eligible next run
    #[default]
    Skip,
    /// Publish the bounded original text instead of a summary
    PostOriginal,
}

impl FromStr for SummarizeFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skip" => Ok(Self::Skip),
            "post-original" | "post_original" | "postoriginal" => Ok(Self::PostOriginal),
            other => Err(format!(
                "unknown summarize failure policy '{other}' (expected 'skip' or 'post-original')"
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub feed_url: String,
    pub hf_api_key: String,
    pub hf_model: String,
    pub hf_api_base: String,
    pub fb_page_id: String,
    pub fb_page_token: String,
    pub fb_graph_base: String,
    pub posted_store_path: PathBuf,
    pub max_posts_per_run: usize,
    pub post_delay: Duration,
    pub on_summarize_failure: SummarizeFailurePolicy,
}

impl Config {
    pub fn from_env() -> Result<Self, PipelineError> {
        // Try to load .env from multiple locations
        Self::try_load_dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    ///
    /// Every missing required variable is reported in a single error so a
    /// first-time setup does not have to be fixed one variable at a time.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, PipelineError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let or_default =
            |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let mut missing = Vec::new();
        let mut require = |key: &'static str| {
            let value = get(key);
            if value.is_none() {
                missing.push(key);
            }
            value.unwrap_or_default()
        };

        let hf_api_key = require("HF_API_KEY");
        let fb_page_id = require("FB_PAGE_ID");
        let fb_page_token = require("FB_PAGE_TOKEN");

        if !missing.is_empty() {
            return Err(PipelineError::Config(format!(
                "missing required environment variables: {}.\n\n\
                Set them in the environment or in ~/.config/{APP_DIR}/.env:\n  \
                HF_API_KEY=your_huggingface_token\n  \
                FB_PAGE_ID=your_page_id\n  \
                FB_PAGE_TOKEN=your_page_access_token",
                missing.join(", ")
            )));
        }

        let feed_url =
            validated_url("RSS_FEED_URL", or_default("RSS_FEED_URL", DEFAULT_FEED_URL))?;
        let hf_api_base =
            validated_url("HF_API_BASE", or_default("HF_API_BASE", DEFAULT_HF_API_BASE))?;
        let fb_graph_base =
            validated_url("FB_GRAPH_BASE", or_default("FB_GRAPH_BASE", DEFAULT_GRAPH_BASE))?;

        let posted_store_path = match get("POSTED_STORE_PATH") {
            Some(path) => PathBuf::from(path),
            None => default_posted_store_path()?,
        };

        let max_posts_per_run =
            parse_or("MAX_POSTS_PER_RUN", get("MAX_POSTS_PER_RUN"), DEFAULT_MAX_POSTS)?;
        let post_delay_secs =
            parse_or("POST_DELAY_SECS", get("POST_DELAY_SECS"), DEFAULT_POST_DELAY_SECS)?;
        let on_summarize_failure = parse_or(
            "SUMMARIZE_FAILURE_POLICY",
            get("SUMMARIZE_FAILURE_POLICY"),
            SummarizeFailurePolicy::Skip,
        )?;

        Ok(Self {
            feed_url,
            hf_api_key,
            hf_model: or_default("HF_MODEL", DEFAULT_HF_MODEL),
            hf_api_base,
            fb_page_id,
            fb_page_token,
            fb_graph_base,
            posted_store_path,
            max_posts_per_run,
            post_delay: Duration::from_secs(post_delay_secs),
            on_summarize_failure,
        })
    }

    fn try_load_dotenv() {
        // 1. Current directory (for development)
        if dotenvy::dotenv().is_ok() {
            return;
        }

        // 2. ~/.config/feed-publisher/.env, then 3. ~/.env
        let candidates = [
            dirs::config_dir().map(|dir| dir.join(APP_DIR).join(".env")),
            dirs::home_dir().map(|dir| dir.join(".env")),
        ];

        // If none found, that's okay - environment variables might be set system-wide
        load_first_env_file(candidates.into_iter().flatten());
    }
}

/// Load the first existing `.env` file that parses; returns the one loaded.
///
/// A file that exists but fails to parse is logged and the next candidate is tried.
fn load_first_env_file(candidates: impl IntoIterator<Item = PathBuf>) -> Option<PathBuf> {
    for path in candidates {
        if !path.exists() {
            continue;
        }
        match dotenvy::from_path(&path) {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "loaded .env file");
                return Some(path);
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable .env file");
            }
        }
    }
    None
}

/// Default location of the posted-set store
pub fn default_posted_store_path() -> Result<PathBuf, PipelineError> {
    let data_dir = dirs::data_local_dir().ok_or_else(|| {
        PipelineError::Config(
            "could not determine local data directory; set POSTED_STORE_PATH".to_string(),
        )
    })?;

    Ok(data_dir.join(APP_DIR).join("posted.json"))
}

fn validated_url(key: &str, raw: String) -> Result<String, PipelineError> {
    url::Url::parse(&raw)
        .map_err(|e| PipelineError::Config(format!("{key} is not a valid URL ({raw}): {e}")))?;
    Ok(raw)
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> Result<T, PipelineError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|e| PipelineError::Config(format!("invalid {key} '{value}': {e}"))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from_map(
        map: HashMap<&'static str, &'static str>,
    ) -> impl Fn(&str) -> Option<String> {
        move |key| map.get(key).map(|v| (*v).to_string())
    }

    fn required_env() -> HashMap<&'static str, &'static str> {
        let mut m = HashMap::new();
        m.insert("HF_API_KEY", "hf-key");
        m.insert("FB_PAGE_ID", "12345");
        m.insert("FB_PAGE_TOKEN", "page-token");
        m.insert("POSTED_STORE_PATH", "/tmp/posted.json");
        m
    }

    #[test]
    fn defaults_apply_when_only_required_vars_are_set() {
        let config = Config::from_lookup(lookup_from_map(required_env())).unwrap();

        assert_eq!(config.feed_url, DEFAULT_FEED_URL);
        assert_eq!(config.hf_model, DEFAULT_HF_MODEL);
        assert_eq!(config.hf_api_base, DEFAULT_HF_API_BASE);
        assert_eq!(config.fb_graph_base, DEFAULT_GRAPH_BASE);
        assert_eq!(config.max_posts_per_run, 3);
        assert_eq!(config.post_delay, Duration::from_secs(2));
        assert_eq!(config.on_summarize_failure, SummarizeFailurePolicy::Skip);
        assert_eq!(config.posted_store_path, PathBuf::from("/tmp/posted.json"));
    }

    #[test]
    fn all_missing_required_vars_are_reported_together() {
        let err = Config::from_lookup(lookup_from_map(HashMap::new())).unwrap_err();
        let msg = err.to_string();

        assert!(matches!(err, PipelineError::Config(_)));
        assert!(msg.contains("HF_API_KEY"));
        assert!(msg.contains("FB_PAGE_ID"));
        assert!(msg.contains("FB_PAGE_TOKEN"));
    }

    #[test]
    fn blank_required_var_counts_as_missing() {
        let mut env = required_env();
        env.insert("FB_PAGE_TOKEN", "   ");

        let err = Config::from_lookup(lookup_from_map(env)).unwrap_err();
        assert!(err.to_string().contains("FB_PAGE_TOKEN"));
    }

    #[test]
    fn overrides_are_parsed() {
        let mut env = required_env();
        env.insert("MAX_POSTS_PER_RUN", "5");
        env.insert("POST_DELAY_SECS", "0");
        env.insert("SUMMARIZE_FAILURE_POLICY", "post-original");
        env.insert("HF_MODEL", "sshleifer/distilbart-cnn-12-6");

        let config = Config::from_lookup(lookup_from_map(env)).unwrap();
        assert_eq!(config.max_posts_per_run, 5);
        assert_eq!(config.post_delay, Duration::ZERO);
        assert_eq!(config.on_summarize_failure, SummarizeFailurePolicy::PostOriginal);
        assert_eq!(config.hf_model, "sshleifer/distilbart-cnn-12-6");
    }

    #[test]
    fn invalid_numbers_and_urls_are_config_errors() {
        let mut env = required_env();
        env.insert("MAX_POSTS_PER_RUN", "three");
        let err = Config::from_lookup(lookup_from_map(env)).unwrap_err();
        assert!(err.to_string().contains("MAX_POSTS_PER_RUN"));

        let mut env = required_env();
        env.insert("RSS_FEED_URL", "not a url");
        let err = Config::from_lookup(lookup_from_map(env)).unwrap_err();
        assert!(err.to_string().contains("RSS_FEED_URL"));
    }

    #[test]
    fn first_parsable_env_file_wins() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.env");
        let broken = dir.path().join("broken.env");
        let good = dir.path().join("good.env");
        let later = dir.path().join("later.env");
        std::fs::write(&broken, "this line has no equals sign\n").unwrap();
        std::fs::write(&good, "FEED_PUBLISHER_DOTENV_CHECK=from-good\n").unwrap();
        std::fs::write(&later, "FEED_PUBLISHER_DOTENV_LATER=from-later\n").unwrap();

        let loaded = load_first_env_file([missing, broken, good.clone(), later]);

        assert_eq!(loaded, Some(good));
        assert_eq!(
            env::var("FEED_PUBLISHER_DOTENV_CHECK").as_deref(),
            Ok("from-good")
        );
        assert!(env::var("FEED_PUBLISHER_DOTENV_LATER").is_err());
    }

    #[test]
    fn no_env_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_first_env_file([dir.path().join("absent.env")]), None);
    }

    #[test]
    fn policy_parses_known_names_only() {
        assert_eq!(
            "skip".parse::<SummarizeFailurePolicy>(),
            Ok(SummarizeFailurePolicy::Skip)
        );
        assert_eq!(
            "Post-Original".parse::<SummarizeFailurePolicy>(),
            Ok(SummarizeFailurePolicy::PostOriginal)
        );
        assert!("retry".parse::<SummarizeFailurePolicy>().is_err());
    }
}
