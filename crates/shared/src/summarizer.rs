use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use crate::config::Config;
use crate::error::PipelineError;
use crate::extractor::{truncate_chars, MAX_RAW_FALLBACK_CHARS, MAX_SUMMARY_INPUT_CHARS};

/// Result of one summarization call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Summary {
    Success(String),
    Failed(String),
}

const SUMMARY_FIELDS: [&str; 4] = ["summary_text", "generated_text", "summary", "generated"];

#[derive(Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
}

/// Client for a Hugging Face style inference endpoint
pub struct HuggingFaceSummarizer {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl HuggingFaceSummarizer {
    pub fn new(config: &Config) -> Result<Self, PipelineError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()?;

        let endpoint = format!(
            "{}/{}",
            config.hf_api_base.trim_end_matches('/'),
            config.hf_model.trim_start_matches('/')
        );

        Ok(Self {
            client,
            api_key: config.hf_api_key.clone(),
            endpoint,
        })
    }

    /// Summarize `text`. Never returns an error; every failure becomes `Summary::Failed`.
    pub async fn summarize(&self, text: &str) -> Summary {
        match self.try_summarize(text).await {
            Ok(summary) => summary,
            Err(reason) => Summary::Failed(reason),
        }
    }

    async fn try_summarize(&self, text: &str) -> Result<Summary, String> {
        let request = InferenceRequest {
            inputs: truncate_chars(text, MAX_SUMMARY_INPUT_CHARS),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| format!("request to summarization API failed: {e}"))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("unknown error"));
            return Err(format!(
                "summarization API returned {status}: {}",
                truncate_chars(&error_text, MAX_RAW_FALLBACK_CHARS)
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| format!("failed to read summarization response: {e}"))?;

        Ok(normalize_response(&body))
    }
}

/// Map any accepted response shape to a summary.
///
/// Accepted: `[{"summary_text": ..}]`, `"text"`, `{"summary_text": ..}`, with
/// `generated_text`, `summary` or `generated` as alternative field names.
/// Anything else falls back to a bounded dump of the raw body.
pub fn normalize_response(body: &str) -> Summary {
    let value: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(_) => return raw_fallback(body),
    };

    if let Some(error) = value.get("error") {
        return Summary::Failed(format!("summarization API error: {error}"));
    }

    let extracted = match &value {
        Value::String(s) => Some(s.as_str()),
        Value::Array(items) => items.first().and_then(summary_field),
        Value::Object(_) => summary_field(&value),
        _ => None,
    };

    match extracted.map(str::trim) {
        Some("") => Summary::Failed("summarization API returned an empty summary".to_string()),
        Some(text) => Summary::Success(text.to_string()),
        None => raw_fallback(body),
    }
}

fn summary_field(value: &Value) -> Option<&str> {
    SUMMARY_FIELDS
        .iter()
        .find_map(|field| value.get(field).and_then(Value::as_str))
}

fn raw_fallback(body: &str) -> Summary {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Summary::Failed("summarization API returned an empty body".to_string());
    }

    tracing::warn!("unrecognised summarization response shape, using raw response text");
    Summary::Success(truncate_chars(trimmed, MAX_RAW_FALLBACK_CHARS).to_string())
}
