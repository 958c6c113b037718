//! AI provider subsystem: model inference and knowledge retrieval.
//!
//! Each backend implements a trait from [`traits`] and is built from
//! injected configuration. Upstream error bodies are scrubbed of
//! secret-looking tokens and truncated before they can reach a log line or
//! an HTTP response.

pub mod bedrock;
pub mod traits;

pub use traits::{KnowledgeProvider, ModelProvider};

use crate::config::BedrockConfig;

const MAX_API_ERROR_CHARS: usize = 200;

/// Shared reqwest client settings for all provider adapters.
pub(crate) fn build_http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(120))
        .connect_timeout(std::time::Duration::from_secs(10))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// Build the model-inference provider from config.
pub fn create_model_provider(config: &BedrockConfig) -> Box<dyn ModelProvider> {
    Box::new(bedrock::BedrockRuntime::new(config))
}

/// Build the knowledge-retrieval provider from config.
pub fn create_knowledge_provider(config: &BedrockConfig) -> Box<dyn KnowledgeProvider> {
    Box::new(bedrock::BedrockKnowledgeBase::new(config))
}

fn is_secret_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':' | '/' | '+' | '=')
}

fn token_end(input: &str, from: usize) -> usize {
    let mut end = from;
    for (i, c) in input[from..].char_indices() {
        if is_secret_char(c) {
            end = from + i + c.len_utf8();
        } else {
            break;
        }
    }
    end
}

/// Scrub known secret-like token prefixes from provider error strings.
///
/// Redacts AWS access key ids (`AKIA`/`ASIA`) and generic `sk-` API keys.
pub fn scrub_secret_patterns(input: &str) -> String {
    const PREFIXES: [&str; 3] = ["AKIA", "ASIA", "sk-"];

    let mut scrubbed = input.to_string();

    for prefix in PREFIXES {
        let mut search_from = 0;
        loop {
            let Some(rel) = scrubbed[search_from..].find(prefix) else {
                break;
            };

            let start = search_from + rel;
            let content_start = start + prefix.len();
            let end = token_end(&scrubbed, content_start);

            if end == content_start {
                search_from = content_start;
                continue;
            }

            scrubbed.replace_range(start..end, "[REDACTED]");
            search_from = start + "[REDACTED]".len();
        }
    }

    scrubbed
}

/// Sanitize API error text by scrubbing secrets and truncating length.
pub fn sanitize_api_error(input: &str) -> String {
    let scrubbed = scrub_secret_patterns(input);

    if scrubbed.chars().count() <= MAX_API_ERROR_CHARS {
        return scrubbed;
    }

    let mut end = MAX_API_ERROR_CHARS;
    while end > 0 && !scrubbed.is_char_boundary(end) {
        end -= 1;
    }

    format!("{}...", &scrubbed[..end])
}

/// Build a sanitized provider error from a failed HTTP response.
pub async fn api_error(provider: &str, response: reqwest::Response) -> anyhow::Error {
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<failed to read provider error body>".to_string());
    let sanitized = sanitize_api_error(&body);
    anyhow::anyhow!("{provider} API error ({status}): {sanitized}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factories_build_from_default_config() {
        let config = BedrockConfig::default();
        assert_eq!(create_model_provider(&config).name(), "bedrock-runtime");
        assert_eq!(
            create_knowledge_provider(&config).name(),
            "knowledge_base"
        );
    }

    // ── API error sanitization ───────────────────────────────

    #[test]
    fn sanitize_scrubs_aws_access_key_id() {
        let input = "InvalidSignature for key AKIAQ7F3FZGCEXAMPLE";
        let out = sanitize_api_error(input);
        assert!(!out.contains("AKIAQ7F3FZGCEXAMPLE"));
        assert!(out.contains("[REDACTED]"));
    }

    #[test]
    fn sanitize_scrubs_multiple_prefixes() {
        let input = "keys sk-abcdef AKIA12345 ASIA67890";
        let out = sanitize_api_error(input);
        assert!(!out.contains("sk-abcdef"));
        assert!(!out.contains("AKIA12345"));
        assert!(!out.contains("ASIA67890"));
    }

    #[test]
    fn sanitize_truncates_long_error() {
        let long = "a".repeat(400);
        let result = sanitize_api_error(&long);
        assert!(result.len() <= 203);
        assert!(result.ends_with("..."));
    }

    #[test]
    fn sanitize_no_secret_no_change() {
        let input = "simple upstream timeout";
        let result = sanitize_api_error(input);
        assert_eq!(result, input);
    }

    #[test]
    fn scrub_bare_prefix_without_token_is_kept() {
        let input = "the sk- prefix alone";
        let result = scrub_secret_patterns(input);
        assert_eq!(result, input);
    }
}
