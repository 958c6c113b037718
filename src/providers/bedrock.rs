//! Bedrock REST adapters: model inference (runtime API) and knowledge
//! retrieval (agent-runtime API).
//!
//! Both speak plain HTTPS with bearer API keys; credential minting and
//! rotation are external concerns.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{api_error, build_http_client};
use super::traits::{KnowledgeProvider, ModelProvider};
use crate::config::BedrockConfig;

const ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";

// ── Model inference (bedrock-runtime) ───────────────────────────

/// Invokes an Anthropic-format model through the Bedrock runtime API.
pub struct BedrockRuntime {
    base_url: String,
    model_id: String,
    max_tokens: u32,
    api_key: Option<String>,
    client: Client,
}

impl BedrockRuntime {
    pub fn new(config: &BedrockConfig) -> Self {
        let api_key = config.resolve_api_key();
        if api_key.is_none() {
            warn!("no Bedrock API key configured; model calls will be unauthenticated");
        }
        Self {
            base_url: config.runtime_url().trim_end_matches('/').to_string(),
            model_id: config.model_id.clone(),
            max_tokens: config.max_tokens,
            api_key,
            client: build_http_client(),
        }
    }

    fn invoke_url(&self) -> String {
        format!("{}/model/{}/invoke", self.base_url, self.model_id)
    }
}

#[derive(Debug, Serialize)]
struct InvokeRequest<'a> {
    anthropic_version: &'static str,
    max_tokens: u32,
    messages: Vec<InvokeMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct InvokeMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct InvokeResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

#[async_trait]
impl ModelProvider for BedrockRuntime {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let body = InvokeRequest {
            anthropic_version: ANTHROPIC_VERSION,
            max_tokens: self.max_tokens,
            messages: vec![InvokeMessage {
                role: "user",
                content: prompt,
            }],
        };

        let mut request = self.client.post(self.invoke_url()).json(&body);
        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .context("failed to reach Bedrock runtime")?;
        if !response.status().is_success() {
            return Err(api_error("bedrock-runtime", response).await);
        }

        let parsed: InvokeResponse = response
            .json()
            .await
            .context("failed to decode Bedrock runtime response")?;
        parsed
            .content
            .into_iter()
            .find_map(|block| block.text)
            .context("model response contained no text")
    }

    fn name(&self) -> &str {
        "bedrock-runtime"
    }
}

// ── Knowledge retrieval (bedrock-agent-runtime) ─────────────────

/// Queries a managed knowledge base through the agent-runtime
/// `retrieveAndGenerate` API.
pub struct BedrockKnowledgeBase {
    base_url: String,
    knowledge_base_id: String,
    model_arn: String,
    api_key: Option<String>,
    client: Client,
}

impl BedrockKnowledgeBase {
    pub fn new(config: &BedrockConfig) -> Self {
        if config.knowledge_base_id.is_empty() {
            warn!("no knowledge base id configured; knowledge queries will fail");
        }
        Self {
            base_url: config.agent_runtime_url().trim_end_matches('/').to_string(),
            knowledge_base_id: config.knowledge_base_id.clone(),
            model_arn: config.knowledge_model_arn.clone(),
            api_key: config.resolve_api_key(),
            client: build_http_client(),
        }
    }

    fn retrieve_url(&self) -> String {
        format!("{}/retrieveAndGenerate", self.base_url)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RetrieveRequest<'a> {
    input: RetrieveInput<'a>,
    retrieve_and_generate_configuration: RetrieveConfiguration<'a>,
}

#[derive(Debug, Serialize)]
struct RetrieveInput<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RetrieveConfiguration<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    knowledge_base_configuration: KnowledgeBaseConfiguration<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct KnowledgeBaseConfiguration<'a> {
    knowledge_base_id: &'a str,
    model_arn: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RetrieveResponse {
    #[serde(default)]
    output: Option<RetrieveOutput>,
    #[serde(default)]
    session_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RetrieveOutput {
    #[serde(default)]
    text: Option<String>,
}

#[async_trait]
impl KnowledgeProvider for BedrockKnowledgeBase {
    async fn retrieve_and_generate(&self, prompt: &str) -> Result<String> {
        anyhow::ensure!(
            !self.knowledge_base_id.is_empty(),
            "knowledge_base_id is not configured"
        );

        let body = RetrieveRequest {
            input: RetrieveInput { text: prompt },
            retrieve_and_generate_configuration: RetrieveConfiguration {
                kind: "KNOWLEDGE_BASE",
                knowledge_base_configuration: KnowledgeBaseConfiguration {
                    knowledge_base_id: &self.knowledge_base_id,
                    model_arn: &self.model_arn,
                },
            },
        };

        let mut request = self.client.post(self.retrieve_url()).json(&body);
        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .context("failed to reach Bedrock agent runtime")?;
        if !response.status().is_success() {
            return Err(api_error("bedrock-agent-runtime", response).await);
        }

        let parsed: RetrieveResponse = response
            .json()
            .await
            .context("failed to decode knowledge base response")?;
        if let Some(session_id) = parsed.session_id {
            debug!(session_id = %session_id, "knowledge base session");
        }

        parsed
            .output
            .and_then(|output| output.text)
            .context("no text found in knowledge base response")
    }

    fn name(&self) -> &str {
        "knowledge_base"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> BedrockConfig {
        BedrockConfig {
            runtime_url: Some("http://127.0.0.1:9001/".into()),
            agent_runtime_url: Some("http://127.0.0.1:9002".into()),
            knowledge_base_id: "KB123".into(),
            knowledge_model_arn: "arn:aws:bedrock:us-east-1:0:model/test".into(),
            ..BedrockConfig::default()
        }
    }

    #[test]
    fn invoke_url_strips_trailing_slash() {
        let provider = BedrockRuntime::new(&test_config());
        assert_eq!(
            provider.invoke_url(),
            "http://127.0.0.1:9001/model/us.anthropic.claude-3-5-haiku-20241022-v1:0/invoke"
        );
    }

    #[test]
    fn retrieve_url_appends_operation() {
        let provider = BedrockKnowledgeBase::new(&test_config());
        assert_eq!(
            provider.retrieve_url(),
            "http://127.0.0.1:9002/retrieveAndGenerate"
        );
    }

    #[test]
    fn invoke_request_uses_anthropic_wire_format() {
        let body = InvokeRequest {
            anthropic_version: ANTHROPIC_VERSION,
            max_tokens: 1000,
            messages: vec![InvokeMessage {
                role: "user",
                content: "hello",
            }],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["anthropic_version"], "bedrock-2023-05-31");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "hello");
    }

    #[test]
    fn retrieve_request_is_camel_cased() {
        let body = RetrieveRequest {
            input: RetrieveInput { text: "what is blood pressure?" },
            retrieve_and_generate_configuration: RetrieveConfiguration {
                kind: "KNOWLEDGE_BASE",
                knowledge_base_configuration: KnowledgeBaseConfiguration {
                    knowledge_base_id: "KB123",
                    model_arn: "arn:test",
                },
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["input"]["text"], "what is blood pressure?");
        let config = &json["retrieveAndGenerateConfiguration"];
        assert_eq!(config["type"], "KNOWLEDGE_BASE");
        assert_eq!(
            config["knowledgeBaseConfiguration"]["knowledgeBaseId"],
            "KB123"
        );
        assert_eq!(config["knowledgeBaseConfiguration"]["modelArn"], "arn:test");
    }

    #[test]
    fn invoke_response_text_extraction() {
        let raw = r#"{"content":[{"type":"text","text":"hi there"}]}"#;
        let parsed: InvokeResponse = serde_json::from_str(raw).unwrap();
        let text = parsed.content.into_iter().find_map(|b| b.text);
        assert_eq!(text.as_deref(), Some("hi there"));
    }

    #[test]
    fn retrieve_response_tolerates_missing_output() {
        let parsed: RetrieveResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.output.is_none());
        assert!(parsed.session_id.is_none());
    }
}
