//! Configuration schema and persistence.
//!
//! All collaborator credentials are injected here (config file first, then
//! environment) and never appear as literals anywhere else in the crate.

use anyhow::{Context, Result};
use directories::UserDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::fs;

/// Read an environment variable, treating unset and blank values the same.
fn env_nonempty(name: &str) -> Option<String> {
    match std::env::var(name) {
        Ok(value) => {
            let value = value.trim();
            if value.is_empty() {
                None
            } else {
                Some(value.to_string())
            }
        }
        Err(_) => None,
    }
}

/// Pick the first non-empty credential: explicit config value, then env vars.
fn resolve_credential(configured: Option<&str>, env_vars: &[&str]) -> Option<String> {
    if let Some(raw) = configured {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return Some(trimmed.to_owned());
        }
    }
    env_vars.iter().find_map(|name| env_nonempty(name))
}

// ── Top-level config ──────────────────────────────────────────────

/// Top-level CareConnect configuration, loaded from `config.toml`.
///
/// Resolution order: explicit `--config-dir` flag → `CARECONNECT_CONFIG_DIR`
/// env → `~/.careconnect/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Path to config.toml - computed at load time, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Gateway server configuration (`[gateway]`).
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Prompt router configuration (`[router]`).
    #[serde(default)]
    pub router: RouterConfig,

    /// Bedrock model inference and knowledge retrieval (`[bedrock]`).
    #[serde(default)]
    pub bedrock: BedrockConfig,

    /// SMS messaging provider configuration (`[messaging]`).
    #[serde(default)]
    pub messaging: MessagingConfig,

    /// Zoom meeting configuration (`[zoom]`).
    #[serde(default)]
    pub zoom: ZoomConfig,

    /// Firestore report store configuration (`[firestore]`).
    #[serde(default)]
    pub firestore: FirestoreConfig,
}

impl Config {
    /// Resolve the configuration directory.
    pub fn config_dir(override_dir: Option<&str>) -> Result<PathBuf> {
        if let Some(dir) = override_dir {
            return Ok(PathBuf::from(dir));
        }
        if let Some(dir) = env_nonempty("CARECONNECT_CONFIG_DIR") {
            return Ok(PathBuf::from(dir));
        }
        let user_dirs = UserDirs::new().context("could not determine home directory")?;
        Ok(user_dirs.home_dir().join(".careconnect"))
    }

    /// Load configuration from disk, falling back to defaults when the file
    /// does not exist yet.
    pub async fn load(override_dir: Option<&str>) -> Result<Self> {
        let path = Self::config_dir(override_dir)?.join("config.toml");

        let mut config = if path.exists() {
            let raw = fs::read_to_string(&path)
                .await
                .with_context(|| format!("failed to read {}", path.display()))?;
            toml::from_str(&raw)
                .with_context(|| format!("invalid config at {}", path.display()))?
        } else {
            Self::default()
        };

        config.config_path = path;
        Ok(config)
    }

    /// Serialize to TOML with credential fields masked, for display.
    pub fn to_masked_toml(&self) -> Result<String> {
        let raw = toml::to_string_pretty(self).context("failed to serialize config")?;
        Ok(mask_sensitive_fields(&raw))
    }

    /// Persist the configuration to its config.toml path.
    pub async fn save(&self) -> Result<()> {
        let dir = self
            .config_path
            .parent()
            .context("config path has no parent directory")?;
        fs::create_dir_all(dir)
            .await
            .with_context(|| format!("failed to create {}", dir.display()))?;

        let raw = toml::to_string_pretty(self).context("failed to serialize config")?;
        fs::write(&self.config_path, raw)
            .await
            .with_context(|| format!("failed to write {}", self.config_path.display()))?;
        Ok(())
    }
}

/// Mask credential values in serialized TOML before echoing it anywhere.
fn mask_sensitive_fields(toml_str: &str) -> String {
    let mut output = String::with_capacity(toml_str.len());
    for line in toml_str.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("api_key")
            || trimmed.starts_with("auth_token")
            || trimmed.starts_with("access_token")
            || trimmed.starts_with("client_secret")
        {
            if let Some(eq_pos) = line.find('=') {
                output.push_str(&line[..=eq_pos]);
                output.push_str(" \"***MASKED***\"");
            } else {
                output.push_str(line);
            }
        } else {
            output.push_str(line);
        }
        output.push('\n');
    }
    output
}

// ── Gateway ──────────────────────────────────────────────────────

/// Gateway server configuration (`[gateway]` section).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Gateway port (default: 8080)
    #[serde(default = "default_gateway_port")]
    pub port: u16,
    /// Gateway host (default: 127.0.0.1)
    #[serde(default = "default_gateway_host")]
    pub host: String,
    /// Static bearer token required on `/api/*` routes. None = open gateway.
    #[serde(default)]
    pub auth_token: Option<String>,
    /// Maximum accepted request body, in bytes (default: 64 KiB).
    #[serde(default = "default_gateway_body_limit")]
    pub max_body_bytes: usize,
    /// Per-request timeout in seconds (default: 30).
    #[serde(default = "default_gateway_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_gateway_port() -> u16 {
    8080
}

fn default_gateway_host() -> String {
    "127.0.0.1".into()
}

fn default_gateway_body_limit() -> usize {
    64 * 1024
}

fn default_gateway_timeout_secs() -> u64 {
    30
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_gateway_port(),
            host: default_gateway_host(),
            auth_token: None,
            max_body_bytes: default_gateway_body_limit(),
            request_timeout_secs: default_gateway_timeout_secs(),
        }
    }
}

// ── Router ───────────────────────────────────────────────────────

/// Prompt router configuration (`[router]` section).
///
/// The built-in keyword set is fixed; deployments may only append to it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Extra knowledge keywords appended to the built-in set.
    #[serde(default)]
    pub extra_keywords: Vec<String>,
}

// ── Bedrock ──────────────────────────────────────────────────────

/// Bedrock configuration (`[bedrock]` section).
///
/// Covers both the runtime (model inference) and agent-runtime (knowledge
/// retrieval) endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BedrockConfig {
    /// AWS region the endpoints live in (default: us-east-1)
    #[serde(default = "default_bedrock_region")]
    pub region: String,
    /// Bearer API key. Overridden by `AWS_BEDROCK_API_KEY` or `AWS_BEARER_TOKEN_BEDROCK`.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Model id invoked for general conversation.
    #[serde(default = "default_bedrock_model_id")]
    pub model_id: String,
    /// Maximum tokens requested per completion (default: 1000).
    #[serde(default = "default_bedrock_max_tokens")]
    pub max_tokens: u32,
    /// Knowledge base id queried for health topics.
    #[serde(default)]
    pub knowledge_base_id: String,
    /// Model ARN the knowledge base generates with.
    #[serde(default)]
    pub knowledge_model_arn: String,
    /// Endpoint override for the runtime API (tests, private endpoints).
    #[serde(default)]
    pub runtime_url: Option<String>,
    /// Endpoint override for the agent-runtime API.
    #[serde(default)]
    pub agent_runtime_url: Option<String>,
}

fn default_bedrock_region() -> String {
    "us-east-1".into()
}

fn default_bedrock_model_id() -> String {
    "us.anthropic.claude-3-5-haiku-20241022-v1:0".into()
}

fn default_bedrock_max_tokens() -> u32 {
    1000
}

impl Default for BedrockConfig {
    fn default() -> Self {
        Self {
            region: default_bedrock_region(),
            api_key: None,
            model_id: default_bedrock_model_id(),
            max_tokens: default_bedrock_max_tokens(),
            knowledge_base_id: String::new(),
            knowledge_model_arn: String::new(),
            runtime_url: None,
            agent_runtime_url: None,
        }
    }
}

impl BedrockConfig {
    /// Runtime API base URL, derived from the region unless overridden.
    pub fn runtime_url(&self) -> String {
        self.runtime_url
            .clone()
            .unwrap_or_else(|| format!("https://bedrock-runtime.{}.amazonaws.com", self.region))
    }

    /// Agent-runtime API base URL, derived from the region unless overridden.
    pub fn agent_runtime_url(&self) -> String {
        self.agent_runtime_url.clone().unwrap_or_else(|| {
            format!("https://bedrock-agent-runtime.{}.amazonaws.com", self.region)
        })
    }

    /// API key: config value first, then environment.
    pub fn resolve_api_key(&self) -> Option<String> {
        resolve_credential(
            self.api_key.as_deref(),
            &["AWS_BEDROCK_API_KEY", "AWS_BEARER_TOKEN_BEDROCK"],
        )
    }
}

// ── Messaging ────────────────────────────────────────────────────

/// SMS messaging configuration (`[messaging]` section).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagingConfig {
    /// Active provider: `"twilio"` or `"devedge"` (default: twilio).
    #[serde(default = "default_messaging_provider")]
    pub provider: String,
    /// Body of the canned TwiML reply returned to inbound SMS webhooks.
    #[serde(default = "default_reply_text")]
    pub reply_text: String,
    /// Fallback destination when a send request omits `to`.
    #[serde(default)]
    pub default_to: Option<String>,
    /// Twilio credentials and numbers (`[messaging.twilio]`).
    #[serde(default)]
    pub twilio: TwilioConfig,
    /// T-Mobile DevEdge credentials (`[messaging.devedge]`).
    #[serde(default)]
    pub devedge: DevEdgeConfig,
}

fn default_messaging_provider() -> String {
    "twilio".into()
}

fn default_reply_text() -> String {
    "The Robots are coming! Head for the hills!".into()
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            provider: default_messaging_provider(),
            reply_text: default_reply_text(),
            default_to: None,
            twilio: TwilioConfig::default(),
            devedge: DevEdgeConfig::default(),
        }
    }
}

/// Twilio account configuration (`[messaging.twilio]`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwilioConfig {
    /// Account SID (the `AC…` identifier).
    #[serde(default)]
    pub account_sid: String,
    /// Auth token. Overridden by `TWILIO_AUTH_TOKEN`.
    #[serde(default)]
    pub auth_token: Option<String>,
    /// E.164 number messages are sent from.
    #[serde(default)]
    pub from_number: String,
    /// API base override (default: https://api.twilio.com).
    #[serde(default = "default_twilio_api_url")]
    pub api_url: String,
}

fn default_twilio_api_url() -> String {
    "https://api.twilio.com".into()
}

impl Default for TwilioConfig {
    fn default() -> Self {
        Self {
            account_sid: String::new(),
            auth_token: None,
            from_number: String::new(),
            api_url: default_twilio_api_url(),
        }
    }
}

impl TwilioConfig {
    /// Auth token: config value first, then `TWILIO_AUTH_TOKEN`.
    pub fn resolve_auth_token(&self) -> Option<String> {
        resolve_credential(self.auth_token.as_deref(), &["TWILIO_AUTH_TOKEN"])
    }
}

/// T-Mobile DevEdge SMS configuration (`[messaging.devedge]`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DevEdgeConfig {
    /// Messages endpoint.
    #[serde(default = "default_devedge_api_url")]
    pub api_url: String,
    /// OAuth access token. Overridden by `DEVEDGE_ACCESS_TOKEN`.
    #[serde(default)]
    pub access_token: Option<String>,
}

fn default_devedge_api_url() -> String {
    "https://api.devedge.t-mobile.com/sms/v1/messages".into()
}

impl Default for DevEdgeConfig {
    fn default() -> Self {
        Self {
            api_url: default_devedge_api_url(),
            access_token: None,
        }
    }
}

impl DevEdgeConfig {
    /// Access token: config value first, then `DEVEDGE_ACCESS_TOKEN`.
    pub fn resolve_access_token(&self) -> Option<String> {
        resolve_credential(self.access_token.as_deref(), &["DEVEDGE_ACCESS_TOKEN"])
    }
}

// ── Zoom ─────────────────────────────────────────────────────────

/// Zoom server-to-server OAuth app configuration (`[zoom]` section).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoomConfig {
    /// OAuth client id.
    #[serde(default)]
    pub client_id: String,
    /// OAuth client secret. Overridden by `ZOOM_CLIENT_SECRET`.
    #[serde(default)]
    pub client_secret: Option<String>,
    /// Zoom account id for the `account_credentials` grant.
    #[serde(default)]
    pub account_id: String,
    /// Token endpoint (default: https://zoom.us/oauth/token).
    #[serde(default = "default_zoom_oauth_url")]
    pub oauth_url: String,
    /// REST API base (default: https://api.zoom.us/v2).
    #[serde(default = "default_zoom_api_url")]
    pub api_url: String,
    /// Default meeting topic.
    #[serde(default = "default_zoom_topic")]
    pub topic: String,
    /// Default meeting length in minutes (default: 30).
    #[serde(default = "default_zoom_duration")]
    pub duration_minutes: u32,
    /// Meeting timezone (default: America/Chicago).
    #[serde(default = "default_zoom_timezone")]
    pub timezone: String,
}

fn default_zoom_oauth_url() -> String {
    "https://zoom.us/oauth/token".into()
}

fn default_zoom_api_url() -> String {
    "https://api.zoom.us/v2".into()
}

fn default_zoom_topic() -> String {
    "CareConnect Video Consultation".into()
}

fn default_zoom_duration() -> u32 {
    30
}

fn default_zoom_timezone() -> String {
    "America/Chicago".into()
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: None,
            account_id: String::new(),
            oauth_url: default_zoom_oauth_url(),
            api_url: default_zoom_api_url(),
            topic: default_zoom_topic(),
            duration_minutes: default_zoom_duration(),
            timezone: default_zoom_timezone(),
        }
    }
}

impl ZoomConfig {
    /// Client secret: config value first, then `ZOOM_CLIENT_SECRET`.
    pub fn resolve_client_secret(&self) -> Option<String> {
        resolve_credential(self.client_secret.as_deref(), &["ZOOM_CLIENT_SECRET"])
    }
}

// ── Firestore ────────────────────────────────────────────────────

/// Firestore report store configuration (`[firestore]` section).
///
/// When `project_id` is empty the gateway falls back to the in-memory store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirestoreConfig {
    /// GCP project id. Empty = use the in-memory store.
    #[serde(default)]
    pub project_id: String,
    /// OAuth access token (e.g. `gcloud auth print-access-token`).
    /// Overridden by `FIRESTORE_ACCESS_TOKEN`.
    #[serde(default)]
    pub access_token: Option<String>,
    /// REST API base (default: https://firestore.googleapis.com/v1).
    #[serde(default = "default_firestore_base_url")]
    pub base_url: String,
    /// Collection the reports live in (default: reports).
    #[serde(default = "default_firestore_collection")]
    pub collection: String,
}

fn default_firestore_base_url() -> String {
    "https://firestore.googleapis.com/v1".into()
}

fn default_firestore_collection() -> String {
    "reports".into()
}

impl Default for FirestoreConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            access_token: None,
            base_url: default_firestore_base_url(),
            collection: default_firestore_collection(),
        }
    }
}

impl FirestoreConfig {
    /// Access token: config value first, then `FIRESTORE_ACCESS_TOKEN`.
    pub fn resolve_access_token(&self) -> Option<String> {
        resolve_credential(self.access_token.as_deref(), &["FIRESTORE_ACCESS_TOKEN"])
    }
}
