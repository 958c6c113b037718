//! T-Mobile DevEdge SMS adapter (bearer token, JSON payload).

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::warn;

use super::traits::{DeliveryReceipt, Messenger};
use crate::config::schema::DevEdgeConfig;
use crate::providers::{api_error, build_http_client};

pub struct DevEdgeMessenger {
    api_url: String,
    access_token: Option<String>,
    client: Client,
}

impl DevEdgeMessenger {
    pub fn new(config: &DevEdgeConfig) -> Self {
        let access_token = config.resolve_access_token();
        if access_token.is_none() {
            warn!("no DevEdge access token configured; sends will be rejected upstream");
        }
        Self {
            api_url: config.api_url.clone(),
            access_token,
            client: build_http_client(),
        }
    }
}

#[derive(Debug, Serialize)]
struct DevEdgeRequest<'a> {
    to: &'a str,
    message: &'a str,
}

fn delivery_id(body: &serde_json::Value) -> Option<String> {
    ["messageId", "requestId", "id"]
        .iter()
        .find_map(|key| body.get(*key))
        .and_then(|v| v.as_str())
        .map(ToString::to_string)
}

#[async_trait]
impl Messenger for DevEdgeMessenger {
    async fn send(&self, to: &str, body: &str) -> Result<DeliveryReceipt> {
        let payload = DevEdgeRequest { to, message: body };

        let mut request = self.client.post(&self.api_url).json(&payload);
        if let Some(ref token) = self.access_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.context("failed to reach DevEdge")?;
        if !response.status().is_success() {
            return Err(api_error("devedge", response).await);
        }

        let parsed: serde_json::Value = response
            .json()
            .await
            .context("failed to decode DevEdge response")?;
        let id = delivery_id(&parsed).context("no delivery identifier in DevEdge response")?;
        let status = parsed
            .get("status")
            .and_then(|v| v.as_str())
            .map(ToString::to_string);

        Ok(DeliveryReceipt { id, status })
    }

    fn name(&self) -> &str {
        "devedge"
    }
}
