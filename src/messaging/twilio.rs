//! Twilio SMS adapter and TwiML reply rendering.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::warn;

use super::traits::{DeliveryReceipt, Messenger};
use crate::config::schema::TwilioConfig;
use crate::providers::{api_error, build_http_client};

/// Sends SMS through the Twilio Messages API (form-encoded, basic auth).
pub struct TwilioMessenger {
    api_url: String,
    account_sid: String,
    auth_token: Option<String>,
    from_number: String,
    client: Client,
}

impl TwilioMessenger {
    pub fn new(config: &TwilioConfig) -> Self {
        let auth_token = config.resolve_auth_token();
        if config.account_sid.is_empty() || auth_token.is_none() {
            warn!("Twilio credentials incomplete; sends will be rejected upstream");
        }
        Self {
            api_url: config.api_url.trim_end_matches('/').to_string(),
            account_sid: config.account_sid.clone(),
            auth_token,
            from_number: config.from_number.clone(),
            client: build_http_client(),
        }
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.api_url, self.account_sid
        )
    }
}

#[derive(Debug, Deserialize)]
struct TwilioMessageResponse {
    sid: String,
    #[serde(default)]
    status: Option<String>,
}

#[async_trait]
impl Messenger for TwilioMessenger {
    async fn send(&self, to: &str, body: &str) -> Result<DeliveryReceipt> {
        let params = [("To", to), ("From", self.from_number.as_str()), ("Body", body)];

        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.account_sid, self.auth_token.as_deref())
            .form(&params)
            .send()
            .await
            .context("failed to reach Twilio")?;

        if !response.status().is_success() {
            return Err(api_error("twilio", response).await);
        }

        let message: TwilioMessageResponse = response
            .json()
            .await
            .context("failed to decode Twilio response")?;
        Ok(DeliveryReceipt {
            id: message.sid,
            status: message.status,
        })
    }

    fn name(&self) -> &str {
        "twilio"
    }
}

// ── TwiML ────────────────────────────────────────────────────────

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Render the TwiML document Twilio expects back from an SMS webhook.
pub fn twiml_reply(message: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response><Message>{}</Message></Response>",
        escape_xml(message)
    )
}
