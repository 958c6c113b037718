//! Zoom meeting adapter.
//!
//! Server-to-server OAuth (`account_credentials` grant), then
//! first-active-user lookup, then meeting creation. Tokens are fetched per
//! call; Zoom tokens are short-lived and the gateway creates meetings
//! rarely.

use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::traits::{Meeting, MeetingProvider};
use crate::config::ZoomConfig;
use crate::providers::{api_error, build_http_client};

/// Scheduled meeting, in Zoom's `type` enum.
const MEETING_TYPE_SCHEDULED: u8 = 2;

pub struct ZoomMeetings {
    client_id: String,
    client_secret: Option<String>,
    account_id: String,
    oauth_url: String,
    api_url: String,
    timezone: String,
    client: Client,
}

impl ZoomMeetings {
    pub fn new(config: &ZoomConfig) -> Self {
        let client_secret = config.resolve_client_secret();
        if config.client_id.is_empty() || client_secret.is_none() {
            warn!("Zoom credentials incomplete; meeting creation will fail");
        }
        Self {
            client_id: config.client_id.clone(),
            client_secret,
            account_id: config.account_id.clone(),
            oauth_url: config.oauth_url.clone(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            timezone: config.timezone.clone(),
            client: build_http_client(),
        }
    }

    fn basic_auth_header(&self) -> String {
        let secret = self.client_secret.as_deref().unwrap_or_default();
        let raw = format!("{}:{}", self.client_id, secret);
        format!(
            "Basic {}",
            base64::engine::general_purpose::STANDARD.encode(raw)
        )
    }

    /// OAuth token via the `account_credentials` grant.
    async fn access_token(&self) -> Result<String> {
        let params = [
            ("grant_type", "account_credentials"),
            ("account_id", self.account_id.as_str()),
        ];

        let response = self
            .client
            .post(&self.oauth_url)
            .header(reqwest::header::AUTHORIZATION, self.basic_auth_header())
            .form(&params)
            .send()
            .await
            .context("failed to reach Zoom OAuth endpoint")?;

        if !response.status().is_success() {
            return Err(api_error("zoom-oauth", response).await);
        }

        let token: TokenResponse = response
            .json()
            .await
            .context("failed to decode Zoom token response")?;
        Ok(token.access_token)
    }

    /// First active user on the account; meetings are created under them.
    async fn first_active_user(&self, token: &str) -> Result<String> {
        let url = format!("{}/users?status=active&page_size=1", self.api_url);
        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .context("failed to reach Zoom users API")?;

        if !response.status().is_success() {
            return Err(api_error("zoom", response).await);
        }

        let users: UsersResponse = response
            .json()
            .await
            .context("failed to decode Zoom users response")?;
        users
            .users
            .into_iter()
            .next()
            .map(|user| user.id)
            .context("no active Zoom users found")
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct UsersResponse {
    #[serde(default)]
    users: Vec<ZoomUser>,
}

#[derive(Debug, Deserialize)]
struct ZoomUser {
    id: String,
}

#[derive(Debug, Serialize)]
struct CreateMeetingRequest<'a> {
    topic: &'a str,
    #[serde(rename = "type")]
    kind: u8,
    duration: u32,
    timezone: &'a str,
    settings: MeetingSettings,
}

#[derive(Debug, Serialize)]
struct MeetingSettings {
    host_video: bool,
    participant_video: bool,
    join_before_host: bool,
    waiting_room: bool,
}

#[derive(Debug, Deserialize)]
struct CreateMeetingResponse {
    id: u64,
    join_url: String,
    #[serde(default)]
    topic: String,
}

#[async_trait]
impl MeetingProvider for ZoomMeetings {
    async fn create_meeting(&self, topic: &str, duration_minutes: u32) -> Result<Meeting> {
        let token = self.access_token().await?;
        let user_id = self.first_active_user(&token).await?;

        let body = CreateMeetingRequest {
            topic,
            kind: MEETING_TYPE_SCHEDULED,
            duration: duration_minutes,
            timezone: &self.timezone,
            settings: MeetingSettings {
                host_video: true,
                participant_video: true,
                join_before_host: true,
                waiting_room: false,
            },
        };

        let url = format!("{}/users/{}/meetings", self.api_url, user_id);
        let response = self
            .client
            .post(url)
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await
            .context("failed to reach Zoom meetings API")?;

        if !response.status().is_success() {
            return Err(api_error("zoom", response).await);
        }

        let created: CreateMeetingResponse = response
            .json()
            .await
            .context("failed to decode Zoom meeting response")?;
        info!(meeting_id = created.id, "Zoom meeting created");

        Ok(Meeting {
            id: created.id,
            join_url: created.join_url,
            topic: if created.topic.is_empty() {
                topic.to_string()
            } else {
                created.topic
            },
        })
    }

    fn name(&self) -> &str {
        "zoom"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_auth_header_is_base64_of_id_and_secret() {
        let zoom = ZoomMeetings::new(&ZoomConfig {
            client_id: "id".into(),
            client_secret: Some("secret".into()),
            ..ZoomConfig::default()
        });
        // "id:secret"
        assert_eq!(zoom.basic_auth_header(), "Basic aWQ6c2VjcmV0");
    }

    #[test]
    fn meeting_request_matches_zoom_wire_format() {
        let body = CreateMeetingRequest {
            topic: "CareConnect Video Consultation",
            kind: MEETING_TYPE_SCHEDULED,
            duration: 30,
            timezone: "America/Chicago",
            settings: MeetingSettings {
                host_video: true,
                participant_video: true,
                join_before_host: true,
                waiting_room: false,
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["type"], 2);
        assert_eq!(json["duration"], 30);
        assert_eq!(json["settings"]["waiting_room"], false);
        assert_eq!(json["settings"]["join_before_host"], true);
    }

    #[test]
    fn meeting_response_parses_join_url() {
        let raw = r#"{"id":123456789,"join_url":"https://zoom.us/j/123456789","topic":"t"}"#;
        let parsed: CreateMeetingResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.id, 123_456_789);
        assert_eq!(parsed.join_url, "https://zoom.us/j/123456789");
    }
}
