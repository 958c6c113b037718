//! Meeting provider trait and meeting type.

use anyhow::Result;
use async_trait::async_trait;

/// A created meeting, ready to join.
#[derive(Debug, Clone)]
pub struct Meeting {
    /// Provider-assigned meeting id.
    pub id: u64,
    /// URL participants join through.
    pub join_url: String,
    /// Topic the meeting was created with.
    pub topic: String,
}

/// A video-conferencing provider: exchanges credentials for a token, then
/// creates joinable meetings.
#[async_trait]
pub trait MeetingProvider: Send + Sync {
    /// Create a meeting and return its join URL.
    async fn create_meeting(&self, topic: &str, duration_minutes: u32) -> Result<Meeting>;

    /// The name of this provider implementation.
    fn name(&self) -> &str;
}
