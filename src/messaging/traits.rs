//! Messaging provider trait and receipt type.

use anyhow::Result;
use async_trait::async_trait;

/// Provider acknowledgement for one sent message.
#[derive(Debug, Clone)]
pub struct DeliveryReceipt {
    /// Provider-assigned delivery identifier (Twilio message SID, etc.).
    pub id: String,
    /// Provider-reported delivery status, when the API returns one.
    pub status: Option<String>,
}

/// An SMS provider: takes a destination and a body, returns a delivery
/// identifier or an error.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Send one message.
    async fn send(&self, to: &str, body: &str) -> Result<DeliveryReceipt>;

    /// The name of this messenger implementation.
    fn name(&self) -> &str;
}
