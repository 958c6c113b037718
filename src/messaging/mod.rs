//! SMS messaging subsystem.
//!
//! Factory pattern over [`Messenger`] implementations; the active provider
//! is selected by its canonical string key in `[messaging]` config.

pub mod devedge;
pub mod traits;
pub mod twilio;

pub use traits::{DeliveryReceipt, Messenger};
pub use twilio::twiml_reply;

use crate::config::MessagingConfig;

/// Factory: create the configured messenger.
pub fn create_messenger(config: &MessagingConfig) -> anyhow::Result<Box<dyn Messenger>> {
    match config.provider.as_str() {
        "twilio" => Ok(Box::new(twilio::TwilioMessenger::new(&config.twilio))),
        "devedge" => Ok(Box::new(devedge::DevEdgeMessenger::new(&config.devedge))),
        other => anyhow::bail!(
            "Unknown messaging provider: {other}. Supported: \"twilio\", \"devedge\"."
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory_twilio() {
        let config = MessagingConfig::default();
        let messenger = create_messenger(&config).unwrap();
        assert_eq!(messenger.name(), "twilio");
    }

    #[test]
    fn factory_devedge() {
        let config = MessagingConfig {
            provider: "devedge".into(),
            ..MessagingConfig::default()
        };
        assert_eq!(create_messenger(&config).unwrap().name(), "devedge");
    }

    #[test]
    fn factory_unknown_provider_errors() {
        let config = MessagingConfig {
            provider: "carrier-pigeon".into(),
            ..MessagingConfig::default()
        };
        let err = create_messenger(&config).err().unwrap().to_string();
        assert!(err.contains("Unknown messaging provider"));
    }
}
