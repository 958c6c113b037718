pub mod schema;

pub use schema::{
    BedrockConfig, Config, FirestoreConfig, GatewayConfig, MessagingConfig, RouterConfig,
    ZoomConfig,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reexported_config_default_is_constructible() {
        let config = Config::default();

        assert_eq!(config.gateway.port, 8080);
        assert!(!config.bedrock.model_id.is_empty());
        assert!(config.router.extra_keywords.is_empty());
    }
}
