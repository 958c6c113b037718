//! Prompt routing — decides which backend answers a prompt.
//!
//! The only decision logic owned by this crate: a prompt that mentions a
//! health/medical topic goes to the knowledge base, everything else goes to
//! the conversational model.

pub mod classifier;
pub mod keywords;

pub use classifier::{PromptRouter, RouteDecision, RouteTag};
pub use keywords::KeywordSet;

use crate::config::RouterConfig;

/// Create a router from config: the built-in keyword set plus any
/// deployment-specific extras.
pub fn create_router(config: &RouterConfig) -> PromptRouter {
    let keywords = KeywordSet::builtin().extend(&config.extra_keywords);
    PromptRouter::new(keywords)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_router_includes_config_extras() {
        let config = RouterConfig {
            extra_keywords: vec!["Physiotherapy".into()],
        };
        let router = create_router(&config);
        assert_eq!(
            router.classify("when is physiotherapy useful?").tag,
            RouteTag::Knowledge
        );
    }
}
