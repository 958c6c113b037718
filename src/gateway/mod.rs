//! HTTP gateway: JSON endpoints over the routed AI backends and care-team
//! collaborators.

pub mod api;
pub mod error;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::routing::{get, post};
use axum::Router;
use parking_lot::Mutex;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tracing::info;

use crate::config::Config;
use crate::meetings::{self, MeetingProvider};
use crate::messaging::{self, Messenger};
use crate::providers::{self, KnowledgeProvider, ModelProvider};
use crate::routing::{self, PromptRouter};
use crate::store::{self, DocumentStore};

/// Shared server state accessible from all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Mutex<Config>>,
    pub router: Arc<PromptRouter>,
    pub model: Arc<dyn ModelProvider>,
    pub knowledge: Arc<dyn KnowledgeProvider>,
    pub messenger: Arc<dyn Messenger>,
    pub meetings: Arc<dyn MeetingProvider>,
    pub store: Arc<dyn DocumentStore>,
}

impl AppState {
    /// Wire every collaborator adapter up from config.
    pub fn from_config(config: Config) -> Result<Self> {
        let router = Arc::new(routing::create_router(&config.router));
        let model: Arc<dyn ModelProvider> =
            Arc::from(providers::create_model_provider(&config.bedrock));
        let knowledge: Arc<dyn KnowledgeProvider> =
            Arc::from(providers::create_knowledge_provider(&config.bedrock));
        let messenger: Arc<dyn Messenger> =
            Arc::from(messaging::create_messenger(&config.messaging)?);
        let meetings: Arc<dyn MeetingProvider> =
            Arc::from(meetings::create_meeting_provider(&config.zoom));
        let store: Arc<dyn DocumentStore> = Arc::from(store::create_store(&config.firestore));

        Ok(Self {
            config: Arc::new(Mutex::new(config)),
            router,
            model,
            knowledge,
            messenger,
            meetings,
            store,
        })
    }
}

/// Build the axum application for the given state.
pub fn build_app(state: AppState, max_body_bytes: usize, request_timeout: Duration) -> Router {
    Router::new()
        .route("/api/health", get(api::handle_health))
        .route("/api/chat", post(api::handle_chat))
        .route("/api/knowledge-query", post(api::handle_knowledge_query))
        .route("/api/unified-chat", post(api::handle_unified_chat))
        .route("/api/test", get(api::handle_test))
        .route("/api/send-message", post(api::handle_send_message))
        .route("/reply_sms", post(api::handle_reply_sms))
        .route("/api/meetings", post(api::handle_create_meeting))
        .route("/api/vitals", get(api::handle_vitals))
        .route(
            "/api/reports",
            get(api::handle_reports_list).post(api::handle_reports_create),
        )
        .route("/api/reports/{report_id}/pdf", get(api::handle_report_pdf))
        .route("/api/process-text", post(api::handle_process_text))
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(request_timeout))
        .with_state(state)
}

/// Run the gateway until ctrl-c.
pub async fn run(config: Config) -> Result<()> {
    let bind_addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    let max_body_bytes = config.gateway.max_body_bytes;
    let request_timeout = Duration::from_secs(config.gateway.request_timeout_secs);

    let state = AppState::from_config(config)?;
    let app = build_app(state, max_body_bytes, request_timeout);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    info!("gateway listening on {bind_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("gateway server error")?;
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_state_builds_from_default_config() {
        let state = AppState::from_config(Config::default()).unwrap();
        assert_eq!(state.model.name(), "bedrock-runtime");
        assert_eq!(state.knowledge.name(), "knowledge_base");
        assert_eq!(state.messenger.name(), "twilio");
        assert_eq!(state.meetings.name(), "zoom");
        assert_eq!(state.store.name(), "memory");
    }

    #[test]
    fn app_builds_with_default_limits() {
        let state = AppState::from_config(Config::default()).unwrap();
        let _app = build_app(state, 64 * 1024, Duration::from_secs(30));
    }
}
