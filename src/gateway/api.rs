//! REST API handlers.
//!
//! `/api/*` routes optionally require a static bearer token; the Twilio
//! webhook reply stays open since Twilio authenticates out of band.

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use super::error::ApiError;
use super::AppState;
use crate::meetings::MeetingProvider;
use crate::messaging::{twiml_reply, Messenger};
use crate::providers::{sanitize_api_error, KnowledgeProvider, ModelProvider};
use crate::render;
use crate::routing::RouteTag;
use crate::store::{DocumentStore, NewReport, Report};
use crate::vitals;

// ── Bearer token auth ───────────────────────────────────────────

/// Extract the bearer token from the Authorization header.
fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
}

/// Verify the configured gateway token, when one is set.
fn require_auth(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let expected = state.config.lock().gateway.auth_token.clone();
    let Some(expected) = expected else {
        return Ok(());
    };

    match extract_bearer_token(headers) {
        Some(token) if token == expected => Ok(()),
        _ => Err(ApiError::Unauthorized(
            "Unauthorized — send Authorization: Bearer <token>".into(),
        )),
    }
}

// ── Request bodies ──────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct PromptBody {
    #[serde(default)]
    prompt: String,
}

impl PromptBody {
    /// The prompt, rejected when missing or whitespace-only.
    fn required(&self) -> Result<&str, ApiError> {
        if self.prompt.trim().is_empty() {
            return Err(ApiError::InvalidInput("Prompt is required".into()));
        }
        Ok(&self.prompt)
    }
}

#[derive(Debug, Deserialize)]
pub struct SendMessageBody {
    #[serde(default)]
    to: Option<String>,
    #[serde(default = "default_message_body")]
    body: String,
}

fn default_message_body() -> String {
    "Default message".into()
}

#[derive(Debug, Deserialize)]
pub struct CreateMeetingBody {
    #[serde(default)]
    topic: Option<String>,
    #[serde(default)]
    duration_minutes: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct CreateReportBody {
    #[serde(default)]
    title: String,
    #[serde(default)]
    diagnosis: String,
    #[serde(default)]
    recommendations: String,
}

#[derive(Debug, Deserialize)]
pub struct ProcessTextBody {
    #[serde(default)]
    text: String,
    #[serde(default = "default_language")]
    language: String,
}

fn default_language() -> String {
    "en".into()
}

// ── Health ──────────────────────────────────────────────────────

/// GET /api/health — liveness and uptime.
pub async fn handle_health() -> Json<Value> {
    let health = crate::health::snapshot();
    Json(json!({
        "status": "healthy",
        "message": "CareConnect backend is running",
        "uptime_seconds": health.uptime_seconds,
    }))
}

// ── Chat ────────────────────────────────────────────────────────

/// POST /api/chat — general conversation through the model provider.
pub async fn handle_chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<PromptBody>,
) -> Result<Json<Value>, ApiError> {
    require_auth(&state, &headers)?;
    let prompt = body.required()?;

    let response = state.model.generate(prompt).await?;
    Ok(Json(json!({
        "response": response,
        "source": state.model.name(),
    })))
}

/// POST /api/knowledge-query — direct knowledge base retrieval.
pub async fn handle_knowledge_query(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<PromptBody>,
) -> Result<Json<Value>, ApiError> {
    require_auth(&state, &headers)?;
    let prompt = body.required()?;

    let response = state.knowledge.retrieve_and_generate(prompt).await?;
    Ok(Json(json!({
        "response": response,
        "source": state.knowledge.name(),
    })))
}

/// POST /api/unified-chat — route between the knowledge base and the model.
pub async fn handle_unified_chat(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<PromptBody>,
) -> Result<Json<Value>, ApiError> {
    require_auth(&state, &headers)?;
    let prompt = body.required()?;

    let decision = state.router.classify(prompt);
    info!(route = decision.tag.as_str(), "unified chat dispatched");

    let (response, source) = match decision.tag {
        RouteTag::Knowledge => (
            state.knowledge.retrieve_and_generate(prompt).await?,
            state.knowledge.name(),
        ),
        RouteTag::General => (state.model.generate(prompt).await?, state.model.name()),
    };

    Ok(Json(json!({
        "response": response,
        "source": source,
        "route": decision.tag,
        "is_knowledge_query": decision.tag == RouteTag::Knowledge,
    })))
}

/// GET /api/test — connectivity probe of both AI backends.
pub async fn handle_test(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    require_auth(&state, &headers)?;

    let model_result = state
        .model
        .generate("Hello! Please respond with 'Bedrock Runtime working'.")
        .await;
    let knowledge_result = state
        .knowledge
        .retrieve_and_generate("What is blood pressure?")
        .await;

    Ok(Json(json!({
        "model": probe_result(model_result),
        "knowledge_base": probe_result(knowledge_result),
    })))
}

fn probe_result(result: anyhow::Result<String>) -> Value {
    match result {
        Ok(response) => json!({ "status": "success", "response": response }),
        Err(err) => json!({
            "status": "failed",
            "error": sanitize_api_error(&err.to_string()),
        }),
    }
}

// ── Messaging ───────────────────────────────────────────────────

/// POST /api/send-message — send one SMS through the configured provider.
pub async fn handle_send_message(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<SendMessageBody>,
) -> Result<Json<Value>, ApiError> {
    require_auth(&state, &headers)?;

    let configured_to = state.config.lock().messaging.default_to.clone();
    let to = body
        .to
        .filter(|t| !t.trim().is_empty())
        .or(configured_to)
        .ok_or_else(|| ApiError::InvalidInput("Destination number is required".into()))?;

    let receipt = state.messenger.send(&to, &body.body).await?;
    info!(sid = %receipt.id, "message sent");

    Ok(Json(json!({
        "status": "success",
        "sid": receipt.id,
        "delivery_status": receipt.status,
    })))
}

/// POST /reply_sms — TwiML response for Twilio inbound-SMS webhooks.
pub async fn handle_reply_sms(State(state): State<AppState>) -> impl IntoResponse {
    let reply_text = state.config.lock().messaging.reply_text.clone();
    (
        [(header::CONTENT_TYPE, "text/xml")],
        twiml_reply(&reply_text),
    )
}

// ── Meetings ────────────────────────────────────────────────────

/// POST /api/meetings — create a video consultation.
pub async fn handle_create_meeting(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<CreateMeetingBody>,
) -> Result<Json<Value>, ApiError> {
    require_auth(&state, &headers)?;

    let (default_topic, default_duration) = {
        let config = state.config.lock();
        (config.zoom.topic.clone(), config.zoom.duration_minutes)
    };
    let topic = body
        .topic
        .filter(|t| !t.trim().is_empty())
        .unwrap_or(default_topic);
    let duration = body.duration_minutes.unwrap_or(default_duration);

    let meeting = state.meetings.create_meeting(&topic, duration).await?;
    Ok(Json(json!({
        "meeting_id": meeting.id,
        "join_url": meeting.join_url,
        "topic": meeting.topic,
    })))
}

// ── Vitals ──────────────────────────────────────────────────────

/// GET /api/vitals — one simulated vitals reading.
pub async fn handle_vitals(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<vitals::VitalsReading>, ApiError> {
    require_auth(&state, &headers)?;
    Ok(Json(vitals::sample()))
}

// ── Reports ─────────────────────────────────────────────────────

fn report_json(report: &Report) -> Value {
    json!({
        "id": report.id,
        "title": report.title,
        "icon_name": report.icon_name,
        "date": report.display_date(),
        "content": {
            "diagnosis": report.content.diagnosis,
            "recommendations": report.content.recommendations,
        },
    })
}

/// GET /api/reports — all reports, newest first.
pub async fn handle_reports_list(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    require_auth(&state, &headers)?;

    let reports = state.store.list_reports().await?;
    let listed: Vec<Value> = reports.iter().map(report_json).collect();
    Ok(Json(Value::Array(listed)))
}

/// POST /api/reports — create a report; the store assigns id and date.
pub async fn handle_reports_create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<CreateReportBody>,
) -> Result<impl IntoResponse, ApiError> {
    require_auth(&state, &headers)?;

    if body.title.trim().is_empty() {
        return Err(ApiError::InvalidInput("Report title is required".into()));
    }

    let created = state
        .store
        .create_report(NewReport {
            title: body.title,
            diagnosis: body.diagnosis,
            recommendations: body.recommendations,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(report_json(&created))))
}

/// GET /api/reports/{report_id}/pdf — render one report for download.
pub async fn handle_report_pdf(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(report_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    require_auth(&state, &headers)?;

    let report = state
        .store
        .get_report(&report_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Report not found".into()))?;

    let pdf_bytes = render::render_report_pdf(&report)?;
    let disposition = format!("attachment; filename=\"Report-{report_id}.pdf\"");

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        pdf_bytes,
    ))
}

// ── Text simplification ─────────────────────────────────────────

/// POST /api/process-text — explain medical text in plain language.
pub async fn handle_process_text(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<ProcessTextBody>,
) -> Result<Json<Value>, ApiError> {
    require_auth(&state, &headers)?;

    if body.text.trim().is_empty() {
        return Err(ApiError::InvalidInput("Text is required".into()));
    }
    if body.language != "en" {
        warn!(
            language = %body.language,
            "translation is not supported; returning English text"
        );
    }

    let prompt = format!(
        "You are a medical assistant. Explain the following text to a patient \
         in simple, clear language. <text>{}</text>",
        body.text
    );
    let simplified = state.model.generate(&prompt).await?;

    Ok(Json(json!({
        "simplifiedText": simplified.clone(),
        "translatedText": simplified,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::store::ReportContent;
    use axum::http::HeaderValue;

    fn state_with_token(token: Option<&str>) -> AppState {
        let mut config = Config::default();
        config.gateway.auth_token = token.map(ToString::to_string);
        AppState::from_config(config).unwrap()
    }

    #[test]
    fn bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer sesame"),
        );
        assert_eq!(extract_bearer_token(&headers), Some("sesame"));

        let mut basic = HeaderMap::new();
        basic.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(extract_bearer_token(&basic), None);
    }

    #[test]
    fn open_gateway_accepts_anonymous_requests() {
        let state = state_with_token(None);
        assert!(require_auth(&state, &HeaderMap::new()).is_ok());
    }

    #[test]
    fn token_gateway_rejects_missing_and_wrong_tokens() {
        let state = state_with_token(Some("sesame"));
        assert!(require_auth(&state, &HeaderMap::new()).is_err());

        let mut wrong = HeaderMap::new();
        wrong.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer nope"),
        );
        assert!(require_auth(&state, &wrong).is_err());

        let mut right = HeaderMap::new();
        right.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer sesame"),
        );
        assert!(require_auth(&state, &right).is_ok());
    }

    #[test]
    fn prompt_body_rejects_blank_prompt() {
        let body = PromptBody {
            prompt: "   ".into(),
        };
        assert!(body.required().is_err());

        let body = PromptBody {
            prompt: "What is my blood pressure today?".into(),
        };
        assert_eq!(body.required().unwrap(), "What is my blood pressure today?");
    }

    #[test]
    fn report_json_shape_matches_dashboard_contract() {
        let report = Report {
            id: "r1".into(),
            title: "Follow-up".into(),
            icon_name: "LineChart".into(),
            date: None,
            content: ReportContent {
                diagnosis: "stable".into(),
                recommendations: "hydrate".into(),
            },
        };
        let json = report_json(&report);
        assert_eq!(json["id"], "r1");
        assert_eq!(json["icon_name"], "LineChart");
        assert_eq!(json["date"], Value::Null);
        assert_eq!(json["content"]["diagnosis"], "stable");
    }
}
