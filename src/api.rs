//! REST API Server for the energy advisor
//!
//! Exposes one-shot advice and the guided conversation over HTTP.
//! Conversation state is not stored here: clients send it back every turn.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::conversation::ConversationEngine;
use crate::error::AdvisorError;
use crate::models::ConversationState;
use crate::recommendations::RecommendationGenerator;

/// =============================
/// Request Models
/// =============================

#[derive(Debug, Deserialize)]
pub struct AdviceQuery {
    pub consumption: f64,
    pub people: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub state: Option<ConversationState>,
    #[serde(default)]
    pub message: String,
}

/// Chat body as received: the state is kept untyped until validated
#[derive(Debug, Deserialize)]
struct RawChatRequest {
    #[serde(default)]
    state: Option<serde_json::Value>,
    #[serde(default)]
    message: String,
}

impl RawChatRequest {
    /// A state that does not decode is a tampered or stale conversation
    fn validate(self) -> crate::Result<ChatRequest> {
        let state = self
            .state
            .filter(|value| !value.is_null())
            .map(serde_json::from_value::<ConversationState>)
            .transpose()
            .map_err(|e| {
                AdvisorError::ProtocolError(format!("invalid conversation state: {}", e))
            })?;

        Ok(ChatRequest {
            state,
            message: self.message,
        })
    }
}

/// =============================
/// Response Wrapper
/// =============================

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    pub data: Option<serde_json::Value>,
    pub error: Option<String>,
    pub timestamp: String,
}

impl ApiResponse {
    pub fn success<T: Serialize>(data: T) -> Self {
        Self {
            success: true,
            data: serde_json::to_value(data).ok(),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// =============================
/// API State
/// =============================

#[derive(Clone)]
pub struct ApiState {
    pub generator: Arc<RecommendationGenerator>,
    pub conversation: Arc<ConversationEngine>,
}

impl ApiState {
    pub fn new(generator: Arc<RecommendationGenerator>) -> Self {
        let conversation = Arc::new(ConversationEngine::new(generator.clone()));
        Self {
            generator,
            conversation,
        }
    }
}

/// =============================
/// Helpers: Error → Status
/// =============================

fn status_for(error: &AdvisorError) -> StatusCode {
    match error {
        AdvisorError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        AdvisorError::ProtocolError(_) => StatusCode::UNPROCESSABLE_ENTITY,
        AdvisorError::InsufficientData(_) | AdvisorError::DatasetError(_) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(error: AdvisorError) -> (StatusCode, Json<ApiResponse>) {
    let status = status_for(&error);
    warn!(status = %status, error = %error, "Request rejected");
    (status, Json(ApiResponse::error(error.to_string())))
}

/// =============================
/// Health Endpoint
/// =============================

async fn health(State(state): State<ApiState>) -> Json<serde_json::Value> {
    let classifier = state.generator.classifier();
    Json(serde_json::json!({
        "status": "healthy",
        "records": classifier.dataset().len(),
        "statistics": classifier.statistics(),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// =============================
/// One-shot Advice Endpoint
/// =============================

async fn get_advice(
    State(state): State<ApiState>,
    query: Result<Query<AdviceQuery>, QueryRejection>,
) -> (StatusCode, Json<ApiResponse>) {
    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => return error_response(AdvisorError::InvalidInput(rejection.body_text())),
    };

    info!(
        consumption = query.consumption,
        people = query.people,
        "Received advice request"
    );

    match state.generator.advise(query.consumption, query.people) {
        Ok(bundle) => (
            StatusCode::OK,
            Json(ApiResponse::success(serde_json::json!({
                "message": format!(
                    "Análisis de consumo para {} personas con {:?} kWh",
                    query.people, query.consumption
                ),
                "recommendations": bundle,
            }))),
        ),
        Err(e) => error_response(e),
    }
}

/// =============================
/// Chat Endpoint
/// =============================

async fn chat_handler(
    State(state): State<ApiState>,
    payload: Result<Json<RawChatRequest>, JsonRejection>,
) -> (StatusCode, Json<ApiResponse>) {
    let req = match payload
        .map_err(|rejection| AdvisorError::InvalidInput(rejection.body_text()))
        .and_then(|Json(raw)| raw.validate())
    {
        Ok(req) => req,
        Err(e) => return error_response(e),
    };

    let conversation_state = req.state.unwrap_or_default();
    info!(step = conversation_state.step, "Received chat turn");

    match state
        .conversation
        .handle_turn(conversation_state, &req.message)
    {
        Ok(outcome) => (StatusCode::OK, Json(ApiResponse::success(outcome))),
        Err(e) => error_response(e),
    }
}

/// =============================
/// Router
/// =============================

pub fn create_router(generator: Arc<RecommendationGenerator>) -> Router {
    let state = ApiState::new(generator);

    Router::new()
        .route("/health", get(health))
        .route("/get_advice", get(get_advice))
        .route("/api/chat", post(chat_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(
    generator: Arc<RecommendationGenerator>,
    port: u16,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let router = create_router(generator);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("API Server listening on http://0.0.0.0:{}", port);
    info!("Local: http://127.0.0.1:{}", port);

    axum::serve(listener, router).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::ConsumptionClassifier;
    use crate::dataset::sample_dataset;
    use crate::models::TurnOutcome;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn router() -> Router {
        let classifier = ConsumptionClassifier::new(sample_dataset()).unwrap();
        create_router(Arc::new(RecommendationGenerator::new(classifier)))
    }

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, ApiResponse) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn chat_request(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/chat")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = router()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["records"], 4);
        assert_eq!(body["statistics"]["mean"], 200.0);
    }

    #[tokio::test]
    async fn test_get_advice() {
        let request = Request::get("/get_advice?consumption=400&people=1")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(router(), request).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.success);
        let data = body.data.unwrap();
        assert_eq!(data["recommendations"]["level"], "high");
        assert_eq!(data["recommendations"]["general"].as_array().unwrap().len(), 4);
        assert_eq!(data["recommendations"]["savings"]["kwh_saved"], 100.0);
        assert_eq!(
            data["message"],
            "Análisis de consumo para 1 personas con 400.0 kWh"
        );
    }

    #[tokio::test]
    async fn test_get_advice_malformed_query_uses_envelope() {
        for uri in [
            "/get_advice?consumption=300&people=abc",
            "/get_advice?consumption=300",
        ] {
            let request = Request::get(uri).body(Body::empty()).unwrap();
            let (status, body) = send(router(), request).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
            assert!(!body.success);
            assert!(body.error.unwrap().starts_with("Invalid input"));
        }
    }

    #[tokio::test]
    async fn test_get_advice_rejects_non_positive() {
        for uri in [
            "/get_advice?consumption=0&people=2",
            "/get_advice?consumption=100&people=-1",
        ] {
            let request = Request::get(uri).body(Body::empty()).unwrap();
            let (status, body) = send(router(), request).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert!(!body.success);
            assert!(body.error.unwrap().contains("mayores que 0"));
        }
    }

    #[tokio::test]
    async fn test_chat_without_state_starts_dialogue() {
        let (status, body) = send(router(), chat_request(serde_json::json!({"message": "hola"}))).await;
        assert_eq!(status, StatusCode::OK);

        let outcome: TurnOutcome = serde_json::from_value(body.data.unwrap()).unwrap();
        assert_eq!(outcome.state.step, 1);
    }

    #[tokio::test]
    async fn test_chat_state_round_trips() {
        let state = ConversationState {
            step: 2,
            name: Some("Ana".into()),
            ..ConversationState::default()
        };
        let (_, body) = send(
            router(),
            chat_request(serde_json::json!({"state": state, "message": "4"})),
        )
        .await;
        let outcome: TurnOutcome = serde_json::from_value(body.data.unwrap()).unwrap();
        assert_eq!(outcome.state.step, 3);
        assert_eq!(outcome.state.name.as_deref(), Some("Ana"));
        assert_eq!(outcome.state.people, Some(4));

        let (_, body) = send(
            router(),
            chat_request(serde_json::json!({"state": outcome.state, "message": "300"})),
        )
        .await;
        let outcome: TurnOutcome = serde_json::from_value(body.data.unwrap()).unwrap();
        assert_eq!(outcome.state.step, 4);
        assert_eq!(outcome.state.consumption, Some(300.0));
    }

    #[tokio::test]
    async fn test_chat_unknown_step_is_rejected() {
        let (status, body) = send(
            router(),
            chat_request(serde_json::json!({"state": {"step": 9}, "message": "hola"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(!body.success);
    }

    #[tokio::test]
    async fn test_chat_tampered_state_is_protocol_error() {
        for state in [
            serde_json::json!({"step": 2, "people": -3}),
            serde_json::json!({"step": 1e20}),
            serde_json::json!("step two"),
        ] {
            let (status, body) = send(
                router(),
                chat_request(serde_json::json!({"state": state, "message": "4"})),
            )
            .await;
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{}", state);
            assert!(!body.success);
            assert!(body.error.unwrap().contains("invalid conversation state"));
        }
    }

    #[tokio::test]
    async fn test_chat_malformed_body_uses_envelope() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/chat")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, body) = send(router(), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!body.success);
    }

    #[tokio::test]
    async fn test_chat_null_state_starts_dialogue() {
        let (status, body) = send(
            router(),
            chat_request(serde_json::json!({"state": null, "message": "hola"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let outcome: TurnOutcome = serde_json::from_value(body.data.unwrap()).unwrap();
        assert_eq!(outcome.state.step, 1);
    }
}
