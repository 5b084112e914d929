use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use cuet_common::gemini::{Content, GeminiClient, GenerateContentRequest, GenerationConfig};

use crate::dataset::ReferenceData;
use crate::error::{ChatError, MAX_MESSAGE_CHARS};
use crate::filter::{filter_rankings, filter_universities};
use crate::prompt::build_system_instruction;

const TEMPERATURE: f32 = 0.5;
const MAX_OUTPUT_TOKENS: u32 = 2048;

#[derive(Clone)]
pub struct AppState {
    gemini: Arc<GeminiClient>,
    data: Arc<ReferenceData>,
}

impl AppState {
    pub fn new(gemini: Arc<GeminiClient>, data: Arc<ReferenceData>) -> Self {
        Self { gemini, data }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/chat", post(chat).fallback(method_not_allowed))
        .route("/health", get(health))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub history: Vec<HistoryTurn>,
}

/// A prior conversation turn, forwarded to the model unchanged.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HistoryTurn {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub success: bool,
    pub response: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn method_not_allowed() -> ChatError {
    ChatError::MethodNotAllowed
}

async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ChatError> {
    let Json(request) = payload.map_err(|rejection| {
        debug!(error = %rejection, "rejected chat body");
        ChatError::MissingMessage
    })?;

    let message = request
        .message
        .filter(|m| !m.is_empty())
        .ok_or(ChatError::MissingMessage)?;
    let chars = message.chars().count();
    if chars > MAX_MESSAGE_CHARS {
        return Err(ChatError::MessageTooLong);
    }

    if !state.gemini.has_api_key() {
        error!("GEMINI_API_KEY not configured");
        return Err(ChatError::Configuration);
    }

    let universities = filter_universities(&message, &state.data.universities);
    let rankings = filter_rankings(&message, &state.data.rankings);
    debug!(
        universities = universities.as_ref().map(Vec::len),
        rankings = rankings.as_ref().map(Vec::len),
        "reference data filtered"
    );

    let system_instruction =
        build_system_instruction(universities.as_deref(), rankings.as_deref()).map_err(|e| {
            error!(error = %e, "failed to serialize reference data");
            ChatError::Server
        })?;

    info!(chars, history = request.history.len(), "chat request");

    let mut contents: Vec<Content> = request
        .history
        .into_iter()
        .map(|turn| Content::text(turn.role, turn.content))
        .collect();
    contents.push(Content::user(message));

    let upstream_request = GenerateContentRequest {
        system_instruction: Some(Content::instruction(system_instruction)),
        contents,
        generation_config: Some(GenerationConfig {
            temperature: Some(TEMPERATURE),
            max_output_tokens: Some(MAX_OUTPUT_TOKENS),
        }),
    };

    let response = state
        .gemini
        .generate_content(&upstream_request)
        .await
        .map_err(|e| {
            error!(error = %e, "gemini request failed");
            ChatError::from(e)
        })?;

    if let Some(text) = response.text() {
        if let Some(usage) = response.usage_metadata.as_ref() {
            debug!(
                prompt_tokens = usage.prompt_token_count,
                candidates_tokens = usage.candidates_token_count,
                total_tokens = usage.total_token_count,
                "gemini token usage"
            );
        }
        return Ok(Json(ChatResponse {
            success: true,
            response: text.to_string(),
        }));
    }
    if let Some(err) = response.error {
        error!(code = ?err.code, status = ?err.status, message = ?err.message, "gemini returned an error object");
        return Err(ChatError::Upstream(err.message));
    }
    error!(
        candidates = response.candidates.len(),
        finish_reason = ?response.candidates.first().and_then(|c| c.finish_reason.as_deref()),
        "gemini returned no text"
    );
    Err(ChatError::EmptyCompletion)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::response::IntoResponse;
    use cuet_common::gemini::GeminiClientConfig;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::model::{RankingRecord, UniversityCourseRecord};

    fn reference_data() -> Arc<ReferenceData> {
        Arc::new(ReferenceData {
            universities: vec![
                UniversityCourseRecord {
                    university_name: "Delhi University".to_string(),
                    location: "Delhi".to_string(),
                    course_name: "Political Science".to_string(),
                    course_category: "Humanities".to_string(),
                    ..Default::default()
                },
                UniversityCourseRecord {
                    university_name: "University of Hyderabad".to_string(),
                    university_short: "UoH".to_string(),
                    location: "Hyderabad".to_string(),
                    course_name: "Integrated MSc Chemistry".to_string(),
                    course_category: "Science".to_string(),
                    ..Default::default()
                },
            ],
            rankings: vec![
                RankingRecord {
                    name: "Indian Institute of Technology Madras".to_string(),
                    city: "Chennai".to_string(),
                    state: "Tamil Nadu".to_string(),
                    ..Default::default()
                },
                RankingRecord {
                    name: "Jawaharlal Nehru University".to_string(),
                    city: "New Delhi".to_string(),
                    state: "Delhi".to_string(),
                    ..Default::default()
                },
            ],
        })
    }

    fn gemini(base_url: &str, api_key: Option<&str>) -> Arc<GeminiClient> {
        let config = GeminiClientConfig {
            base_url: base_url.to_string(),
            model: "gemini-test".to_string(),
            api_key: api_key.map(str::to_string),
            max_retries: 0,
            default_timeout: Duration::from_secs(5),
            ..GeminiClientConfig::default()
        };
        Arc::new(GeminiClient::new(config).unwrap())
    }

    fn app(base_url: &str, api_key: Option<&str>) -> Router {
        router(AppState::new(gemini(base_url, api_key), reference_data()))
    }

    /// Upstream stand-in that records the last request body and replies with
    /// `reply`.
    async fn spawn_gemini(status: StatusCode, reply: Value) -> (String, Arc<Mutex<Option<Value>>>) {
        let seen = Arc::new(Mutex::new(None));
        let captured = Arc::clone(&seen);
        let stub = Router::new().fallback(move |Json(body): Json<Value>| {
            let captured = Arc::clone(&captured);
            let reply = reply.clone();
            async move {
                *captured.lock().unwrap() = Some(body);
                (status, Json(reply)).into_response()
            }
        });
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, stub).await.unwrap();
        });
        (format!("http://{addr}"), seen)
    }

    fn post_json(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/chat")
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn health_reports_version() {
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (status, json) = send(app("http://127.0.0.1:9", None), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
        assert!(json["version"].is_string());
    }

    #[tokio::test]
    async fn non_post_is_rejected() {
        let request = Request::builder().method("GET").uri("/api/chat").body(Body::empty()).unwrap();
        let (status, json) = send(app("http://127.0.0.1:9", Some("k")), request).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(json, json!({"error": "Method not allowed"}));
    }

    #[tokio::test]
    async fn missing_or_invalid_message_is_rejected() {
        for body in [r#"{}"#, r#"{"message": ""}"#, r#"{"message": 42}"#, "not json"] {
            let (status, json) = send(app("http://127.0.0.1:9", Some("k")), post_json(body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "body: {body}");
            assert_eq!(json, json!({"error": "Message is required"}));
        }
    }

    #[tokio::test]
    async fn overlong_message_is_rejected() {
        let body = json!({"message": "a".repeat(MAX_MESSAGE_CHARS + 1)}).to_string();
        let (status, json) = send(app("http://127.0.0.1:9", Some("k")), post_json(&body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json, json!({"error": "Message too long (max 500 characters)"}));
    }

    #[tokio::test]
    async fn length_limit_counts_characters() {
        // 500 multi-byte characters pass validation and reach the key check.
        let body = json!({"message": "अ".repeat(MAX_MESSAGE_CHARS)}).to_string();
        let (status, json) = send(app("http://127.0.0.1:9", None), post_json(&body)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json, json!({"error": "Server configuration error"}));
    }

    #[tokio::test]
    async fn forwards_filtered_data_and_history() {
        let (base_url, seen) = spawn_gemini(
            StatusCode::OK,
            json!({"candidates": [{"content": {"role": "model", "parts": [{"text": "**DU** offers it."}]}}]}),
        )
        .await;
        let body = json!({
            "message": "DU BA political science",
            "history": [
                {"role": "user", "content": "hi"},
                {"role": "model", "content": "Hello! Ask me about CUET."}
            ]
        })
        .to_string();

        let (status, json) = send(app(&base_url, Some("k")), post_json(&body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, json!({"success": true, "response": "**DU** offers it."}));

        let sent = seen.lock().unwrap().clone().unwrap();
        let contents = sent["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 3);
        assert_eq!(contents[1]["role"], "model");
        assert_eq!(contents[1]["parts"][0]["text"], "Hello! Ask me about CUET.");
        assert_eq!(contents[2]["role"], "user");
        assert_eq!(contents[2]["parts"][0]["text"], "DU BA political science");
        assert_eq!(sent["generationConfig"]["maxOutputTokens"], 2048);

        let instruction = sent["systemInstruction"]["parts"][0]["text"].as_str().unwrap();
        assert!(instruction.contains("Relevant courses for this query:\n[{\"university_name\":\"Delhi University\""));
        assert!(instruction.contains("No ranking data needed for this question."));
    }

    #[tokio::test]
    async fn ranking_questions_include_location_matches() {
        let (base_url, seen) = spawn_gemini(
            StatusCode::OK,
            json!({"candidates": [{"content": {"parts": [{"text": "JNU"}]}}]}),
        )
        .await;
        let body = json!({"message": "best universities in Delhi"}).to_string();

        let (status, _) = send(app(&base_url, Some("k")), post_json(&body)).await;
        assert_eq!(status, StatusCode::OK);

        let sent = seen.lock().unwrap().clone().unwrap();
        let instruction = sent["systemInstruction"]["parts"][0]["text"].as_str().unwrap();
        assert!(instruction.contains("Relevant NIRF rankings:\n[{\"name\":\"Jawaharlal Nehru University\""));
        assert!(!instruction.contains("Madras"));
    }

    #[tokio::test]
    async fn general_questions_use_fallback_sections() {
        let (base_url, seen) = spawn_gemini(
            StatusCode::OK,
            json!({
                "candidates": [{"content": {"parts": [{"text": "It covers..."}]}}],
                "usageMetadata": {"promptTokenCount": 900, "candidatesTokenCount": 40, "totalTokenCount": 940}
            }),
        )
        .await;
        let body = json!({"message": "What is CUET syllabus?"}).to_string();

        let (status, _) = send(app(&base_url, Some("k")), post_json(&body)).await;
        assert_eq!(status, StatusCode::OK);

        let sent = seen.lock().unwrap().clone().unwrap();
        let instruction = sent["systemInstruction"]["parts"][0]["text"].as_str().unwrap();
        assert!(instruction.contains("No specific university data needed for this question."));
        assert!(instruction.contains("No ranking data needed for this question."));
    }

    #[tokio::test]
    async fn upstream_error_is_reported() {
        let (base_url, _) = spawn_gemini(
            StatusCode::TOO_MANY_REQUESTS,
            json!({"error": {"code": 429, "message": "Quota exceeded", "status": "RESOURCE_EXHAUSTED"}}),
        )
        .await;
        let body = json!({"message": "DU cutoff"}).to_string();

        let (status, json) = send(app(&base_url, Some("k")), post_json(&body)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json, json!({"success": false, "error": "AI service error: Quota exceeded"}));
    }

    #[tokio::test]
    async fn empty_completion_is_reported() {
        let (base_url, _) = spawn_gemini(
            StatusCode::OK,
            json!({"candidates": [{"finishReason": "SAFETY"}]}),
        )
        .await;
        let body = json!({"message": "DU cutoff"}).to_string();

        let (status, json) = send(app(&base_url, Some("k")), post_json(&body)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            json,
            json!({"success": false, "error": "Could not generate response. Please try again."})
        );
    }

    #[tokio::test]
    async fn unreachable_upstream_is_a_server_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let body = json!({"message": "DU cutoff"}).to_string();

        let (status, json) = send(app(&format!("http://{addr}"), Some("k")), post_json(&body)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            json,
            json!({"success": false, "error": "Server error. Please try again later."})
        );
    }
}
