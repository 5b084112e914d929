use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use cuet_common::gemini::GeminiClientError;

pub const MAX_MESSAGE_CHARS: usize = 500;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Common(#[from] cuet_common::error::CommonError),

    #[error(transparent)]
    Gemini(#[from] GeminiClientError),
}

/// Per-request failures of `POST /api/chat`. `Display` is the message the
/// client sees.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Message is required")]
    MissingMessage,

    #[error("Message too long (max {} characters)", MAX_MESSAGE_CHARS)]
    MessageTooLong,

    #[error("Server configuration error")]
    Configuration,

    #[error("AI service error: {}", .0.as_deref().unwrap_or("Please try again."))]
    Upstream(Option<String>),

    #[error("Could not generate response. Please try again.")]
    EmptyCompletion,

    #[error("Server error. Please try again later.")]
    Server,
}

impl ChatError {
    pub fn status(&self) -> StatusCode {
        match self {
            ChatError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ChatError::MissingMessage | ChatError::MessageTooLong => StatusCode::BAD_REQUEST,
            ChatError::Configuration
            | ChatError::Upstream(_)
            | ChatError::EmptyCompletion
            | ChatError::Server => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Failures after the model call was attempted carry `"success": false`.
    fn after_model_call(&self) -> bool {
        matches!(
            self,
            ChatError::Upstream(_) | ChatError::EmptyCompletion | ChatError::Server
        )
    }
}

impl From<GeminiClientError> for ChatError {
    fn from(err: GeminiClientError) -> Self {
        match err {
            GeminiClientError::MissingApiKey => ChatError::Configuration,
            GeminiClientError::Upstream { message, .. } => ChatError::Upstream(message),
            GeminiClientError::Request(_)
            | GeminiClientError::InvalidJson(_)
            | GeminiClientError::UpstreamBody { .. } => ChatError::Server,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    success: Option<bool>,
    error: String,
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            success: self.after_model_call().then_some(false),
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
