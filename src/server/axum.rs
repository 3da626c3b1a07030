//! Axum server adapter.
//!
//! Routes (under the configured base path):
//! - `GET  /actions` — list registered actions
//! - `POST /generate` — run a model action, JSON response
//! - `POST /generate/stream` — run a model action, SSE response
//!
//! `to_sse_response` / `to_text_stream` are also usable directly from
//! application handlers.

use std::convert::Infallible;
use std::pin::Pin;
use std::sync::Arc;

use axum::Router;
use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use futures::{Stream, StreamExt};
use serde::Deserialize;

use super::{ServerConfig, SseOptions};
use crate::error::{ErrorCategory, LlmError};
use crate::registry::ActionRegistry;
use crate::stream::{ChatStream, ChatStreamEvent};
use crate::types::{ChatMessage, ChatResponse, Tool};

/// Convert a `ChatStream` into an Axum SSE response.
pub fn to_sse_response(
    stream: ChatStream,
    opts: SseOptions,
) -> Sse<impl Stream<Item = Result<Event, Infallible>> + Send> {
    let event_stream = stream.map(move |item| {
        let event = match item {
            Ok(ChatStreamEvent::StreamStart { metadata }) => opts.include_start.then(|| {
                let data = serde_json::to_string(&metadata).unwrap_or_else(|_| "{}".to_string());
                Event::default().event("start").data(data)
            }),
            Ok(ChatStreamEvent::ContentDelta { delta, index }) => {
                let data = serde_json::json!({"delta": delta, "index": index});
                Some(Event::default().event("delta").data(data.to_string()))
            }
            Ok(ChatStreamEvent::ThinkingDelta { delta }) => {
                let data = serde_json::json!({"delta": delta});
                Some(Event::default().event("reasoning").data(data.to_string()))
            }
            Ok(ChatStreamEvent::ToolCallDelta {
                id,
                function_name,
                arguments_delta,
                index,
            }) => {
                let data = serde_json::json!({
                    "id": id,
                    "name": function_name,
                    "arguments_delta": arguments_delta,
                    "index": index
                });
                Some(Event::default().event("tool").data(data.to_string()))
            }
            Ok(ChatStreamEvent::UsageUpdate { usage }) => opts.include_usage.then(|| {
                let data = serde_json::to_string(&usage).unwrap_or_else(|_| "{}".to_string());
                Event::default().event("usage").data(data)
            }),
            Ok(ChatStreamEvent::StreamEnd { response }) => opts.include_end.then(|| {
                let data = serde_json::to_string(&response).unwrap_or_else(|_| "{}".to_string());
                Event::default().event("end").data(data)
            }),
            Ok(ChatStreamEvent::Error { error }) => {
                Some(error_event(&opts, error))
            }
            Err(e) => Some(error_event(&opts, e.user_message())),
        };

        // None means the event kind is disabled; keep the stream alive with
        // a comment frame.
        Ok(event.unwrap_or_else(|| Event::default().comment("skipped")))
    });

    Sse::new(event_stream)
}

fn error_event(opts: &SseOptions, message: String) -> Event {
    let message = if opts.mask_errors {
        opts.masked_error_message
            .clone()
            .unwrap_or_else(|| "internal error".to_string())
    } else {
        message
    };
    let data = serde_json::json!({"error": message});
    Event::default().event("error").data(data.to_string())
}

/// Convert a `ChatStream` into a plain text stream, dropping everything but
/// content deltas.
pub fn to_text_stream(
    stream: ChatStream,
) -> Pin<Box<dyn Stream<Item = Result<String, Infallible>> + Send>> {
    let text_stream = stream.filter_map(|item| async move {
        match item {
            Ok(ChatStreamEvent::ContentDelta { delta, .. }) => Some(Ok(delta)),
            Ok(ChatStreamEvent::Error { error }) => Some(Ok(format!("\n[Error: {error}]\n"))),
            Err(e) => Some(Ok(format!("\n[Error: {}]\n", e.user_message()))),
            _ => None,
        }
    });

    Box::pin(text_stream)
}

struct AppState {
    registry: Arc<ActionRegistry>,
    sse: SseOptions,
}

/// Request body for the generate routes
#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    /// Action name of the model (`"deepseek/deepseek-chat"`)
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub tools: Option<Vec<Tool>>,
}

struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn not_found(message: String) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message,
        }
    }

    fn from_llm(error: &LlmError, opts: &SseOptions) -> Self {
        let status = match error {
            LlmError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => match error.category() {
                ErrorCategory::Client => StatusCode::BAD_REQUEST,
                ErrorCategory::Auth => StatusCode::UNAUTHORIZED,
                ErrorCategory::Server | ErrorCategory::Network => StatusCode::BAD_GATEWAY,
                ErrorCategory::Other => StatusCode::INTERNAL_SERVER_ERROR,
            },
        };
        let message = if opts.mask_errors {
            error.user_message()
        } else {
            error.to_string()
        };
        Self { status, message }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({"error": self.message}));
        (self.status, body).into_response()
    }
}

async fn list_actions(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let actions: Vec<serde_json::Value> = state
        .registry
        .list_all()
        .into_iter()
        .map(|(kind, name)| serde_json::json!({"kind": kind.to_string(), "name": name}))
        .collect();
    Json(serde_json::json!({"actions": actions}))
}

async fn generate(
    State(state): State<Arc<AppState>>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let model = state
        .registry
        .lookup_model(&request.model)
        .ok_or_else(|| ApiError::not_found(format!("Unknown model action: {}", request.model)))?;

    let response = model
        .chat_with_tools(request.messages, request.tools)
        .await
        .map_err(|e| ApiError::from_llm(&e, &state.sse))?;

    Ok(Json(response))
}

async fn generate_stream(
    State(state): State<Arc<AppState>>,
    Json(request): Json<GenerateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let model = state
        .registry
        .lookup_model(&request.model)
        .ok_or_else(|| ApiError::not_found(format!("Unknown model action: {}", request.model)))?;

    let stream = model
        .chat_stream(request.messages, request.tools)
        .await
        .map_err(|e| ApiError::from_llm(&e, &state.sse))?;

    Ok(to_sse_response(stream, state.sse.clone()))
}

/// Build the router for a registry.
pub fn router(registry: Arc<ActionRegistry>, config: &ServerConfig) -> Router {
    let state = Arc::new(AppState {
        registry,
        sse: config.sse.clone(),
    });

    let api = Router::new()
        .route("/actions", get(list_actions))
        .route("/generate", post(generate))
        .route("/generate/stream", post(generate_stream))
        .with_state(state);

    Router::new().nest(&config.base_path, api)
}

/// Bind and serve the registry until the process exits.
pub async fn serve(registry: Arc<ActionRegistry>, config: ServerConfig) -> Result<(), LlmError> {
    let addr = config.bind_addr();
    let app = router(registry, &config);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| LlmError::HttpError(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!(%addr, base_path = %config.base_path, "server listening");

    axum::serve(listener, app)
        .await
        .map_err(|e| LlmError::HttpError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MessageContent, ResponseMetadata};
    use futures::stream;

    fn sample_stream() -> ChatStream {
        let events = vec![
            Ok(ChatStreamEvent::StreamStart {
                metadata: ResponseMetadata {
                    id: Some("s1".to_string()),
                    model: Some("m".to_string()),
                    created: None,
                    provider: "test".to_string(),
                    request_id: None,
                },
            }),
            Ok(ChatStreamEvent::ContentDelta {
                delta: "hello".to_string(),
                index: Some(0),
            }),
            Ok(ChatStreamEvent::StreamEnd {
                response: ChatResponse {
                    id: None,
                    model: None,
                    content: MessageContent::Text(String::new()),
                    usage: None,
                    finish_reason: None,
                    tool_calls: None,
                    thinking: None,
                    metadata: Default::default(),
                },
            }),
        ];
        Box::pin(stream::iter(events))
    }

    #[tokio::test]
    async fn test_text_stream_keeps_only_content() {
        let text: Vec<String> = to_text_stream(sample_stream())
            .map(|item| item.unwrap())
            .collect()
            .await;
        assert_eq!(text, vec!["hello"]);
    }

    #[tokio::test]
    async fn test_text_stream_reports_masked_errors() {
        let events: Vec<Result<ChatStreamEvent, LlmError>> =
            vec![Err(LlmError::api_error(500, "secret detail"))];
        let stream: ChatStream = Box::pin(stream::iter(events));

        let text: Vec<String> = to_text_stream(stream).map(|item| item.unwrap()).collect().await;
        assert_eq!(text.len(), 1);
        assert!(text[0].contains("upstream API error"));
        assert!(!text[0].contains("secret detail"));
    }

    #[test]
    fn test_api_error_status_mapping() {
        let opts = SseOptions::default();
        assert_eq!(
            ApiError::from_llm(&LlmError::NotFound("x".into()), &opts).status,
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from_llm(&LlmError::api_error(503, "down"), &opts).status,
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::from_llm(&LlmError::InvalidInput("bad".into()), &opts).status,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from_llm(&LlmError::AuthenticationError("no".into()), &opts).status,
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_api_error_masking() {
        let masked = ApiError::from_llm(
            &LlmError::api_error(500, "secret detail"),
            &SseOptions::production(),
        );
        assert!(!masked.message.contains("secret detail"));

        let unmasked = ApiError::from_llm(
            &LlmError::api_error(500, "secret detail"),
            &SseOptions::default(),
        );
        assert!(unmasked.message.contains("secret detail"));
    }
}
