#![cfg(feature = "deepseek")]

//! HTTP-level tests for the shared OpenAI-compatible client.

use futures_util::StreamExt;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ensemble::compat::{CompatClient, CompatConfig};
use ensemble::error::LlmError;
use ensemble::providers::deepseek::DeepSeekAdapter;
use ensemble::retry::RetryPolicy;
use ensemble::stream::ChatStreamEvent;
use ensemble::traits::{EmbeddingModel, LanguageModel, ModelListing};
use ensemble::types::{ChatMessage, FinishReason};

fn client_for(server: &MockServer, model: &str) -> CompatClient {
    let config = CompatConfig::new("sk-test", &server.uri(), Arc::new(DeepSeekAdapter))
        .with_model(model);
    CompatClient::new(config)
        .unwrap()
        .with_retry_policy(
            RetryPolicy::new()
                .with_max_attempts(2)
                .with_initial_delay(Duration::from_millis(1)),
        )
}

#[tokio::test]
async fn chat_sends_auth_and_parses_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "deepseek-chat",
            "stream": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "resp-1",
            "object": "chat.completion",
            "created": 1735000000,
            "model": "deepseek-chat",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "Hello there"},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 4, "completion_tokens": 3, "total_tokens": 7}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, "deepseek-chat");
    let response = client.chat(vec![ChatMessage::user("Hi")]).await.unwrap();

    assert_eq!(response.text(), "Hello there");
    assert_eq!(response.finish_reason, Some(FinishReason::Stop));
    assert_eq!(response.usage.unwrap().total_tokens, 7);
    assert_eq!(response.model.as_deref(), Some("deepseek-chat"));
}

#[tokio::test]
async fn chat_surfaces_reasoning_content() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "resp-2",
            "model": "deepseek-reasoner",
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": "four",
                    "reasoning_content": "2 + 2 = 4"
                },
                "finish_reason": "stop"
            }]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server, "deepseek-reasoner");
    let response = client.chat(vec![ChatMessage::user("2+2?")]).await.unwrap();

    assert_eq!(response.text(), "four");
    assert_eq!(response.thinking.as_deref(), Some("2 + 2 = 4"));
}

#[tokio::test]
async fn chat_maps_api_errors() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({
                "error": {"message": "invalid api key"}
            })),
        )
        .mount(&server)
        .await;

    let client = client_for(&server, "deepseek-chat");
    let result = client.chat(vec![ChatMessage::user("Hi")]).await;

    match result {
        Err(LlmError::ApiError { code, .. }) => assert_eq!(code, 401),
        other => panic!("expected ApiError, got {other:?}"),
    }
}

#[tokio::test]
async fn transient_failures_are_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "resp-3",
            "model": "deepseek-chat",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "recovered"},
                "finish_reason": "stop"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, "deepseek-chat");
    let response = client.chat(vec![ChatMessage::user("Hi")]).await.unwrap();
    assert_eq!(response.text(), "recovered");
}

#[tokio::test]
async fn embed_parses_vectors() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .and(body_partial_json(json!({"input": ["a", "b"]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "data": [
                {"object": "embedding", "embedding": [0.1, 0.2], "index": 0},
                {"object": "embedding", "embedding": [0.3, 0.4], "index": 1}
            ],
            "model": "embed-model",
            "usage": {"prompt_tokens": 2, "total_tokens": 2}
        })))
        .mount(&server)
        .await;

    let client = client_for(&server, "embed-model");
    let response = client
        .embed(vec!["a".to_string(), "b".to_string()])
        .await
        .unwrap();

    assert_eq!(response.embeddings.len(), 2);
    assert_eq!(response.embeddings[1], vec![0.3, 0.4]);
}

#[tokio::test]
async fn list_models_parses_catalog() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "data": [
                {"id": "deepseek-chat", "object": "model", "owned_by": "deepseek"},
                {"id": "deepseek-reasoner", "object": "model", "owned_by": "deepseek"}
            ]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server, "deepseek-chat");
    let models = client.list_models().await.unwrap();

    assert_eq!(models.len(), 2);
    assert_eq!(models[0].id, "deepseek-chat");
    assert_eq!(models[0].owned_by, "deepseek");
}

#[tokio::test]
async fn chat_stream_emits_events_in_order() {
    let server = MockServer::start().await;

    let sse_body = concat!(
        "data: {\"id\":\"s1\",\"model\":\"deepseek-chat\",\"choices\":[{\"index\":0,\"delta\":{\"content\":\"Hel\"}}]}\n\n",
        "data: {\"choices\":[{\"index\":0,\"delta\":{\"content\":\"lo\"}}]}\n\n",
        "data: {\"choices\":[],\"usage\":{\"prompt_tokens\":4,\"completion_tokens\":2,\"total_tokens\":6}}\n\n",
        "data: [DONE]\n\n",
    );

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({"stream": true})))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(sse_body, "text/event-stream"),
        )
        .mount(&server)
        .await;

    let client = client_for(&server, "deepseek-chat");
    let stream = client
        .chat_stream(vec![ChatMessage::user("Hi")], None)
        .await
        .unwrap();

    let events: Vec<ChatStreamEvent> = stream.map(|event| event.unwrap()).collect().await;

    assert!(matches!(events[0], ChatStreamEvent::StreamStart { .. }));

    let content: String = events
        .iter()
        .filter_map(|event| match event {
            ChatStreamEvent::ContentDelta { delta, .. } => Some(delta.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(content, "Hello");

    assert!(events.iter().any(|event| matches!(
        event,
        ChatStreamEvent::UsageUpdate { usage } if usage.total_tokens == 6
    )));
    assert!(matches!(
        events.last().unwrap(),
        ChatStreamEvent::StreamEnd { .. }
    ));
}
