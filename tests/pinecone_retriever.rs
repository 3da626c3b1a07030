#![cfg(feature = "pinecone")]

//! Pinecone retriever tests against a mock index.

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ensemble::error::LlmError;
use ensemble::prelude::*;
use ensemble::providers::pinecone::{PineconeOptions, PineconePlugin};
use ensemble::types::EmbeddingResponse;

struct StubEmbedder;

#[async_trait]
impl EmbeddingModel for StubEmbedder {
    fn model_id(&self) -> &str {
        "stub-embed"
    }

    async fn embed(&self, texts: Vec<String>) -> Result<EmbeddingResponse, LlmError> {
        Ok(EmbeddingResponse::new(
            texts.iter().map(|_| vec![0.25, 0.5, 0.75]).collect(),
            "stub-embed",
        ))
    }
}

async fn registry_with_index(server: &MockServer) -> ActionRegistry {
    let registry = ActionRegistry::new();
    registry.register_embedder("stub/stub-embed", Arc::new(StubEmbedder));

    registry
        .apply(&PineconePlugin::with_options(
            PineconeOptions::new()
                .api_key("pc-key")
                .index("docs")
                .index_host(server.uri())
                .embedder("stub/stub-embed"),
        ))
        .await
        .unwrap();

    registry
}

#[tokio::test]
async fn retrieve_embeds_query_and_maps_matches() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/query"))
        .and(header("api-key", "pc-key"))
        .and(body_partial_json(json!({
            "vector": [0.25, 0.5, 0.75],
            "topK": 5,
            "includeMetadata": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "matches": [
                {
                    "id": "doc-1",
                    "score": 0.92,
                    "metadata": {"text": "first document", "source": "kb"}
                },
                {
                    "id": "doc-2",
                    "score": 0.81,
                    "metadata": {"text": "second document"}
                }
            ],
            "namespace": ""
        })))
        .expect(1)
        .mount(&server)
        .await;

    let registry = registry_with_index(&server).await;
    let retriever = registry.lookup_retriever("pinecone/docs").unwrap();

    let response = retriever
        .retrieve(RetrieverRequest::new("what is the first document?"))
        .await
        .unwrap();

    assert_eq!(response.documents.len(), 2);
    assert_eq!(response.documents[0].id, "doc-1");
    assert_eq!(response.documents[0].content, "first document");
    assert_eq!(response.documents[0].score, Some(0.92));
    assert_eq!(
        response.documents[0].metadata["source"],
        json!("kb")
    );
}

#[tokio::test]
async fn retrieve_honors_top_k() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/query"))
        .and(body_partial_json(json!({"topK": 2})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"matches": []})))
        .expect(1)
        .mount(&server)
        .await;

    let registry = registry_with_index(&server).await;
    let retriever = registry.lookup_retriever("pinecone/docs").unwrap();

    let response = retriever
        .retrieve(RetrieverRequest::new("anything").with_top_k(2))
        .await
        .unwrap();
    assert!(response.documents.is_empty());
}

#[tokio::test]
async fn retrieve_maps_index_errors() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .mount(&server)
        .await;

    let registry = registry_with_index(&server).await;
    let retriever = registry.lookup_retriever("pinecone/docs").unwrap();

    let result = retriever.retrieve(RetrieverRequest::new("q")).await;
    match result {
        Err(LlmError::ApiError { code, .. }) => assert_eq!(code, 403),
        other => panic!("expected ApiError, got {other:?}"),
    }
}
