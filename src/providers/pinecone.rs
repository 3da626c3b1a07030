//! Pinecone plugin.
//!
//! Registers a retriever action backed by a Pinecone serverless index.
//! Queries are embedded through an embedder action that must already be in
//! the registry, then matched against the index with a top-k vector query.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::collections::HashMap;

use crate::error::LlmError;
use crate::plugin::Plugin;
use crate::registry::{ActionRegistry, action_name};
use crate::traits::{EmbeddingModel, Retriever};
use crate::types::{Document, RetrieverRequest, RetrieverResponse};

/// Plugin identifier
pub const PLUGIN_NAME: &str = "pinecone";

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "PINECONE_API_KEY";

/// Documents returned when the request does not say how many
pub const DEFAULT_TOP_K: usize = 5;

/// Metadata field holding the document text
pub const DEFAULT_CONTENT_FIELD: &str = "text";

/// Pinecone plugin options
#[derive(Debug, Clone)]
pub struct PineconeOptions {
    api_key: Option<String>,
    index: Option<String>,
    index_host: Option<String>,
    embedder: Option<String>,
    namespace: Option<String>,
    content_field: String,
    timeout: Option<Duration>,
}

impl Default for PineconeOptions {
    fn default() -> Self {
        Self {
            api_key: None,
            index: None,
            index_host: None,
            embedder: None,
            namespace: None,
            content_field: DEFAULT_CONTENT_FIELD.to_string(),
            timeout: None,
        }
    }
}

impl PineconeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Explicit API key; overrides `PINECONE_API_KEY`.
    pub fn api_key<S: Into<String>>(mut self, api_key: S) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Index name, used as the action id (`pinecone/<index>`). Required.
    pub fn index<S: Into<String>>(mut self, index: S) -> Self {
        self.index = Some(index.into());
        self
    }

    /// Index host from the Pinecone console. Required.
    pub fn index_host<S: Into<String>>(mut self, host: S) -> Self {
        self.index_host = Some(host.into());
        self
    }

    /// Action name of the embedder used for queries
    /// (e.g. `"mistral/mistral-embed"`). Required.
    pub fn embedder<S: Into<String>>(mut self, embedder: S) -> Self {
        self.embedder = Some(embedder.into());
        self
    }

    /// Namespace to query (optional)
    pub fn namespace<S: Into<String>>(mut self, namespace: S) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Metadata field holding document text (default `"text"`)
    pub fn content_field<S: Into<String>>(mut self, field: S) -> Self {
        self.content_field = field.into();
        self
    }

    /// Request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Pinecone plugin
#[derive(Debug, Clone, Default)]
pub struct PineconePlugin {
    options: PineconeOptions,
}

impl PineconePlugin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: PineconeOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl Plugin for PineconePlugin {
    fn name(&self) -> &'static str {
        PLUGIN_NAME
    }

    async fn init(&self, registry: &ActionRegistry) -> Result<Vec<String>, LlmError> {
        let api_key = super::resolve_api_key(self.options.api_key.as_deref(), API_KEY_ENV)?;

        let index = self.options.index.clone().ok_or_else(|| {
            LlmError::ConfigurationError("Pinecone plugin requires an index name".to_string())
        })?;
        let host = self.options.index_host.clone().ok_or_else(|| {
            LlmError::ConfigurationError("Pinecone plugin requires an index host".to_string())
        })?;
        let embedder_name = self.options.embedder.clone().ok_or_else(|| {
            LlmError::ConfigurationError("Pinecone plugin requires an embedder action".to_string())
        })?;

        let embedder = registry.lookup_embedder(&embedder_name).ok_or_else(|| {
            LlmError::ConfigurationError(format!(
                "Embedder action '{embedder_name}' is not registered; apply its plugin first"
            ))
        })?;

        let host = if host.starts_with("http://") || host.starts_with("https://") {
            host
        } else {
            format!("https://{host}")
        };

        let mut client_builder = reqwest::Client::builder();
        if let Some(timeout) = self.options.timeout {
            client_builder = client_builder.timeout(timeout);
        }
        let http_client = client_builder
            .build()
            .map_err(|e| LlmError::HttpError(format!("Failed to create HTTP client: {e}")))?;

        let retriever = PineconeRetriever {
            http_client,
            api_key: SecretString::from(api_key),
            query_url: format!("{}/query", host.trim_end_matches('/')),
            namespace: self.options.namespace.clone(),
            content_field: self.options.content_field.clone(),
            embedder,
        };

        let name = registry.register_retriever(
            action_name(PLUGIN_NAME, &index),
            Arc::new(retriever),
        );
        Ok(vec![name])
    }
}

/// Retriever over one Pinecone index
pub struct PineconeRetriever {
    http_client: reqwest::Client,
    api_key: SecretString,
    query_url: String,
    namespace: Option<String>,
    content_field: String,
    embedder: Arc<dyn EmbeddingModel>,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Debug, Deserialize)]
struct QueryMatch {
    id: String,
    score: Option<f32>,
    #[serde(default)]
    metadata: HashMap<String, serde_json::Value>,
}

fn document_from_match(m: QueryMatch, content_field: &str) -> Document {
    let content = m
        .metadata
        .get(content_field)
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();

    Document {
        id: m.id,
        content,
        score: m.score,
        metadata: m.metadata,
    }
}

#[async_trait]
impl Retriever for PineconeRetriever {
    async fn retrieve(&self, request: RetrieverRequest) -> Result<RetrieverResponse, LlmError> {
        let embedding_response = self.embedder.embed(vec![request.query.clone()]).await?;
        let vector = embedding_response
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| {
                LlmError::InternalError("Embedder returned no vectors for the query".to_string())
            })?;

        let mut body = serde_json::json!({
            "vector": vector,
            "topK": request.top_k.unwrap_or(DEFAULT_TOP_K),
            "includeMetadata": true,
        });
        if let Some(namespace) = &self.namespace {
            body["namespace"] = serde_json::json!(namespace);
        }

        tracing::debug!(url = %self.query_url, "querying pinecone index");

        let response = self
            .http_client
            .post(&self.query_url)
            .header("api-key", self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::HttpError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(LlmError::api_error(
                status.as_u16(),
                format!("Pinecone query failed: {error_text}"),
            ));
        }

        let query_response: QueryResponse = response.json().await?;

        let documents = query_response
            .matches
            .into_iter()
            .map(|m| document_from_match(m, &self.content_field))
            .collect();

        Ok(RetrieverResponse { documents })
    }
}
