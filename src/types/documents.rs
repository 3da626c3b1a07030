//! Retriever request/response types.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A retrieved document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Stable id of the document in its store
    pub id: String,
    /// Document text
    pub content: String,
    /// Similarity score reported by the store, higher is closer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, serde_json::Value>,
}

/// A retrieval request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrieverRequest {
    /// Query text
    pub query: String,
    /// Number of documents to return
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<usize>,
}

impl RetrieverRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            top_k: None,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = Some(top_k);
        self
    }
}

/// Documents returned for a retrieval request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrieverResponse {
    pub documents: Vec<Document>,
}
