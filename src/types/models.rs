//! Model metadata returned by provider listing endpoints.

use serde::{Deserialize, Serialize};

/// Information about one model offered by a provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Model id as the provider knows it
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Owning organization reported by the provider
    pub owned_by: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<u64>,
}
