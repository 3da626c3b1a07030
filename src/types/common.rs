//! Common generation parameters shared by all chat providers.

use serde::{Deserialize, Serialize};

/// Parameters understood by every OpenAI-compatible provider.
///
/// All fields are optional; unset fields are omitted from the request body
/// so provider defaults apply.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommonParams {
    /// Model id, without the provider prefix
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_sequences: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl CommonParams {
    /// Merge the parameters into an OpenAI-style JSON request body.
    pub fn apply_to(&self, body: &mut serde_json::Value) {
        if let Some(temperature) = self.temperature {
            body["temperature"] = serde_json::json!(temperature);
        }
        if let Some(max_tokens) = self.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }
        if let Some(top_p) = self.top_p {
            body["top_p"] = serde_json::json!(top_p);
        }
        if let Some(stop) = &self.stop_sequences {
            body["stop"] = serde_json::json!(stop);
        }
        if let Some(seed) = self.seed {
            body["seed"] = serde_json::json!(seed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_to_skips_unset() {
        let params = CommonParams {
            temperature: Some(0.2),
            ..Default::default()
        };
        let mut body = serde_json::json!({"model": "m"});
        params.apply_to(&mut body);

        assert_eq!(body["temperature"], serde_json::json!(0.2));
        assert!(body.get("max_tokens").is_none());
        assert!(body.get("stop").is_none());
    }
}
