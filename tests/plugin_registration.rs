#![cfg(all(
    feature = "deepseek",
    feature = "mistral",
    feature = "xai",
    feature = "ollama"
))]

//! Registry-level tests across plugins.

use ensemble::prelude::*;
use ensemble::providers::deepseek::{DeepSeekOptions, DeepSeekPlugin};
use ensemble::providers::mistral::{MistralOptions, MistralPlugin};
use ensemble::providers::ollama::{OllamaOptions, OllamaPlugin};
use ensemble::providers::xai::{XaiOptions, XaiPlugin};
use ensemble::providers::{deepseek, mistral, xai};

#[tokio::test]
async fn multiple_plugins_share_one_registry() {
    let registry = ActionRegistry::new();

    registry
        .apply(&DeepSeekPlugin::with_options(
            DeepSeekOptions::new().api_key("k1"),
        ))
        .await
        .unwrap();
    registry
        .apply(&XaiPlugin::with_options(XaiOptions::new().api_key("k2")))
        .await
        .unwrap();
    registry
        .apply(&OllamaPlugin::with_options(
            OllamaOptions::new().host("http://localhost:11434").model("llama3.2"),
        ))
        .await
        .unwrap();

    let expected = deepseek::models::KNOWN.len() + xai::models::KNOWN.len() + 1;
    assert_eq!(registry.list(ActionKind::Model).len(), expected);

    // Actions keep their provider prefix.
    for name in registry.list(ActionKind::Model) {
        let (provider, _) = ensemble::registry::split_action_name(&name).unwrap();
        assert!(["deepseek", "xai", "ollama"].contains(&provider));
    }
}

#[tokio::test]
async fn model_and_embedder_namespaces_are_separate() {
    let registry = ActionRegistry::new();
    registry
        .apply(&MistralPlugin::with_options(
            MistralOptions::new().api_key("k"),
        ))
        .await
        .unwrap();

    let embed_name = format!("mistral/{}", mistral::models::EMBED);
    assert!(registry.lookup_embedder(&embed_name).is_some());
    // The embedding model is not a chat model action.
    assert!(registry.lookup_model(&embed_name).is_none());
}

#[tokio::test]
async fn list_returns_sorted_names() {
    let registry = ActionRegistry::new();
    registry
        .apply(&DeepSeekPlugin::with_options(
            DeepSeekOptions::new().api_key("k").custom_model("deepseek-z"),
        ))
        .await
        .unwrap();

    let names = registry.list(ActionKind::Model);
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted);
}

#[tokio::test]
async fn failed_plugin_leaves_registry_untouched() {
    let registry = ActionRegistry::new();

    registry
        .apply(&DeepSeekPlugin::with_options(
            DeepSeekOptions::new().api_key("k"),
        ))
        .await
        .unwrap();
    let before = registry.list(ActionKind::Model).len();

    // Base URL without a scheme fails client construction for every model.
    let result = registry
        .apply(&XaiPlugin::with_options(
            XaiOptions::new().api_key("k").base_url("not-a-url"),
        ))
        .await;
    assert!(result.is_err());

    // DeepSeek's actions are still there; nothing from xAI was kept.
    assert_eq!(registry.list(ActionKind::Model).len(), before);
}

#[tokio::test]
async fn lookup_model_returns_usable_handle() {
    let registry = ActionRegistry::new();
    registry
        .apply(&DeepSeekPlugin::with_options(
            DeepSeekOptions::new().api_key("k"),
        ))
        .await
        .unwrap();

    let model = registry.lookup_model("deepseek/deepseek-chat").unwrap();
    assert_eq!(model.model_id(), "deepseek-chat");
    assert_eq!(model.provider_id(), "deepseek");
    assert!(model.capabilities().supports("streaming"));
}
