//! Action registry.
//!
//! The registry is the invocation surface of the library: plugins register
//! actions (models, embedders, retrievers, tools) under provider-prefixed
//! names, and callers resolve them by name. Writes happen at plugin init;
//! reads dominate thereafter.

pub mod action;

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

pub use action::{ActionHandle, ActionKind, action_name, split_action_name};

use crate::error::LlmError;
use crate::plugin::Plugin;
use crate::traits::{EmbeddingModel, LanguageModel, Retriever, ToolAction};

/// Thread-safe registry of actions keyed by kind and name
#[derive(Default)]
pub struct ActionRegistry {
    actions: RwLock<HashMap<(ActionKind, String), ActionHandle>>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run a plugin's init against this registry.
    ///
    /// Returns the action names the plugin registered. A missing credential
    /// fails here, before anything is registered.
    pub async fn apply(&self, plugin: &dyn Plugin) -> Result<Vec<String>, LlmError> {
        let registered = plugin.init(self).await?;
        tracing::info!(
            plugin = plugin.name(),
            actions = registered.len(),
            "plugin initialized"
        );
        Ok(registered)
    }

    pub fn register_model(&self, name: impl Into<String>, model: Arc<dyn LanguageModel>) -> String {
        self.register(ActionKind::Model, name.into(), ActionHandle::Model(model))
    }

    pub fn register_embedder(
        &self,
        name: impl Into<String>,
        embedder: Arc<dyn EmbeddingModel>,
    ) -> String {
        self.register(
            ActionKind::Embedder,
            name.into(),
            ActionHandle::Embedder(embedder),
        )
    }

    pub fn register_retriever(
        &self,
        name: impl Into<String>,
        retriever: Arc<dyn Retriever>,
    ) -> String {
        self.register(
            ActionKind::Retriever,
            name.into(),
            ActionHandle::Retriever(retriever),
        )
    }

    pub fn register_tool(&self, tool: Arc<dyn ToolAction>) -> String {
        self.register(
            ActionKind::Tool,
            tool.name().to_string(),
            ActionHandle::Tool(tool),
        )
    }

    fn register(&self, kind: ActionKind, name: String, handle: ActionHandle) -> String {
        let mut actions = self.actions.write().unwrap_or_else(|e| e.into_inner());
        actions.insert((kind, name.clone()), handle);
        name
    }

    pub fn lookup_model(&self, name: &str) -> Option<Arc<dyn LanguageModel>> {
        match self.lookup(ActionKind::Model, name) {
            Some(ActionHandle::Model(model)) => Some(model),
            _ => None,
        }
    }

    pub fn lookup_embedder(&self, name: &str) -> Option<Arc<dyn EmbeddingModel>> {
        match self.lookup(ActionKind::Embedder, name) {
            Some(ActionHandle::Embedder(embedder)) => Some(embedder),
            _ => None,
        }
    }

    pub fn lookup_retriever(&self, name: &str) -> Option<Arc<dyn Retriever>> {
        match self.lookup(ActionKind::Retriever, name) {
            Some(ActionHandle::Retriever(retriever)) => Some(retriever),
            _ => None,
        }
    }

    pub fn lookup_tool(&self, name: &str) -> Option<Arc<dyn ToolAction>> {
        match self.lookup(ActionKind::Tool, name) {
            Some(ActionHandle::Tool(tool)) => Some(tool),
            _ => None,
        }
    }

    fn lookup(&self, kind: ActionKind, name: &str) -> Option<ActionHandle> {
        let actions = self.actions.read().unwrap_or_else(|e| e.into_inner());
        actions.get(&(kind, name.to_string())).cloned()
    }

    /// Names of all actions of one kind, sorted.
    pub fn list(&self, kind: ActionKind) -> Vec<String> {
        let actions = self.actions.read().unwrap_or_else(|e| e.into_inner());
        let mut names: Vec<String> = actions
            .keys()
            .filter(|(k, _)| *k == kind)
            .map(|(_, name)| name.clone())
            .collect();
        names.sort();
        names
    }

    /// All actions as `(kind, name)` pairs, sorted by kind then name.
    pub fn list_all(&self) -> Vec<(ActionKind, String)> {
        let actions = self.actions.read().unwrap_or_else(|e| e.into_inner());
        let mut entries: Vec<(ActionKind, String)> = actions.keys().cloned().collect();
        entries.sort_by(|a, b| a.0.to_string().cmp(&b.0.to_string()).then(a.1.cmp(&b.1)));
        entries
    }

    /// Invoke a registered tool, validating the input against its schema.
    pub async fn run_tool(
        &self,
        name: &str,
        input: serde_json::Value,
    ) -> Result<serde_json::Value, LlmError> {
        let tool = self
            .lookup_tool(name)
            .ok_or_else(|| LlmError::NotFound(format!("Unknown tool: {name}")))?;

        let schema = tool.input_schema();
        let validator = jsonschema::validator_for(&schema).map_err(|e| {
            LlmError::ConfigurationError(format!("Invalid schema for tool '{name}': {e}"))
        })?;

        if let Err(error) = validator.validate(&input) {
            return Err(LlmError::InvalidInput(format!(
                "Invalid input for tool '{name}': {error}"
            )));
        }

        tool.call(input).await
    }
}

/// The global registry, for applications that want a single shared one.
pub fn global() -> &'static ActionRegistry {
    static GLOBAL: OnceLock<ActionRegistry> = OnceLock::new();
    GLOBAL.get_or_init(ActionRegistry::new)
}
