//! Action naming and handles.

use std::sync::Arc;

use crate::traits::{EmbeddingModel, LanguageModel, Retriever, ToolAction};

/// Kind of a registered action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Model,
    Embedder,
    Retriever,
    Tool,
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Model => "model",
            Self::Embedder => "embedder",
            Self::Retriever => "retriever",
            Self::Tool => "tool",
        };
        f.write_str(name)
    }
}

/// Build a provider-prefixed action name (`"deepseek/deepseek-chat"`).
pub fn action_name(provider: &str, id: &str) -> String {
    format!("{provider}/{id}")
}

/// Split an action name into provider and id, if it has a prefix.
pub fn split_action_name(name: &str) -> Option<(&str, &str)> {
    name.split_once('/')
}

/// A registered action
#[derive(Clone)]
pub enum ActionHandle {
    Model(Arc<dyn LanguageModel>),
    Embedder(Arc<dyn EmbeddingModel>),
    Retriever(Arc<dyn Retriever>),
    Tool(Arc<dyn ToolAction>),
}

impl ActionHandle {
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::Model(_) => ActionKind::Model,
            Self::Embedder(_) => ActionKind::Embedder,
            Self::Retriever(_) => ActionKind::Retriever,
            Self::Tool(_) => ActionKind::Tool,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_name_round_trip() {
        let name = action_name("deepseek", "deepseek-chat");
        assert_eq!(name, "deepseek/deepseek-chat");
        assert_eq!(split_action_name(&name), Some(("deepseek", "deepseek-chat")));
        assert_eq!(split_action_name("no-prefix"), None);
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(ActionKind::Model.to_string(), "model");
        assert_eq!(ActionKind::Retriever.to_string(), "retriever");
    }
}
