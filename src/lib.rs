//! # ensemble
//!
//! A multi-provider generative AI plugin library for Rust.
//!
//! Providers are packaged as plugins. Applying a plugin to an
//! [`ActionRegistry`](registry::ActionRegistry) registers its actions —
//! models, embedders, retrievers, tools — under provider-prefixed names
//! like `"deepseek/deepseek-chat"`, all backed by a shared
//! OpenAI-compatible client.
//!
//! ```rust,no_run
//! use ensemble::prelude::*;
//! use ensemble::providers::deepseek::DeepSeekPlugin;
//!
//! # async fn run() -> Result<(), ensemble::error::LlmError> {
//! let registry = ActionRegistry::new();
//! registry.apply(&DeepSeekPlugin::default()).await?;
//!
//! let model = registry.lookup_model("deepseek/deepseek-chat").unwrap();
//! let response = model.chat(vec![ChatMessage::user("Hello!")]).await?;
//! println!("{}", response.text());
//! # Ok(())
//! # }
//! ```

pub mod compat;
pub mod defaults;
pub mod error;
pub mod plugin;
pub mod providers;
pub mod registry;
pub mod retry;
#[cfg(feature = "server-adapters")]
pub mod server;
pub mod stream;
pub mod telemetry;
pub mod traits;
pub mod types;
pub mod utils;

pub use error::LlmError;

/// Commonly used items.
pub mod prelude {
    pub use crate::error::LlmError;
    pub use crate::plugin::Plugin;
    pub use crate::registry::{ActionKind, ActionRegistry, action_name};
    pub use crate::stream::{ChatStream, ChatStreamEvent};
    pub use crate::traits::{
        EmbeddingModel, LanguageModel, ModelListing, Retriever, ToolAction,
    };
    pub use crate::types::{
        ChatMessage, ChatResponse, CommonParams, Document, HttpConfig, MessageContent,
        MessageRole, RetrieverRequest, RetrieverResponse, Tool,
    };
}
