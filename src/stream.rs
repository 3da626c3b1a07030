//! Core streaming types.

use futures::Stream;
use std::pin::Pin;

use crate::error::LlmError;
use crate::types::{ChatResponse, ResponseMetadata, Usage};

/// Chat stream: a pinned, boxed stream of `ChatStreamEvent` items.
///
/// All providers implement streaming by returning this type.
pub type ChatStream = Pin<Box<dyn Stream<Item = Result<ChatStreamEvent, LlmError>> + Send>>;

/// Events emitted by a streamed chat response
#[derive(Debug, Clone)]
pub enum ChatStreamEvent {
    /// First event of a stream, carrying response metadata
    StreamStart { metadata: ResponseMetadata },
    /// A chunk of response text
    ContentDelta { delta: String, index: Option<usize> },
    /// A chunk of reasoning/thinking content
    ThinkingDelta { delta: String },
    /// A chunk of a tool call
    ToolCallDelta {
        id: String,
        function_name: Option<String>,
        arguments_delta: Option<String>,
        index: Option<usize>,
    },
    /// Updated token usage, typically near the end of the stream
    UsageUpdate { usage: Usage },
    /// Final event, carrying whatever summary the provider sent
    StreamEnd { response: ChatResponse },
    /// In-band error reported by the provider
    Error { error: String },
}
