//! Common types shared across providers.

pub mod chat;
pub mod common;
pub mod documents;
pub mod embedding;
pub mod http;
pub mod models;

pub use chat::*;
pub use common::*;
pub use documents::*;
pub use embedding::*;
pub use http::*;
pub use models::*;
