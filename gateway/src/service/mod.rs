//! Assistant-backed proxies: map chat and news search.

pub mod chat;
pub mod error;
pub mod llm;
pub mod news;

pub use chat::{ChatRequest, MapChatService};
pub use llm::{ChatBackend, LlmClient};
pub use news::NewsSearchService;
