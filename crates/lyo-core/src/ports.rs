//! Port traits — the hexagonal architecture boundary.
//!
//! These traits are defined here in `lyo-core` (pure Rust).
//! Implementations live in `lyo-platform` (browser adapters).
//! The core never imports platform code; it only depends on these traits.

use async_trait::async_trait;
use lyo_types::{message::WireMessage, Result};

// ─── LLM Port ────────────────────────────────────────────────

/// Request to send to the completion API
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub messages: Vec<WireMessage>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
}

/// Complete (non-streaming) response from the completion API
#[derive(Debug, Clone)]
pub struct ChatResponse {
    pub text: String,
    pub usage: Option<TokenUsage>,
}

#[derive(Debug, Clone, Default)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[async_trait(?Send)]
pub trait LlmPort {
    /// Non-streaming chat completion.
    ///
    /// Errors are `Network`, `Api` or `MalformedResponse`.
    async fn chat_completion(&self, req: ChatRequest) -> Result<ChatResponse>;
}

// ─── Notification Port ───────────────────────────────────────

/// Fire-and-forget user notification. Implementations swallow their own failures.
pub trait NotificationPort {
    fn notify(&self, title: &str, body: &str);
}

// ─── Storage Port ────────────────────────────────────────────

#[async_trait(?Send)]
pub trait StoragePort {
    /// Get a value by key
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Set a value
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a value
    async fn delete(&self, key: &str) -> Result<()>;

    /// Check if a key exists
    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.get(key).await?.is_some())
    }

    /// Name of this backend (for logging/debug)
    fn backend_name(&self) -> &str;
}
