//! Chat completion backends
//!
//! The tutoring session only needs "send message list, get text"; each
//! backend implements [`ChatBackend`] so the session never sees transport.

mod openai;

use async_trait::async_trait;

pub use openai::OpenAiChat;

use crate::Result;
use crate::tutor::Turn;

/// Remote chat model that turns a message list into one reply
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Complete the conversation
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the response has no reply
    async fn complete(&self, messages: &[Turn]) -> Result<String>;
}
