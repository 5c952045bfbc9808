//! Model provider interface.

pub mod gemini;

pub use gemini::GeminiClient;

use crate::error::LlmError;
use crate::ConversationTurn;

use async_trait::async_trait;

/// A conversational model that turns an ordered history window into a reply.
///
/// `Ok(None)` means the provider answered but produced no usable text; the
/// caller decides how to surface that. Errors cover transport and API
/// failures.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn generate(&self, turns: &[ConversationTurn]) -> Result<Option<String>, LlmError>;
}
