/*!
 * Chat-completion providers.
 *
 * The translation core only needs "prompt in, text out". This module holds:
 * - `openai`: OpenAI-compatible client (OpenAI, Ollama `/v1`, LM Studio)
 * - `mock`: deterministic provider for tests
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;

pub mod mock;
pub mod openai;

pub use self::openai::{ChatMessage, ChatRequest, ChatResponse};

/// Common trait for all LLM providers
///
/// Implementations can be used interchangeably by the translation service.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// The request type for this provider
    type Request: Send + Sync;

    /// The response type for this provider
    type Response: Send + Sync;

    /// Complete a request using this provider
    async fn complete(&self, request: Self::Request) -> Result<Self::Response, ProviderError>;

    /// Test the connection to the provider
    async fn test_connection(&self) -> Result<(), ProviderError>;

    /// Extract text from the provider response
    fn extract_text(response: &Self::Response) -> String
    where
        Self: Sized;
}

/// Object-safe view of a chat provider, as held by the translation service
pub type ChatProvider = dyn Provider<Request = ChatRequest, Response = ChatResponse>;
