//! External provider abstractions and implementations.
//!
//! Each third-party collaborator sits behind an object-safe trait so handlers
//! can be exercised with in-tree fakes: the completion API for summary
//! generation and the transactional email API for dispatch.

pub mod mock;
pub mod openai;
pub mod sendgrid;

pub use mock::{MockCompletionProvider, MockEmailProvider};
pub use openai::OpenAiProvider;
pub use sendgrid::SendGridProvider;

use crate::services::prompt::ChatMessage;
use async_trait::async_trait;
use std::pin::Pin;
use thiserror::Error;
use tokio_stream::Stream;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Invalid recipient: {0}")]
    InvalidRecipient(String),

    #[error("Send failed: {0}")]
    SendFailed(String),

    #[error("Network error: {0}")]
    NetworkError(String),
}

/// Incremental text fragments from a streaming completion. Fragments carry
/// raw text only; deltas with no text payload are filtered by the provider.
pub type CompletionStream = Pin<Box<dyn Stream<Item = Result<String, ProviderError>> + Send>>;

/// Streaming chat-completion provider.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Open a streaming completion for the given message sequence.
    async fn stream_chat(&self, messages: &[ChatMessage])
        -> Result<CompletionStream, ProviderError>;

    /// Health check.
    async fn health_check(&self) -> Result<(), ProviderError>;
}

/// A fully composed outbound email.
#[derive(Debug, Clone)]
pub struct OutboundEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body_html: String,
}

/// Result of a successful email dispatch.
#[derive(Debug, Clone)]
pub struct DispatchResponse {
    /// HTTP status code returned by the provider.
    pub status_code: u16,
    /// Provider-assigned message id, when one is reported.
    pub message_id: Option<String>,
}

/// Transactional email provider.
#[async_trait]
pub trait EmailProvider: Send + Sync {
    /// Submit one email for delivery.
    async fn send(&self, email: &OutboundEmail) -> Result<DispatchResponse, ProviderError>;

    /// Health check.
    async fn health_check(&self) -> Result<(), ProviderError>;
}
