//! Mock provider implementations for testing and disabled-provider fallback.

use super::{
    CompletionProvider, CompletionStream, DispatchResponse, EmailProvider, OutboundEmail,
    ProviderError,
};
use crate::services::prompt::ChatMessage;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};

/// Streams a scripted list of text fragments.
pub struct MockCompletionProvider {
    fragments: Vec<String>,
    fail_before_stream: bool,
    call_count: AtomicU64,
}

impl MockCompletionProvider {
    pub fn new(fragments: Vec<&str>) -> Self {
        Self {
            fragments: fragments.into_iter().map(String::from).collect(),
            fail_before_stream: false,
            call_count: AtomicU64::new(0),
        }
    }

    /// Errors before any stream is opened, simulating an unreachable
    /// completion provider.
    pub fn failing() -> Self {
        Self {
            fragments: Vec::new(),
            fail_before_stream: true,
            call_count: AtomicU64::new(0),
        }
    }

    pub fn call_count(&self) -> u64 {
        self.call_count.load(Ordering::SeqCst)
    }
}

impl Default for MockCompletionProvider {
    fn default() -> Self {
        Self::new(vec![
            "Dear Patient,\nThank you for visiting.",
            "\n- Rest well\n- Drink fluids",
            "\nWishing you a speedy recovery,",
        ])
    }
}

#[async_trait]
impl CompletionProvider for MockCompletionProvider {
    async fn stream_chat(
        &self,
        _messages: &[ChatMessage],
    ) -> Result<CompletionStream, ProviderError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);

        if self.fail_before_stream {
            return Err(ProviderError::NetworkError(
                "Mock completion provider is unreachable".to_string(),
            ));
        }

        let chunks: Vec<Result<String, ProviderError>> =
            self.fragments.iter().cloned().map(Ok).collect();

        Ok(Box::pin(tokio_stream::iter(chunks)) as CompletionStream)
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        Ok(())
    }
}

/// Mock email provider counting sends, with optional scripted failure.
pub struct MockEmailProvider {
    should_fail: bool,
    send_count: AtomicU64,
}

impl MockEmailProvider {
    pub fn new(should_fail: bool) -> Self {
        Self {
            should_fail,
            send_count: AtomicU64::new(0),
        }
    }

    pub fn send_count(&self) -> u64 {
        self.send_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmailProvider for MockEmailProvider {
    async fn send(&self, email: &OutboundEmail) -> Result<DispatchResponse, ProviderError> {
        if self.should_fail {
            return Err(ProviderError::SendFailed(
                "Mock email provider is configured to fail".to_string(),
            ));
        }

        self.send_count.fetch_add(1, Ordering::SeqCst);

        tracing::info!(
            to = %email.to,
            subject = %email.subject,
            "[MOCK] Email would be sent"
        );

        Ok(DispatchResponse {
            status_code: 202,
            message_id: Some(format!(
                "mock-email-{}",
                self.send_count.load(Ordering::SeqCst)
            )),
        })
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        Ok(())
    }
}
