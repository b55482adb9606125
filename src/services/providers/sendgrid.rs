//! SendGrid transactional email provider.

use super::{DispatchResponse, EmailProvider, OutboundEmail, ProviderError};
use crate::config::EmailConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

const SENDGRID_API_URL: &str = "https://api.sendgrid.com/v3/mail/send";

pub struct SendGridProvider {
    config: EmailConfig,
    client: Client,
}

#[derive(Debug, Serialize)]
struct MailSendRequest {
    personalizations: Vec<Personalization>,
    from: EmailAddress,
    subject: String,
    content: Vec<MailContent>,
}

#[derive(Debug, Serialize)]
struct Personalization {
    to: Vec<EmailAddress>,
}

#[derive(Debug, Serialize)]
struct EmailAddress {
    email: String,
}

#[derive(Debug, Serialize)]
struct MailContent {
    #[serde(rename = "type")]
    content_type: String,
    value: String,
}

impl SendGridProvider {
    pub fn new(config: EmailConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }
}

#[async_trait]
impl EmailProvider for SendGridProvider {
    async fn send(&self, email: &OutboundEmail) -> Result<DispatchResponse, ProviderError> {
        if email.to.is_empty() {
            return Err(ProviderError::InvalidRecipient(
                "Recipient address is empty".to_string(),
            ));
        }

        let request = MailSendRequest {
            personalizations: vec![Personalization {
                to: vec![EmailAddress {
                    email: email.to.clone(),
                }],
            }],
            from: EmailAddress {
                email: email.from.clone(),
            },
            subject: email.subject.clone(),
            content: vec![MailContent {
                content_type: "text/html".to_string(),
                value: email.body_html.clone(),
            }],
        };

        let response = self
            .client
            .post(SENDGRID_API_URL)
            .bearer_auth(&self.config.sendgrid_api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                ProviderError::NetworkError(format!("Failed to connect to SendGrid: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::SendFailed(format!(
                "SendGrid API returned error status {}: {}",
                status, body
            )));
        }

        let message_id = response
            .headers()
            .get("x-message-id")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        tracing::info!(
            to = %email.to,
            subject = %email.subject,
            "Email sent successfully via SendGrid"
        );

        Ok(DispatchResponse {
            status_code: status.as_u16(),
            message_id,
        })
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        if self.config.sendgrid_api_key.is_empty() {
            return Err(ProviderError::NotConfigured(
                "SendGrid API key not configured".to_string(),
            ));
        }
        Ok(())
    }
}
