use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::AppError;
use crate::middleware::AuthUser;
use crate::services::formatter::{format_content, render_email};
use crate::services::providers::OutboundEmail;
use crate::startup::AppState;

/// A fully composed email payload. `content` is expected to follow the
/// line-oriented structure produced by the summary stream (paragraphs plus
/// "- " bullet lines); malformed content degrades to plain paragraphs.
#[derive(Debug, Deserialize, Validate)]
pub struct EmailRequest {
    #[validate(email(message = "Invalid email address"))]
    pub to_email: String,
    pub date_of_visit: String,
    pub subject: String,
    pub content: String,
    pub doctor_name: String,
    pub clinic_name: String,
    pub patient_name: String,
}

#[derive(Debug, Serialize)]
pub struct SendEmailResponse {
    pub status: String,
    pub response: u16,
}

/// `POST /send-email` — format the summary as HTML and dispatch it.
///
/// Any dispatch failure is caught at this boundary, logged in full, and
/// surfaced as a single 500 with the error text. No retry is attempted.
#[tracing::instrument(skip(state, request), fields(user_id = %claims.sub))]
pub async fn send_email(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(request): Json<EmailRequest>,
) -> Result<(StatusCode, Json<SendEmailResponse>), AppError> {
    request.validate()?;

    let formatted = format_content(&request.content);
    let body_html = render_email(&formatted, &request.doctor_name, &request.clinic_name);

    let email = OutboundEmail {
        from: state.config.email.from_email.clone(),
        to: request.to_email.clone(),
        subject: request.subject.clone(),
        body_html,
    };

    match state.email_provider.send(&email).await {
        Ok(response) => {
            tracing::info!(
                to = %request.to_email,
                patient = %request.patient_name,
                date_of_visit = %request.date_of_visit,
                provider_status = response.status_code,
                message_id = ?response.message_id,
                "Consultation summary email sent"
            );

            Ok((
                StatusCode::OK,
                Json(SendEmailResponse {
                    status: "Email sent".to_string(),
                    response: response.status_code,
                }),
            ))
        }
        Err(e) => {
            tracing::error!(
                to = %request.to_email,
                error = %e,
                "Failed to send email"
            );

            Err(AppError::EmailDispatch(e.to_string()))
        }
    }
}
