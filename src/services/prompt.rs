//! Prompt construction for the visit-summary draft.
//!
//! The system instruction is a fixed template; only the user message varies
//! with the visit details. Notes content is interpolated verbatim.

use serde::{Deserialize, Serialize};

/// Visit details submitted for summarization. All fields are required;
/// presence is the only validation applied.
#[derive(Debug, Clone, Deserialize)]
pub struct VisitRequest {
    pub patient_name: String,
    pub date_of_visit: String,
    pub notes: String,
    pub doctor_name: String,
    pub clinic_name: String,
}

/// One chat message in the completion request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

pub const SYSTEM_PROMPT: &str = "\
You are provided with notes written by a doctor from a patient's visit.
Your job is to generate a concise, patient-friendly email summarizing the visit and next steps.
Return plain text (no markdown headings, no 'in patient-friendly language' phrase, no subject line, no signature) with the following structure:
- Greeting: Address the patient by name (e.g., \"Dear [Patient Name],\").
- Visit Summary: Summarize the discussion from the notes in 1 clear sentence (max 20 words).
- Recommendations: Provide 3-6(depending on issue) brief, actionable bullets (use \"-\" for bullets, max 15-20 words each):
  - Medications prescribed or suggested, with simple dosage instructions.
  - Safe alternative treatments or lifestyle adjustments (e.g., diet, home remedies).
  - Steps to prevent worsening of symptoms.
- When to Seek Care: State when to contact the clinic in 1 sentence (max 15 words).
- Follow-Up: Mention any follow-up actions in 1 sentence (max 15 words).
- Closing: Include a warm, polite closing (e.g., \"Wishing you a speedy recovery,\").
Do not include a subject line or signature, as these will be added separately.
The content must be 100% original, professional, warm, and written as if by a doctor, avoiding repetitive advice and overly technical or generic AI phrasing.";

pub fn user_prompt_for(visit: &VisitRequest) -> String {
    format!(
        "Create the draft email for:\n\
         Patient Name: {}\n\
         Date of Visit: {}\n\
         Doctor: {}\n\
         Clinic: {}\n\
         Notes:\n\
         {}",
        visit.patient_name, visit.date_of_visit, visit.doctor_name, visit.clinic_name, visit.notes
    )
}

/// Build the two-message instruction sequence for the completion provider.
pub fn build_prompt(visit: &VisitRequest) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::user(user_prompt_for(visit)),
    ]
}
