use axum::{
    extract::State,
    response::sse::{Event, Sse},
};
use axum::Json;
use futures::{stream, StreamExt};
use std::pin::Pin;
use tokio_stream::Stream;

use crate::error::AppError;
use crate::middleware::AuthUser;
use crate::services::prompt::{build_prompt, VisitRequest};
use crate::services::providers::ProviderError;
use crate::startup::AppState;

type EventStream = Pin<Box<dyn Stream<Item = Result<Event, ProviderError>> + Send>>;

/// `POST /api` — stream an AI-drafted visit summary as server-sent events.
///
/// Upstream failures before the stream opens surface as 502; once streaming
/// has begun, a provider failure terminates the response stream without an
/// error frame, since partial content has already been sent.
#[tracing::instrument(skip(state, visit), fields(user_id = %claims.sub))]
pub async fn consultation_summary(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(visit): Json<VisitRequest>,
) -> Result<Sse<EventStream>, AppError> {
    tracing::info!(
        patient = %visit.patient_name,
        date_of_visit = %visit.date_of_visit,
        "Streaming consultation summary"
    );

    let messages = build_prompt(&visit);

    let upstream = state
        .completion_provider
        .stream_chat(&messages)
        .await
        .map_err(|e| AppError::BadGateway(e.to_string()))?;

    let events = upstream.flat_map(|fragment| {
        let frames: Vec<Result<Event, ProviderError>> = match fragment {
            Ok(text) => frame_lines(&text)
                .into_iter()
                .map(|data| Ok(Event::default().data(data)))
                .collect(),
            Err(e) => vec![Err(e)],
        };
        stream::iter(frames)
    });

    Ok(Sse::new(Box::pin(events) as EventStream))
}

/// Split one upstream fragment into the ordered event payloads of the
/// line-buffered relay protocol.
///
/// Every sub-line except the last is followed by a single-space payload; the
/// blank-looking event keeps paragraph breaks visible across SSE framing,
/// which otherwise collapses empty data lines. The last sub-line gets no
/// trailing space event because the next fragment may continue the same line.
fn frame_lines(fragment: &str) -> Vec<String> {
    if fragment.is_empty() {
        return Vec::new();
    }

    let lines: Vec<&str> = fragment.split('\n').collect();
    let mut frames = Vec::with_capacity(lines.len() * 2);

    for line in &lines[..lines.len() - 1] {
        frames.push(line.trim_end_matches('\r').to_string());
        frames.push(" ".to_string());
    }
    frames.push(lines[lines.len() - 1].trim_end_matches('\r').to_string());

    frames
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multi_line_fragment_interleaves_space_frames() {
        assert_eq!(frame_lines("A\nB\nC"), vec!["A", " ", "B", " ", "C"]);
    }

    #[test]
    fn single_line_fragment_has_no_space_frame() {
        assert_eq!(frame_lines("Hello"), vec!["Hello"]);
    }

    #[test]
    fn trailing_newline_yields_empty_last_frame() {
        assert_eq!(frame_lines("Dear Alex,\n"), vec!["Dear Alex,", " ", ""]);
    }

    #[test]
    fn empty_fragment_produces_no_frames() {
        assert!(frame_lines("").is_empty());
    }

    #[test]
    fn carriage_returns_are_stripped_from_line_ends() {
        assert_eq!(frame_lines("A\r\nB"), vec!["A", " ", "B"]);
    }
}
