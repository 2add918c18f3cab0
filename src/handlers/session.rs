// src/handlers/session.rs

use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;
use validator::Validate;

use crate::{
    error::AppError,
    models::student::{CreateSessionRequest, Student},
    session::{SessionId, SessionStore},
};

/// Opens a new session for a student.
///
/// The student identity is created once here and is immutable for the
/// session's lifetime. Returns 201 Created with the session id the client
/// must send in the 'x-session-id' header from then on.
pub async fn create_session(
    State(sessions): State<SessionStore>,
    Json(payload): Json<CreateSessionRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let name = payload.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::BadRequest(
            "Student name must not be blank.".to_string(),
        ));
    }

    let student = Student::new(name);
    let session_id = sessions.create(student.clone()).await;

    tracing::info!("Session {} opened for student '{}'", session_id, student.name);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "sessionId": session_id,
            "student": student,
        })),
    ))
}

/// Returns the current session's student plus the gating flags the client
/// uses to enable its tabs.
pub async fn current_session(
    State(sessions): State<SessionStore>,
    Extension(SessionId(id)): Extension<SessionId>,
) -> Result<impl IntoResponse, AppError> {
    let body = sessions
        .with(&id, |s| {
            json!({
                "student": s.student,
                "hasTopic": s.topic_content.is_some(),
                "hasQuiz": s.quiz.is_some(),
                "hasResult": s.result.is_some(),
            })
        })
        .await?;

    Ok(Json(body))
}
