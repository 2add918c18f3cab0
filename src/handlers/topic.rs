// src/handlers/topic.rs

use axum::{Extension, Json, extract::State, response::IntoResponse};
use serde_json::json;
use validator::Validate;

use crate::{
    error::AppError,
    models::topic::{ExplainTopicRequest, SetTopicRequest},
    session::{SessionId, SessionStore},
    state::AppState,
};

/// Asks the reasoning service for an explanation of a topic and installs it
/// as the session's topic content.
///
/// On failure the service message is surfaced as-is and the previous topic
/// content is left untouched.
pub async fn explain_topic(
    State(state): State<AppState>,
    Extension(SessionId(id)): Extension<SessionId>,
    Json(payload): Json<ExplainTopicRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let topic = payload.topic.trim();
    if topic.is_empty() {
        return Err(AppError::BadRequest(
            "Please enter a topic to search for.".to_string(),
        ));
    }

    let explanation = state.reasoning.explain_topic(topic).await?;

    state
        .sessions
        .with_mut(&id, |s| s.topic_content = Some(explanation.clone()))
        .await?;

    Ok(Json(json!({ "explanation": explanation })))
}

/// Replaces the session's topic content directly, e.g. after the student
/// edits the notes or loads a saved note client-side.
pub async fn set_topic(
    State(sessions): State<SessionStore>,
    Extension(SessionId(id)): Extension<SessionId>,
    Json(payload): Json<SetTopicRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    sessions
        .with_mut(&id, |s| s.topic_content = Some(payload.content))
        .await?;

    Ok(Json(json!({ "ok": true })))
}

pub async fn get_topic(
    State(sessions): State<SessionStore>,
    Extension(SessionId(id)): Extension<SessionId>,
) -> Result<impl IntoResponse, AppError> {
    let content = sessions.with(&id, |s| s.topic_content.clone()).await?;
    Ok(Json(json!({ "content": content })))
}
