// src/handlers/result.rs

use axum::{Extension, Json, extract::State, response::IntoResponse};

use crate::{
    error::AppError,
    session::{SessionId, SessionStore},
};

/// Returns the latest quiz result for the session.
///
/// The result is delivered twice through this endpoint: first the
/// preliminary one (feedback still the pending placeholder), then the same
/// result with the narrative filled in. Latest wins.
pub async fn get_result(
    State(sessions): State<SessionStore>,
    Extension(SessionId(id)): Extension<SessionId>,
) -> Result<impl IntoResponse, AppError> {
    let result = sessions
        .with(&id, |s| s.result.clone())
        .await?
        .ok_or_else(|| AppError::NotFound("No quiz result yet".to_string()))?;

    Ok(Json(result))
}
