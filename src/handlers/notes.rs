// src/handlers/notes.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    error::AppError,
    models::note::{SaveNoteRequest, SavedNote},
    session::SessionId,
    state::AppState,
};

/// Lists all saved notes, oldest first.
pub async fn list_notes(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    let notes = sqlx::query_as::<_, SavedNote>(
        "SELECT id, title, content, created_at FROM notes ORDER BY created_at ASC",
    )
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list notes: {:?}", e);
        AppError::from(e)
    })?;

    Ok(Json(notes))
}

/// Saves the current topic notes under a title.
///
/// Titles are unique case-insensitively: saving 'Photosynthesis' when
/// 'photosynthesis' exists returns 409 Conflict and nothing is re-added.
pub async fn save_note(
    State(pool): State<SqlitePool>,
    Json(payload): Json<SaveNoteRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let existing: Option<(String,)> =
        sqlx::query_as("SELECT id FROM notes WHERE LOWER(title) = LOWER(?1)")
            .bind(&payload.title)
            .fetch_optional(&pool)
            .await?;

    if existing.is_some() {
        return Err(AppError::Conflict(format!(
            "A note titled '{}' already exists",
            payload.title
        )));
    }

    let note = SavedNote {
        id: uuid::Uuid::new_v4().to_string(),
        title: payload.title,
        content: payload.content,
        created_at: Some(chrono::Utc::now()),
    };

    sqlx::query("INSERT INTO notes (id, title, content, created_at) VALUES (?1, ?2, ?3, ?4)")
        .bind(&note.id)
        .bind(&note.title)
        .bind(&note.content)
        .bind(note.created_at)
        .execute(&pool)
        .await
        .map_err(|e| {
            // The LOWER(title) unique index backs up the pre-check.
            if e.to_string().contains("UNIQUE constraint failed") {
                AppError::Conflict(format!("A note titled '{}' already exists", note.title))
            } else {
                tracing::error!("Failed to save note: {:?}", e);
                AppError::from(e)
            }
        })?;

    Ok((StatusCode::CREATED, Json(note)))
}

/// Deletes a saved note by id.
pub async fn delete_note(
    State(pool): State<SqlitePool>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let result = sqlx::query("DELETE FROM notes WHERE id = ?1")
        .bind(&id)
        .execute(&pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Note not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Loads a saved note into the session as the active topic content.
pub async fn load_note(
    State(state): State<AppState>,
    Extension(SessionId(id)): Extension<SessionId>,
    Path(note_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let note = sqlx::query_as::<_, SavedNote>(
        "SELECT id, title, content, created_at FROM notes WHERE id = ?1",
    )
    .bind(&note_id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Note not found".to_string()))?;

    state
        .sessions
        .with_mut(&id, |s| s.topic_content = Some(note.content.clone()))
        .await?;

    Ok(Json(note))
}
